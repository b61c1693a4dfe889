//! Vietnamese equities chat agent
//!
//! Answers investor questions about HOSE/HNX/UPCoM tickers by letting an LLM
//! call six market-data tools backed by the VCI trading API:
//!
//! - `get_company_info`: company overview
//! - `get_stock_history`: daily OHLCV bars
//! - `calculate_technical_indicators`: daily SMA or RSI
//! - `get_major_shareholders`, `get_company_officers`, `get_subsidiaries`
//!
//! The agent is served over HTTP by [`server::router`].
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_vnstock::{StockConfig, VciClient, agent, server};
//! use agent_utils::EnvSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(StockConfig::from_env(&EnvSource::Process)?);
//!     let provider = Arc::new(agent::gemini_provider(&config)?);
//!     let source = Arc::new(VciClient::new(&config)?);
//!     let executor = agent::build_executor(provider, source, config.clone())?;
//!
//!     server::serve(&config.bind_address(), server::router(Arc::new(executor))).await?;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod indicators;
pub mod models;
pub mod prompts;
pub mod server;
pub mod source;
pub mod tools;

pub use api::VciClient;
pub use config::StockConfig;
pub use error::{Result, StockError};
pub use indicators::{Indicator, IndicatorValue};
pub use models::{CompanyProfile, Officer, PriceBar, Shareholder, Subsidiary};
pub use source::MarketDataSource;
