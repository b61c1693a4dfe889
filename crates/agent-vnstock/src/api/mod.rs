//! API clients for market data providers

pub mod vci;

pub use vci::VciClient;
