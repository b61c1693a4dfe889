//! Shared utilities for the vnstock agent
//!
//! Tracing setup and environment-variable loading used by every binary.

pub mod config;
pub mod logging;

pub use config::{EnvError, EnvSource, load_dotenv};
pub use logging::init_tracing;
