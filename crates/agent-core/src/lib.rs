//! Core abstractions shared by the agent crates
//!
//! Defines the [`QuestionAnswerer`] capability the HTTP layer depends on and
//! the error type every layer converts into at its boundary.

pub mod answerer;
pub mod error;

pub use answerer::QuestionAnswerer;
pub use error::{Error, Result};
