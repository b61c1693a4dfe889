//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error surfaced by a question answerer
#[derive(Error, Debug)]
pub enum Error {
    /// Answerer could not be constructed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Reasoning or tool dispatch failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ProcessingFailed("Tool not found: foo".to_string());
        assert_eq!(err.to_string(), "Agent processing failed: Tool not found: foo");
        assert_eq!(
            Error::InitializationFailed("Provider not set".to_string()).to_string(),
            "Agent initialization failed: Provider not set"
        );
    }
}
