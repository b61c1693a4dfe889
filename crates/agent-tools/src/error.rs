//! Typed tool failures

use serde::Serialize;
use thiserror::Error;

/// Result returned by [`crate::Tool::execute`]
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Why a tool could not produce its normal output
///
/// The message carried by every variant is written for the language model:
/// it is forwarded verbatim as the tool result text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The upstream source has no record for the request
    #[error("{0}")]
    NotFound(String),

    /// Network, upstream or decoding failure; the same call may succeed later
    #[error("{0}")]
    Transient(String),

    /// The arguments cannot produce a result no matter how often it is retried
    #[error("{0}")]
    InvalidInput(String),
}

/// Discriminant of [`ToolError`], handy for logs and metrics fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    NotFound,
    Transient,
    InvalidInput,
}

impl ToolError {
    /// Which variant this is
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            Self::NotFound(_) => ToolErrorKind::NotFound,
            Self::Transient(_) => ToolErrorKind::Transient,
            Self::InvalidInput(_) => ToolErrorKind::InvalidInput,
        }
    }

    /// Whether an orchestrator could reasonably try the same call again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// The model-facing message
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) | Self::Transient(msg) | Self::InvalidInput(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_bare_message() {
        let err = ToolError::NotFound("Không tìm thấy thông tin cho mã ZZZZ.".to_string());
        assert_eq!(err.to_string(), "Không tìm thấy thông tin cho mã ZZZZ.");
        assert_eq!(err.message(), err.to_string());
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(ToolError::Transient("timeout".into()).is_retryable());
        assert!(!ToolError::NotFound("x".into()).is_retryable());
        assert!(!ToolError::InvalidInput("x".into()).is_retryable());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let kind = ToolError::InvalidInput("x".into()).kind();
        assert_eq!(serde_json::to_value(kind).unwrap(), "invalid_input");
    }
}
