//! Error types for market data operations

use agent_tools::ToolError;
use thiserror::Error;

/// Market data and service errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Provider reported an error inside a successful response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Payload did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server bind or serve failure
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Classify for the agent loop, prefixing the model-facing context
    ///
    /// `context` is the Vietnamese lead-in such as
    /// `"Lỗi khi lấy lịch sử giá HPG"`; the error text follows a colon.
    pub fn into_tool_error(self, context: &str) -> ToolError {
        let message = format!("{context}: {self}");
        match &self {
            Self::Api { status: 404, .. } => ToolError::NotFound(message),
            Self::Api { status, .. } if *status == 429 || *status >= 500 => {
                ToolError::Transient(message)
            }
            Self::Api { .. } | Self::InvalidDate(_) => {
                ToolError::InvalidInput(message)
            }
            Self::Network(_)
            | Self::Provider(_)
            | Self::UnexpectedResponse(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Server(_) => ToolError::Transient(message),
        }
    }
}

impl From<agent_utils::EnvError> for StockError {
    fn from(err: agent_utils::EnvError) -> Self {
        StockError::Config(err.to_string())
    }
}

impl From<StockError> for agent_core::Error {
    fn from(err: StockError) -> Self {
        agent_core::Error::ProcessingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::Api {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Provider returned HTTP 502: bad gateway");
        assert_eq!(
            StockError::InvalidDate("2024-13-01".into()).to_string(),
            "Invalid date: 2024-13-01"
        );
    }

    #[test]
    fn test_tool_error_classification() {
        let err = StockError::Api {
            status: 503,
            body: String::new(),
        }
        .into_tool_error("Lỗi khi lấy lịch sử giá HPG");
        assert!(err.is_retryable());
        assert!(err.message().starts_with("Lỗi khi lấy lịch sử giá HPG: "));

        let err = StockError::Api {
            status: 404,
            body: String::new(),
        }
        .into_tool_error("x");
        assert!(matches!(err, ToolError::NotFound(_)));

        let err = StockError::Api {
            status: 400,
            body: String::new(),
        }
        .into_tool_error("x");
        assert!(matches!(err, ToolError::InvalidInput(_)));

        let err = StockError::Provider("timeout".into()).into_tool_error("x");
        assert!(matches!(err, ToolError::Transient(ref m) if m == "x: Provider error: timeout"));
    }

    #[test]
    fn test_error_conversion() {
        let agent_err: agent_core::Error = StockError::Config("missing".into()).into();
        assert!(matches!(
            agent_err,
            agent_core::Error::ProcessingFailed(ref msg) if msg.contains("missing")
        ));
    }
}
