//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while talking to a model
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit or quota exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The provider rejected the request body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The response did not have the expected shape
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Map a non-success HTTP status and body to an error
    pub fn from_status(status: reqwest::StatusCode, body: String, model: &str) -> Self {
        match status.as_u16() {
            401 | 403 => Self::AuthenticationFailed,
            429 => Self::RateLimitExceeded(body),
            400 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(model.to_string()),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            LLMError::from_status(StatusCode::FORBIDDEN, String::new(), "m"),
            LLMError::AuthenticationFailed
        ));
        assert!(matches!(
            LLMError::from_status(StatusCode::TOO_MANY_REQUESTS, "quota".into(), "m"),
            LLMError::RateLimitExceeded(ref body) if body == "quota"
        ));
        assert!(matches!(
            LLMError::from_status(StatusCode::NOT_FOUND, String::new(), "gemini-x"),
            LLMError::ModelNotFound(ref model) if model == "gemini-x"
        ));
        let err = LLMError::from_status(StatusCode::BAD_GATEWAY, "upstream".into(), "m");
        assert_eq!(err.to_string(), "API request failed: HTTP 502 Bad Gateway: upstream");
    }
}
