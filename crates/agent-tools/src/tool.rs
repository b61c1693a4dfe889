//! Tool trait definition

use crate::{ToolError, ToolResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trait for tools that the agent loop can execute
///
/// Each tool provides a name, a description the model reads to decide when to
/// call it, and a JSON schema for its arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with the arguments the model produced
    ///
    /// Success is plain text for the model to summarize.
    async fn execute(&self, params: Value) -> ToolResult<String>;

    /// Unique name within a [`crate::ToolRegistry`]
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// JSON Schema of the accepted arguments
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "symbol": { "type": "string" }
    ///     },
    ///     "required": ["symbol"]
    /// });
    /// ```
    fn input_schema(&self) -> Value;
}

/// Deserialize tool arguments, reporting a schema mismatch as invalid input
pub fn parse_params<T: DeserializeOwned>(params: Value) -> ToolResult<T> {
    serde_json::from_value(params)
        .map_err(|e| ToolError::InvalidInput(format!("Tham số không hợp lệ: {e}")))
}
