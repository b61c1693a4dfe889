//! Tool definitions advertised to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool as the model sees it: name, description and argument schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Must match the name in the tool registry
    pub name: String,

    /// What the tool does, in the language the model should reason in
    pub description: String,

    /// JSON Schema for the arguments
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Helpers to build JSON schemas for tool arguments
pub mod schema {
    use serde_json::{Value, json};

    /// Object schema with the given properties and required keys
    ///
    /// ```
    /// use agent_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({ "symbol": schema::string("Mã chứng khoán") }),
    ///     &["symbol"],
    /// );
    /// assert_eq!(schema["required"][0], "symbol");
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }

    /// String restricted to a fixed set of values
    pub fn string_enum(description: &str, values: &[&str]) -> Value {
        json!({
            "type": "string",
            "description": description,
            "enum": values,
        })
    }

    pub fn integer(description: &str) -> Value {
        json!({
            "type": "integer",
            "description": description,
        })
    }

    /// Integer with a documented default
    pub fn integer_with_default(description: &str, default: i64) -> Value {
        json!({
            "type": "integer",
            "description": description,
            "default": default,
        })
    }
}
