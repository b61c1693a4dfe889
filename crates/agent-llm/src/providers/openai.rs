//! OpenAI-compatible chat-completions provider
//!
//! Speaks the `/chat/completions` protocol. Besides OpenAI itself this covers
//! Google Gemini through its OpenAI compatibility layer, which is what the
//! service uses in production:
//!
//! ```no_run
//! use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OpenAIProvider::with_config(OpenAIConfig::gemini("AIza..."))?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
/// Gemini's OpenAI-compatible endpoint
pub const GEMINI_OPENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Bearer token
    pub api_key: String,

    /// Base URL without the `/chat/completions` suffix
    pub api_base: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// OpenAI endpoint with the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Gemini endpoint with a Google AI Studio key
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::new(api_key).with_api_base(GEMINI_OPENAI_API_BASE)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Provider for any endpoint speaking the OpenAI chat-completions protocol
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let wire_request = ChatRequest {
            messages: build_messages(request.system, request.messages),
            tools: request.tools.as_deref().map(convert_tools),
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(message_count = wire_request.messages.len(), "Sending chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&wire_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(LLMError::from_status(status, body, &request.model));
        }

        let wire_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        let choice = wire_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let finish_reason = choice.finish_reason.unwrap_or_default();
        let message = parse_response_message(choice.message)?;
        let stop_reason = map_stop_reason(&finish_reason, message.has_tool_uses());
        let usage = wire_response.usage.unwrap_or_default();

        debug!(
            finish_reason = %finish_reason,
            input_tokens = usage.prompt_tokens,
            output_tokens = usage.completion_tokens,
            "Chat completion received"
        );

        Ok(CompletionResponse {
            message,
            stop_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &'static str, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default = "function_type")]
    tool_type: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

// ============================================================================
// Conversion
// ============================================================================

/// System prompt first, then every conversation message
fn build_messages(system: Option<String>, messages: Vec<Message>) -> Vec<WireMessage> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system {
        wire.push(WireMessage::text("system", system));
    }
    for message in messages {
        wire.extend(convert_message(message));
    }
    wire
}

/// One generic message may become several wire messages: every tool result is
/// its own `role: "tool"` message.
fn convert_message(message: Message) -> Vec<WireMessage> {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let blocks = match message.content {
        Some(MessageContent::Text(text)) => return vec![WireMessage::text(role, text)],
        Some(MessageContent::Blocks(blocks)) => blocks,
        None => return vec![WireMessage::text(role, String::new())],
    };

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    let mut tool_results = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(WireToolCall {
                id: Some(id),
                tool_type: function_type(),
                function: WireFunctionCall {
                    name,
                    arguments: input.to_string(),
                },
            }),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => tool_results.push(WireMessage {
                role: "tool",
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(tool_use_id),
            }),
        }
    }

    let mut wire = Vec::new();
    if !texts.is_empty() || !tool_calls.is_empty() {
        wire.push(WireMessage {
            role,
            content: (!texts.is_empty()).then(|| texts.join("\n")),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
        });
    }
    wire.extend(tool_results);
    wire
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<WireTool> {
    tools
        .iter()
        .map(|tool| WireTool {
            tool_type: "function",
            function: WireFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn parse_response_message(message: ResponseMessage) -> Result<Message> {
    let mut blocks = Vec::new();

    if let Some(content) = message.content.filter(|c| !c.is_empty()) {
        blocks.push(ContentBlock::Text { text: content });
    }

    for (index, call) in message.tool_calls.unwrap_or_default().into_iter().enumerate() {
        let input = if call.function.arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&call.function.arguments).map_err(|e| {
                LLMError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}"))
            })?
        };

        // Gemini may leave the id empty; the loop still needs one to pair results.
        let id = call
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("call_{index}"));

        blocks.push(ContentBlock::ToolUse {
            id,
            name: call.function.name,
            input,
        });
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    Ok(Message::assistant_blocks(blocks))
}

/// Gemini reports `stop` even when it returned tool calls, so the presence of
/// tool calls wins over the reported reason.
fn map_stop_reason(reason: &str, has_tool_calls: bool) -> StopReason {
    if has_tool_calls {
        return StopReason::ToolUse;
    }
    match reason {
        "stop" | "" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "tool_calls" => {
            warn!("finish_reason is tool_calls but no tool calls were returned");
            StopReason::EndTurn
        }
        other => {
            debug!(finish_reason = other, "Unknown finish reason");
            StopReason::EndTurn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gemini_config() {
        let config = OpenAIConfig::gemini("key").with_timeout(30);
        assert_eq!(config.api_base, GEMINI_OPENAI_API_BASE);
        assert_eq!(config.timeout_secs, 30);

        let provider = OpenAIProvider::with_config(config).unwrap();
        assert_eq!(provider.name(), "openai-compatible");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = OpenAIConfig::new("k").with_api_base("http://localhost:1234/v1/");
        assert_eq!(config.api_base, "http://localhost:1234/v1");
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let result = OpenAIProvider::with_config(OpenAIConfig::gemini("  "));
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));
    }

    #[test]
    fn test_system_prompt_goes_first() {
        let wire = build_messages(Some("Bạn là chuyên gia".into()), vec![Message::user("Hỏi")]);
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[1].content.as_deref(), Some("Hỏi"));
    }

    #[test]
    fn test_assistant_tool_call_round_trips_to_wire() {
        let msg = Message::assistant_blocks(vec![ContentBlock::ToolUse {
            id: "call_1".into(),
            name: "calculate_technical_indicators".into(),
            input: json!({"symbol": "ABC", "indicator": "SMA", "window_size": 9}),
        }]);
        let wire = convert_message(msg);
        assert_eq!(wire.len(), 1);
        assert!(wire[0].content.is_none());
        let calls = wire[0].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "calculate_technical_indicators");
        let args: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(args["window_size"], 9);
    }

    #[test]
    fn test_tool_results_become_tool_messages() {
        let msg = Message {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![
                ContentBlock::ToolResult {
                    tool_use_id: "call_1".into(),
                    content: "kết quả 1".into(),
                    is_error: None,
                },
                ContentBlock::ToolResult {
                    tool_use_id: "call_2".into(),
                    content: "kết quả 2".into(),
                    is_error: Some(true),
                },
            ])),
        };
        let wire = convert_message(msg);
        assert_eq!(wire.len(), 2);
        assert!(wire.iter().all(|m| m.role == "tool"));
        assert_eq!(wire[1].tool_call_id.as_deref(), Some("call_2"));
    }

    #[test]
    fn test_tool_definition_conversion() {
        let tools = convert_tools(&[ToolDefinition::new(
            "get_subsidiaries",
            "Lấy danh sách các công ty con",
            json!({"type": "object"}),
        )]);
        assert_eq!(tools[0].tool_type, "function");
        assert_eq!(tools[0].function.name, "get_subsidiaries");
    }

    #[test]
    fn test_parse_response_with_tool_calls_and_missing_id() {
        let raw = json!({
            "content": null,
            "tool_calls": [{
                "id": "",
                "type": "function",
                "function": {"name": "get_company_info", "arguments": "{\"symbol\":\"VCB\"}"}
            }]
        });
        let parsed: ResponseMessage = serde_json::from_value(raw).unwrap();
        let message = parse_response_message(parsed).unwrap();

        let uses = message.tool_uses();
        assert_eq!(uses.len(), 1);
        match uses[0] {
            ContentBlock::ToolUse { id, name, input } => {
                assert_eq!(id, "call_0");
                assert_eq!(name, "get_company_info");
                assert_eq!(input["symbol"], "VCB");
            }
            _ => panic!("Expected tool use"),
        }
    }

    #[test]
    fn test_parse_response_rejects_bad_arguments() {
        let parsed = ResponseMessage {
            content: None,
            tool_calls: Some(vec![WireToolCall {
                id: Some("c".into()),
                tool_type: function_type(),
                function: WireFunctionCall {
                    name: "x".into(),
                    arguments: "{not json".into(),
                },
            }]),
        };
        assert!(matches!(
            parse_response_message(parsed),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(map_stop_reason("stop", false), StopReason::EndTurn);
        assert_eq!(map_stop_reason("stop", true), StopReason::ToolUse);
        assert_eq!(map_stop_reason("length", false), StopReason::MaxTokens);
        assert_eq!(map_stop_reason("tool_calls", true), StopReason::ToolUse);
        assert_eq!(map_stop_reason("content_filter", false), StopReason::EndTurn);
    }

    #[test]
    fn test_response_without_usage_parses() {
        let raw = json!({
            "choices": [{"message": {"role": "assistant", "content": "Chào bạn"}, "finish_reason": "stop"}]
        });
        let parsed: ChatResponse = serde_json::from_value(raw).unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Chào bạn"));
    }
}
