//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the agent loop pattern:
//! 1. Call the LLM with the conversation and the available tools
//! 2. If the model asked for tools, execute them and append their results
//! 3. Loop until the model ends its turn, then return its last message

use agent_core::{Error, QuestionAnswerer, Result};
use agent_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, Role, StopReason, ToolDefinition,
};
use agent_tools::ToolRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const PREVIEW_CHARS: usize = 300;

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Upper bound on LLM round trips for one question
    pub max_iterations: usize,

    /// Model identifier passed to the provider
    pub model: String,

    /// System instruction
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gemini-2.0-flash".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.0),
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the loop for a conversation that starts with one user message
    pub async fn run(&self, user_message: String) -> Result<String> {
        let conversation = self.run_conversation(vec![Message::user(user_message)]).await?;
        Ok(final_text(&conversation))
    }

    /// Run the loop and return the whole conversation, last message being the
    /// model's final answer
    pub async fn run_conversation(&self, initial: Vec<Message>) -> Result<Vec<Message>> {
        let mut conversation = initial;
        let tools = self.build_tool_definitions();

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                model = %self.config.model,
                tool_count = tools.len(),
                "Sending request to LLM"
            );

            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens)
                .tools(tools.clone());
            if let Some(system) = &self.config.system_prompt {
                builder = builder.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                builder = builder.temperature(temperature);
            }

            let response = self
                .provider
                .complete(builder.build())
                .await
                .map_err(|e| Error::ProcessingFailed(e.to_string()))?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let stop_reason = response.stop_reason;
            conversation.push(response.message);

            match stop_reason {
                StopReason::EndTurn => {
                    info!(iteration, "Agent completed naturally");
                    return Ok(conversation);
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok(conversation);
                }
                StopReason::ToolUse => {
                    let Some(last) = conversation.last() else {
                        continue;
                    };
                    let results = self.execute_tools(last).await?;
                    if results.is_empty() {
                        warn!("ToolUse stop reason without tool calls");
                        return Ok(conversation);
                    }
                    conversation.extend(results);
                }
            }
        }

        warn!(max_iterations = self.config.max_iterations, "Max iterations reached");
        Err(Error::ProcessingFailed(format!(
            "No final answer after {} iterations",
            self.config.max_iterations
        )))
    }

    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Execute every tool call in an assistant message
    ///
    /// Tool failures become error tool results for the model to read; only an
    /// unknown tool name aborts the loop.
    async fn execute_tools(&self, message: &Message) -> Result<Vec<Message>> {
        let mut results = Vec::new();

        for block in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let tool = self
                .tool_registry
                .get(name)
                .ok_or_else(|| Error::ProcessingFailed(format!("Tool not found: {name}")))?;

            info!(tool_name = %name, tool_id = %id, input = %input, "Executing tool");

            let started = Instant::now();
            let outcome = tool.execute(input.clone()).await;
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            match outcome {
                Ok(text) => {
                    debug!(
                        tool_name = %name,
                        duration_ms,
                        result_length = text.len(),
                        result_preview = %preview(&text),
                        "Tool execution succeeded"
                    );
                    results.push(Message::tool_result(id.clone(), text));
                }
                Err(e) => {
                    warn!(
                        tool_name = %name,
                        duration_ms,
                        kind = ?e.kind(),
                        retryable = e.is_retryable(),
                        error = %e,
                        "Tool execution failed"
                    );
                    results.push(Message::tool_error(id.clone(), e.message()));
                }
            }
        }

        Ok(results)
    }
}

#[async_trait]
impl QuestionAnswerer for AgentExecutor {
    async fn answer(&self, question: String) -> Result<String> {
        self.run(question).await
    }

    fn name(&self) -> &str {
        "agent-executor"
    }
}

/// The model's answer: its last non-empty text, or an empty string
///
/// Some models close a tool round with an empty turn; an earlier assistant
/// text is used then.
fn final_text(conversation: &[Message]) -> String {
    let answer = conversation
        .iter()
        .rev()
        .filter(|message| message.role == Role::Assistant)
        .filter_map(Message::text)
        .find(|text| !text.trim().is_empty());

    answer.unwrap_or_else(|| {
        warn!("LLM returned an empty answer");
        String::new()
    })
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        if self.config.max_iterations == 0 {
            return Err(Error::InitializationFailed(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::{CompletionResponse, LLMError, MessageContent, TokenUsage};
    use agent_tools::{Tool, ToolError, ToolResult};
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request it saw
    struct ScriptedProvider {
        responses: Mutex<VecDeque<agent_llm::Result<CompletionResponse>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<agent_llm::Result<CompletionResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(end_turn("script exhausted")))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn end_turn(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn tool_call(id: &str, name: &str, input: Value) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    struct FixedTool {
        name: &'static str,
        outcome: ToolResult<String>,
    }

    #[async_trait]
    impl Tool for FixedTool {
        async fn execute(&self, _params: Value) -> ToolResult<String> {
            self.outcome.clone()
        }

        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "fixed"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn registry(tools: Vec<FixedTool>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(Arc::new(tool));
        }
        Arc::new(registry)
    }

    fn last_tool_result(request: &CompletionRequest) -> (String, Option<bool>) {
        match &request.messages.last().unwrap().content {
            Some(MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => (content.clone(), *is_error),
                other => panic!("Expected tool result, got {other:?}"),
            },
            other => panic!("Expected blocks, got {other:?}"),
        }
    }

    #[test]
    fn test_builder() {
        let builder = AgentExecutorBuilder::new()
            .model("test-model")
            .max_iterations(5)
            .system_prompt("Test prompt");

        assert_eq!(builder.config.model, "test-model");
        assert_eq!(builder.config.max_iterations, 5);
        assert_eq!(builder.config.system_prompt.as_deref(), Some("Test prompt"));
    }

    #[test]
    fn test_build_requires_provider() {
        assert!(matches!(
            AgentExecutorBuilder::new().build(),
            Err(Error::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = ScriptedProvider::new(vec![Ok(end_turn("Xin chào"))]);
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .system_prompt("sys")
            .build()
            .unwrap();

        assert_eq!(executor.answer("Chào".to_string()).await.unwrap(), "Xin chào");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("sys"));
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let provider = ScriptedProvider::new(vec![
            Ok(tool_call("call_1", "lookup", json!({"symbol": "ABC"}))),
            Ok(end_turn("SMA(9) của ABC là 12.50")),
        ]);
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .tool_registry(registry(vec![FixedTool {
                name: "lookup",
                outcome: Ok("SMA(9) hiện tại của ABC là: 12.50".to_string()),
            }]))
            .build()
            .unwrap();

        let answer = executor.run("Tính SMA9 của mã ABC".to_string()).await.unwrap();
        assert_eq!(answer, "SMA(9) của ABC là 12.50");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(1));
        let (content, is_error) = last_tool_result(&requests[1]);
        assert_eq!(content, "SMA(9) hiện tại của ABC là: 12.50");
        assert_eq!(is_error, None);
    }

    #[tokio::test]
    async fn test_tool_error_is_absorbed() {
        let provider = ScriptedProvider::new(vec![
            Ok(tool_call("call_1", "lookup", json!({"symbol": "ZZZZ"}))),
            Ok(end_turn("Không tìm thấy dữ liệu cho ZZZZ")),
        ]);
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .tool_registry(registry(vec![FixedTool {
                name: "lookup",
                outcome: Err(ToolError::Transient(
                    "Lỗi khi lấy thông tin công ty ZZZZ: connection refused".to_string(),
                )),
            }]))
            .build()
            .unwrap();

        let answer = executor.run("ZZZZ là công ty gì?".to_string()).await.unwrap();
        assert_eq!(answer, "Không tìm thấy dữ liệu cho ZZZZ");

        let requests = provider.requests.lock().unwrap();
        let (content, is_error) = last_tool_result(&requests[1]);
        assert_eq!(content, "Lỗi khi lấy thông tin công ty ZZZZ: connection refused");
        assert_eq!(is_error, Some(true));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails_the_run() {
        let provider = ScriptedProvider::new(vec![Ok(tool_call("c", "nope", json!({})))]);
        let executor = AgentExecutor::builder().provider(provider).build().unwrap();

        let err = executor.run("?".to_string()).await.unwrap_err();
        assert!(err.to_string().contains("Tool not found: nope"));
    }

    #[tokio::test]
    async fn test_provider_error_is_processing_failure() {
        let provider = ScriptedProvider::new(vec![Err(LLMError::AuthenticationFailed)]);
        let executor = AgentExecutor::builder().provider(provider).build().unwrap();

        let err = executor.run("?".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::ProcessingFailed(ref msg) if msg.contains("authentication")));
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let provider = ScriptedProvider::new(vec![
            Ok(tool_call("1", "lookup", json!({}))),
            Ok(tool_call("2", "lookup", json!({}))),
            Ok(tool_call("3", "lookup", json!({}))),
        ]);
        let executor = AgentExecutor::builder()
            .provider(provider.clone())
            .tool_registry(registry(vec![FixedTool {
                name: "lookup",
                outcome: Ok("x".to_string()),
            }]))
            .max_iterations(2)
            .build()
            .unwrap();

        let err = executor.run("?".to_string()).await.unwrap_err();
        assert!(err.to_string().contains("2 iterations"));
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_final_answer_is_returned_as_is() {
        let provider = ScriptedProvider::new(vec![Ok(end_turn(""))]);
        let executor = AgentExecutor::builder().provider(provider).build().unwrap();
        assert_eq!(executor.run("?".to_string()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_empty_closing_turn_keeps_earlier_text() {
        let with_text = CompletionResponse {
            message: Message::assistant_blocks(vec![
                ContentBlock::Text {
                    text: "Giá HPG đang tăng.".to_string(),
                },
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "lookup".to_string(),
                    input: json!({"symbol": "HPG"}),
                },
            ]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };
        let provider = ScriptedProvider::new(vec![Ok(with_text), Ok(end_turn(""))]);
        let executor = AgentExecutor::builder()
            .provider(provider)
            .tool_registry(registry(vec![FixedTool {
                name: "lookup",
                outcome: Ok("27.35".to_string()),
            }]))
            .build()
            .unwrap();

        assert_eq!(
            executor.run("Giá HPG?".to_string()).await.unwrap(),
            "Giá HPG đang tăng."
        );
    }
}
