//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat model that can answer a completion request
///
/// One request is one model turn; the agent loop in `agent-runtime` calls this
/// repeatedly while the model keeps asking for tools.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate the next assistant message for the conversation in `request`
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name used in logs
    fn name(&self) -> &str;
}
