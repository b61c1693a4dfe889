//! The question-answering capability

use crate::Result;
use async_trait::async_trait;

/// Something that turns a natural-language question into a final answer
///
/// The HTTP façade only sees this trait. In production it is backed by the
/// tool-using LLM loop in `agent-runtime`; tests substitute fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    /// Answer a single question
    ///
    /// The conversation starts with exactly one user message and the returned
    /// string is the last assistant message.
    async fn answer(&self, question: String) -> Result<String>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
