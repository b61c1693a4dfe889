//! LLM provider abstraction for the vnstock agent
//!
//! Provider-agnostic message, completion and tool-definition types, the
//! [`LLMProvider`] trait, and an OpenAI-compatible chat-completions provider
//! that is pointed at Gemini in production.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;
