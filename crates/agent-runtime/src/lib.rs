//! Agent loop for the vnstock agent
//!
//! [`AgentExecutor`] runs the LLM → tool calls → tool results → LLM cycle and
//! implements [`agent_core::QuestionAnswerer`] so the HTTP layer can drive it.

pub mod executor;

pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
