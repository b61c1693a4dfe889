//! Concrete LLM provider implementations

pub mod openai;

pub use openai::{GEMINI_OPENAI_API_BASE, OpenAIConfig, OpenAIProvider};
