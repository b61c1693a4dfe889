//! Wiring of provider, tools and executor into the analyst agent

use crate::config::StockConfig;
use crate::prompts::SYSTEM_PROMPT;
use crate::source::MarketDataSource;
use crate::tools::build_registry;
use agent_llm::LLMProvider;
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_runtime::AgentExecutor;
use std::sync::Arc;
use tracing::info;

/// Gemini through its OpenAI-compatible endpoint
pub fn gemini_provider(config: &StockConfig) -> agent_llm::Result<OpenAIProvider> {
    let provider_config = OpenAIConfig::new(config.google_api_key.clone())
        .with_api_base(config.llm_api_base.clone())
        .with_timeout(config.llm_timeout.as_secs());
    OpenAIProvider::with_config(provider_config)
}

/// Build the executor that answers chat questions
pub fn build_executor(
    provider: Arc<dyn LLMProvider>,
    source: Arc<dyn MarketDataSource>,
    config: Arc<StockConfig>,
) -> agent_core::Result<AgentExecutor> {
    let registry = build_registry(source, config.clone());
    info!(
        model = %config.model,
        provider = provider.name(),
        tools = ?registry.names(),
        "Building stock agent"
    );

    AgentExecutor::builder()
        .provider(provider)
        .tool_registry(Arc::new(registry))
        .model(config.model.clone())
        .system_prompt(SYSTEM_PROMPT)
        .max_iterations(config.max_iterations)
        .max_tokens(config.max_tokens)
        .temperature(config.temperature)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockMarketDataSource;
    use agent_llm::{CompletionRequest, CompletionResponse, LLMError};
    use async_trait::async_trait;

    struct OfflineProvider;

    #[async_trait]
    impl LLMProvider for OfflineProvider {
        async fn complete(&self, _request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            Err(LLMError::RequestFailed("offline".to_string()))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    #[test]
    fn test_gemini_provider_requires_key() {
        assert!(gemini_provider(&StockConfig::default()).is_err());

        let config = StockConfig::builder().google_api_key("key").build().unwrap();
        let provider = gemini_provider(&config).unwrap();
        assert_eq!(
            provider.config().api_base,
            "https://generativelanguage.googleapis.com/v1beta/openai"
        );
    }

    #[test]
    fn test_build_executor_uses_config() {
        let config = StockConfig::builder()
            .google_api_key("key")
            .model("gemini-2.0-flash")
            .max_iterations(4)
            .build()
            .unwrap();
        let executor = build_executor(
            Arc::new(OfflineProvider),
            Arc::new(MockMarketDataSource::new()),
            Arc::new(config),
        )
        .unwrap();

        assert_eq!(executor.config().max_iterations, 4);
        assert_eq!(executor.config().model, "gemini-2.0-flash");
        assert_eq!(executor.config().system_prompt.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(executor.config().temperature, Some(0.0));
    }
}
