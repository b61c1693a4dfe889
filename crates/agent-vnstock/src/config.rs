//! Configuration for the vnstock agent service

use crate::error::{Result, StockError};
use agent_utils::{EnvError, EnvSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_VCI_BASE_URL: &str = "https://trading.vietcap.com.vn";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const MISSING_API_KEY_MESSAGE: &str =
    "Chưa tìm thấy GOOGLE_API_KEY. Vui lòng kiểm tra file .env";

/// Configuration for the agent, the market data client and the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Gemini key; never logged
    #[serde(skip_serializing)]
    pub google_api_key: String,

    pub model: String,

    /// OpenAI-compatible base URL of the LLM endpoint
    pub llm_api_base: String,

    pub llm_timeout: Duration,

    pub max_tokens: usize,

    pub temperature: f32,

    /// Upper bound on LLM round trips per question
    pub max_iterations: usize,

    /// Root of the VCI trading site; chart and GraphQL paths hang off it
    pub vci_base_url: String,

    /// Request timeout for market data calls
    pub request_timeout: Duration,

    /// VCI quotes in VND; prices are reported in thousand VND
    pub price_divisor: f64,

    /// Window used by the price history tool when no dates are given
    pub history_default_days: i64,

    /// Calendar days fetched before computing an indicator
    pub indicator_lookback_days: i64,

    pub default_indicator_window: usize,

    pub host: String,

    pub port: u16,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            llm_api_base: agent_llm::providers::GEMINI_OPENAI_API_BASE.to_string(),
            llm_timeout: Duration::from_secs(120),
            max_tokens: 4096,
            temperature: 0.0,
            max_iterations: 10,
            vci_base_url: DEFAULT_VCI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            price_divisor: 1000.0,
            history_default_days: 90,
            indicator_lookback_days: 180,
            default_indicator_window: 14,
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Read configuration from the environment
    ///
    /// `GOOGLE_API_KEY` is required; everything else falls back to defaults.
    pub fn from_env(env: &EnvSource) -> Result<Self> {
        let defaults = Self::default();
        let google_api_key = env.require("GOOGLE_API_KEY").map_err(|e| match e {
            EnvError::Missing { .. } => StockError::Config(MISSING_API_KEY_MESSAGE.to_string()),
            other => other.into(),
        })?;

        let config = Self {
            google_api_key,
            model: env.string_or("GEMINI_MODEL", &defaults.model),
            llm_api_base: env.string_or("LLM_API_BASE", &defaults.llm_api_base),
            llm_timeout: Duration::from_secs(env.parse_or("LLM_TIMEOUT_SECS", 120)?),
            max_tokens: defaults.max_tokens,
            temperature: env.parse_or("LLM_TEMPERATURE", defaults.temperature)?,
            max_iterations: env.parse_or("AGENT_MAX_ITERATIONS", defaults.max_iterations)?,
            vci_base_url: env.string_or("VCI_BASE_URL", &defaults.vci_base_url),
            request_timeout: Duration::from_secs(env.parse_or("REQUEST_TIMEOUT_SECS", 30)?),
            price_divisor: defaults.price_divisor,
            history_default_days: defaults.history_default_days,
            indicator_lookback_days: defaults.indicator_lookback_days,
            default_indicator_window: defaults.default_indicator_window,
            host: env.string_or("HOST", &defaults.host),
            port: env.parse_or("PORT", defaults.port)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.google_api_key.trim().is_empty() {
            return Err(StockError::Config(MISSING_API_KEY_MESSAGE.to_string()));
        }

        if self.max_iterations == 0 {
            return Err(StockError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.price_divisor <= 0.0 {
            return Err(StockError::Config(
                "price_divisor must be positive".to_string(),
            ));
        }

        if self.history_default_days < 0 || self.indicator_lookback_days <= 0 {
            return Err(StockError::Config(
                "lookback windows must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn history_url(&self) -> String {
        format!(
            "{}/api/chart/OHLCChart/gap-chart",
            self.vci_base_url.trim_end_matches('/')
        )
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/data-mt/graphql", self.vci_base_url.trim_end_matches('/'))
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    google_api_key: Option<String>,
    model: Option<String>,
    llm_api_base: Option<String>,
    max_iterations: Option<usize>,
    vci_base_url: Option<String>,
    request_timeout: Option<Duration>,
    history_default_days: Option<i64>,
    indicator_lookback_days: Option<i64>,
    host: Option<String>,
    port: Option<u16>,
}

impl StockConfigBuilder {
    pub fn google_api_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn llm_api_base(mut self, base: impl Into<String>) -> Self {
        self.llm_api_base = Some(base.into());
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn vci_base_url(mut self, url: impl Into<String>) -> Self {
        self.vci_base_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn history_default_days(mut self, days: i64) -> Self {
        self.history_default_days = Some(days);
        self
    }

    pub fn indicator_lookback_days(mut self, days: i64) -> Self {
        self.indicator_lookback_days = Some(days);
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();
        let config = StockConfig {
            google_api_key: self.google_api_key.unwrap_or_default(),
            model: self.model.unwrap_or(defaults.model),
            llm_api_base: self.llm_api_base.unwrap_or(defaults.llm_api_base),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            vci_base_url: self.vci_base_url.unwrap_or(defaults.vci_base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            history_default_days: self
                .history_default_days
                .unwrap_or(defaults.history_default_days),
            indicator_lookback_days: self
                .indicator_lookback_days
                .unwrap_or(defaults.indicator_lookback_days),
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
