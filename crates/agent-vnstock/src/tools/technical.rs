//! Tool for calculating daily SMA and RSI

use super::{normalize_symbol, today_in_vietnam};
use crate::config::StockConfig;
use crate::indicators::{Indicator, IndicatorError, IndicatorValue};
use crate::source::MarketDataSource;
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolResult, parse_params};
use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

pub const UNSUPPORTED_INDICATOR: &str = "Chỉ hỗ trợ SMA hoặc RSI.";
pub const NOT_ENOUGH_DATA: &str = "Không đủ dữ liệu để tính toán.";

#[derive(Debug, Deserialize)]
struct TechnicalParams {
    symbol: String,
    indicator: String,
    #[serde(default)]
    window_size: Option<usize>,
}

/// Tool for calculating technical indicators
pub struct TechnicalIndicatorTool {
    source: Arc<dyn MarketDataSource>,
    config: Arc<StockConfig>,
}

impl TechnicalIndicatorTool {
    pub fn new(source: Arc<dyn MarketDataSource>, config: Arc<StockConfig>) -> Self {
        Self { source, config }
    }
}

#[async_trait]
impl Tool for TechnicalIndicatorTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let params: TechnicalParams = parse_params(params)?;

        // Checked before anything else so an unknown indicator costs no fetch.
        let indicator: Indicator = params
            .indicator
            .parse()
            .map_err(|_| ToolError::InvalidInput(UNSUPPORTED_INDICATOR.to_string()))?;
        let window = params
            .window_size
            .unwrap_or(self.config.default_indicator_window);
        if window == 0 {
            return Err(ToolError::InvalidInput(format!(
                "Không đủ dữ liệu để tính toán {indicator}(0): window_size phải lớn hơn 0."
            )));
        }
        let symbol = normalize_symbol(&params.symbol)?;

        let end = today_in_vietnam();
        let start = end - Duration::days(self.config.indicator_lookback_days);
        info!(%symbol, %indicator, window, "Calculating indicator");

        let bars = self
            .source
            .price_history(&symbol, start, end)
            .await
            .map_err(|e| e.into_tool_error("Lỗi tính toán"))?;

        if bars.is_empty() {
            return Err(ToolError::NotFound(NOT_ENOUGH_DATA.to_string()));
        }

        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        debug!(%symbol, samples = closes.len(), "Closing prices loaded");

        let value = indicator.latest(&closes, window).map_err(|e| match e {
            IndicatorError::NotEnoughData { needed, available } => {
                ToolError::InvalidInput(format!(
                    "Không đủ dữ liệu để tính toán {indicator}({window}) cho {symbol}: \
                     cần {needed} phiên, chỉ có {available} phiên."
                ))
            }
            other => ToolError::InvalidInput(format!("Lỗi tính toán: {other}")),
        })?;

        Ok(IndicatorValue {
            kind: indicator,
            window,
            symbol,
            value,
        }
        .to_string())
    }

    fn name(&self) -> &str {
        "calculate_technical_indicators"
    }

    fn description(&self) -> &str {
        "Tính toán chỉ số kỹ thuật SMA hoặc RSI theo ngày (daily timeframe). \
         Ví dụ: symbol='HPG', indicator='RSI', window_size=14. \
         Lưu ý: 1m = 1 tháng, 1w = 1 tuần, 1d = 1 ngày."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Mã chứng khoán, ví dụ: HPG"),
                "indicator": schema::string_enum("Chỉ số cần tính", &["SMA", "RSI"]),
                "window_size": schema::integer_with_default(
                    "Số phiên của cửa sổ tính",
                    self.config.default_indicator_window as i64,
                ),
            }),
            &["symbol", "indicator"],
        )
    }
}
