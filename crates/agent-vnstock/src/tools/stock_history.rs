//! Daily OHLCV history

use super::{normalize_symbol, today_in_vietnam};
use crate::config::StockConfig;
use crate::format;
use crate::source::MarketDataSource;
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolResult, parse_params};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct HistoryParams {
    symbol: String,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    days_ago: Option<i64>,
}

fn parse_date(raw: Option<&str>) -> ToolResult<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            ToolError::InvalidInput(format!(
                "Ngày không hợp lệ '{raw}', cần định dạng YYYY-MM-DD."
            ))
        })
}

/// Resolve the requested window against `today`
///
/// A missing end is today; a missing start is `today - days_ago`, not
/// `end - days_ago`.
pub fn resolve_date_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
    days_ago: i64,
    today: NaiveDate,
) -> ToolResult<(NaiveDate, NaiveDate)> {
    if days_ago < 0 {
        return Err(ToolError::InvalidInput(format!(
            "days_ago phải không âm, nhận được {days_ago}."
        )));
    }

    let end = parse_date(end_date)?.unwrap_or(today);
    let start = match parse_date(start_date)? {
        Some(start) => start,
        None => Duration::try_days(days_ago)
            .and_then(|span| today.checked_sub_signed(span))
            .ok_or_else(|| {
                ToolError::InvalidInput(format!("days_ago quá lớn: {days_ago}."))
            })?,
    };

    if start > end {
        return Err(ToolError::InvalidInput(format!(
            "Ngày bắt đầu {start} sau ngày kết thúc {end}."
        )));
    }
    Ok((start, end))
}

/// Price history over a date window
pub struct StockHistoryTool {
    source: Arc<dyn MarketDataSource>,
    config: Arc<StockConfig>,
}

impl StockHistoryTool {
    pub fn new(source: Arc<dyn MarketDataSource>, config: Arc<StockConfig>) -> Self {
        Self { source, config }
    }
}

#[async_trait]
impl Tool for StockHistoryTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let params: HistoryParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let (start, end) = resolve_date_range(
            params.start_date.as_deref(),
            params.end_date.as_deref(),
            params.days_ago.unwrap_or(self.config.history_default_days),
            today_in_vietnam(),
        )?;
        info!(%symbol, %start, %end, "Fetching price history");

        let bars = self
            .source
            .price_history(&symbol, start, end)
            .await
            .map_err(|e| e.into_tool_error(&format!("Lỗi khi lấy lịch sử giá {symbol}")))?;

        if bars.is_empty() {
            return Err(ToolError::NotFound(format!(
                "Không có dữ liệu giá cho {symbol} từ {start} đến {end}."
            )));
        }

        Ok(format!(
            "Giá {symbol} từ {start} đến {end} (đơn vị giá: nghìn VND):\n{}",
            format::price_table(&bars)
        ))
    }

    fn name(&self) -> &str {
        "get_stock_history"
    }

    fn description(&self) -> &str {
        "Lấy dữ liệu giá lịch sử (Open, High, Low, Close, Volume). \
         Input ngày format YYYY-MM-DD. Mặc định lấy 90 ngày nếu không có input."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Mã chứng khoán, ví dụ: HPG"),
                "start_date": schema::string("Ngày bắt đầu, YYYY-MM-DD"),
                "end_date": schema::string("Ngày kết thúc, YYYY-MM-DD"),
                "days_ago": schema::integer_with_default(
                    "Số ngày lùi lại từ hôm nay khi không có start_date",
                    self.config.history_default_days,
                ),
            }),
            &["symbol"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;
    use crate::models::PriceBar;
    use crate::source::MockMarketDataSource;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_range_is_relative_to_today() {
        let today = day(2024, 11, 20);
        let (start, end) = resolve_date_range(None, None, 90, today).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, day(2024, 8, 22));

        // only an end date: start still counts back from today
        let (start, end) = resolve_date_range(None, Some("2024-11-10"), 10, today).unwrap();
        assert_eq!(start, day(2024, 11, 10));
        assert_eq!(end, day(2024, 11, 10));
    }

    #[test]
    fn test_explicit_range() {
        let (start, end) =
            resolve_date_range(Some("2024-11-01"), Some(" 2024-11-15 "), 90, day(2025, 1, 1))
                .unwrap();
        assert_eq!(start, day(2024, 11, 1));
        assert_eq!(end, day(2024, 11, 15));

        let (start, _) = resolve_date_range(Some(""), None, 0, day(2024, 11, 20)).unwrap();
        assert_eq!(start, day(2024, 11, 20));
    }

    #[test]
    fn test_invalid_ranges() {
        let today = day(2024, 11, 20);
        assert!(matches!(
            resolve_date_range(Some("01/11/2024"), None, 90, today),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_date_range(Some("2024-02-30"), None, 90, today),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_date_range(None, None, -1, today),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_date_range(Some("2024-11-15"), Some("2024-11-01"), 90, today),
            Err(ToolError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_days_ago_beyond_calendar() {
        let today = day(2024, 11, 20);
        for days_ago in [200_000_000, i64::MAX] {
            assert!(matches!(
                resolve_date_range(None, None, days_ago, today),
                Err(ToolError::InvalidInput(ref m)) if m.contains("days_ago")
            ));
        }
        // an explicit start never looks at days_ago
        assert!(resolve_date_range(Some("2024-11-01"), None, i64::MAX, today).is_ok());
    }

    fn tool(source: MockMarketDataSource) -> StockHistoryTool {
        StockHistoryTool::new(Arc::new(source), Arc::new(StockConfig::default()))
    }

    #[tokio::test]
    async fn test_history_table() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_price_history()
            .times(1)
            .returning(|symbol, start, end| {
                assert_eq!(symbol, "HPG");
                assert_eq!(start, day(2024, 11, 1));
                assert_eq!(end, day(2024, 11, 5));
                Ok(vec![PriceBar {
                    time: day(2024, 11, 4),
                    open: 27.0,
                    high: 27.5,
                    low: 26.9,
                    close: 27.35,
                    volume: 12_500_000,
                }])
            });

        let output = tool(source)
            .execute(json!({
                "symbol": "hpg",
                "start_date": "2024-11-01",
                "end_date": "2024-11-05"
            }))
            .await
            .unwrap();
        assert!(output.starts_with("Giá HPG từ 2024-11-01 đến 2024-11-05"));
        assert!(output.contains("| time"));
        assert!(output.contains("27.35"));
        assert!(output.contains("12500000"));
    }

    #[tokio::test]
    async fn test_history_defaults_to_configured_window() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_price_history()
            .returning(|_, start, end| {
                assert_eq!((end - start).num_days(), 90);
                Ok(vec![])
            });

        let err = tool(source)
            .execute(json!({ "symbol": "VCB" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref m) if m.starts_with("Không có dữ liệu giá cho VCB từ ")));
    }

    #[tokio::test]
    async fn test_history_failure() {
        let mut source = MockMarketDataSource::new();
        source.expect_price_history().returning(|_, _, _| {
            Err(StockError::UnexpectedResponse("history payload is not an array".to_string()))
        });

        let err = tool(source)
            .execute(json!({ "symbol": "HPG", "days_ago": 10 }))
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Lỗi khi lấy lịch sử giá HPG: Unexpected response: history payload is not an array"
        );
    }

    #[tokio::test]
    async fn test_bad_date_never_reaches_source() {
        let err = tool(MockMarketDataSource::new())
            .execute(json!({ "symbol": "HPG", "start_date": "hôm qua" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_huge_days_ago_never_reaches_source() {
        let err = tool(MockMarketDataSource::new())
            .execute(json!({ "symbol": "HPG", "days_ago": 200_000_000 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
