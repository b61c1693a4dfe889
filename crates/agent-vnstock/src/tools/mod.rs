//! Market data tools exposed to the agent

pub mod company;
pub mod stock_history;
pub mod technical;

pub use company::{CompanyOfficersTool, CompanyProfileTool, ShareholdersTool, SubsidiariesTool};
pub use stock_history::StockHistoryTool;
pub use technical::TechnicalIndicatorTool;

use crate::config::StockConfig;
use crate::source::MarketDataSource;
use agent_tools::{ToolError, ToolRegistry, ToolResult};
use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Ho_Chi_Minh;
use serde::Deserialize;
use std::sync::Arc;

/// Arguments of the tools that only take a ticker
#[derive(Debug, Deserialize)]
pub(crate) struct SymbolParams {
    pub symbol: String,
}

/// Trim and upper-case a ticker
pub fn normalize_symbol(raw: &str) -> ToolResult<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ToolError::InvalidInput(
            "Mã chứng khoán không được để trống.".to_string(),
        ));
    }
    Ok(symbol)
}

/// Current calendar date on the Ho Chi Minh City exchange
pub fn today_in_vietnam() -> NaiveDate {
    Utc::now().with_timezone(&Ho_Chi_Minh).date_naive()
}

/// Registry holding all six tools over one data source
pub fn build_registry(source: Arc<dyn MarketDataSource>, config: Arc<StockConfig>) -> ToolRegistry {
    ToolRegistry::new()
        .with(Arc::new(CompanyProfileTool::new(source.clone())))
        .with(Arc::new(StockHistoryTool::new(source.clone(), config.clone())))
        .with(Arc::new(TechnicalIndicatorTool::new(source.clone(), config)))
        .with(Arc::new(ShareholdersTool::new(source.clone())))
        .with(Arc::new(CompanyOfficersTool::new(source.clone())))
        .with(Arc::new(SubsidiariesTool::new(source)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockMarketDataSource;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" hpg ").unwrap(), "HPG");
        assert!(matches!(
            normalize_symbol("   "),
            Err(ToolError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_registry_has_all_tools() {
        let source: Arc<dyn MarketDataSource> = Arc::new(MockMarketDataSource::new());
        let registry = build_registry(source, Arc::new(StockConfig::default()));

        assert_eq!(
            registry.names(),
            vec![
                "get_company_info",
                "get_stock_history",
                "calculate_technical_indicators",
                "get_major_shareholders",
                "get_company_officers",
                "get_subsidiaries",
            ]
        );
        for tool in registry.list_tools() {
            assert!(!tool.description().is_empty());
            assert_eq!(tool.input_schema()["required"][0], "symbol");
        }
    }
}
