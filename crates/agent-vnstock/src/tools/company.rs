//! Company lookups: profile, shareholders, officers, subsidiaries

use super::{SymbolParams, normalize_symbol};
use crate::format;
use crate::source::MarketDataSource;
use agent_llm::tools::schema;
use agent_tools::{Tool, ToolError, ToolResult, parse_params};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

fn symbol_schema() -> Value {
    schema::object(
        json!({ "symbol": schema::string("Mã chứng khoán, ví dụ: VCB, HPG") }),
        &["symbol"],
    )
}

fn symbol_from(params: Value) -> ToolResult<String> {
    let params: SymbolParams = parse_params(params)?;
    normalize_symbol(&params.symbol)
}

/// Company overview
pub struct CompanyProfileTool {
    source: Arc<dyn MarketDataSource>,
}

impl CompanyProfileTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for CompanyProfileTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let symbol = symbol_from(params)?;
        info!(%symbol, "Fetching company profile");

        let profile = self
            .source
            .company_profile(&symbol)
            .await
            .map_err(|e| e.into_tool_error(&format!("Lỗi khi lấy thông tin công ty {symbol}")))?;

        match profile {
            Some(profile) => Ok(format::profile_table(&profile)),
            None => Err(ToolError::NotFound(format!(
                "Không tìm thấy thông tin cho mã {symbol}."
            ))),
        }
    }

    fn name(&self) -> &str {
        "get_company_info"
    }

    fn description(&self) -> &str {
        "Tra cứu thông tin hồ sơ, tổng quan về một công ty dựa trên mã chứng khoán (ticker)."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// Major shareholders
pub struct ShareholdersTool {
    source: Arc<dyn MarketDataSource>,
}

impl ShareholdersTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for ShareholdersTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let symbol = symbol_from(params)?;
        info!(%symbol, "Fetching major shareholders");

        let holders = self.source.shareholders(&symbol).await.map_err(|e| {
            e.into_tool_error(&format!("Lỗi khi lấy danh sách cổ đông {symbol}"))
        })?;

        if holders.is_empty() {
            return Err(ToolError::NotFound(format!(
                "Không tìm thấy thông tin cổ đông cho mã {symbol}."
            )));
        }
        Ok(format::shareholders_table(&holders))
    }

    fn name(&self) -> &str {
        "get_major_shareholders"
    }

    fn description(&self) -> &str {
        "Lấy danh sách cổ đông lớn (major shareholders) của một công ty theo mã chứng khoán."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// Officers currently in office
pub struct CompanyOfficersTool {
    source: Arc<dyn MarketDataSource>,
}

impl CompanyOfficersTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for CompanyOfficersTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let symbol = symbol_from(params)?;
        info!(%symbol, "Fetching company officers");

        let officers = self.source.officers(&symbol).await.map_err(|e| {
            e.into_tool_error(&format!("Lỗi khi lấy danh sách ban lãnh đạo {symbol}"))
        })?;

        if officers.is_empty() {
            return Err(ToolError::NotFound(format!(
                "Không tìm thấy thông tin ban lãnh đạo cho mã {symbol}."
            )));
        }
        Ok(format::officers_table(&officers))
    }

    fn name(&self) -> &str {
        "get_company_officers"
    }

    fn description(&self) -> &str {
        "Lấy danh sách ban lãnh đạo (officers) đang làm việc của một công ty theo mã chứng khoán."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

pub struct SubsidiariesTool {
    source: Arc<dyn MarketDataSource>,
}

impl SubsidiariesTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for SubsidiariesTool {
    async fn execute(&self, params: Value) -> ToolResult<String> {
        let symbol = symbol_from(params)?;
        info!(%symbol, "Fetching subsidiaries");

        let subsidiaries = self.source.subsidiaries(&symbol).await.map_err(|e| {
            e.into_tool_error(&format!("Lỗi khi lấy danh sách công ty con {symbol}"))
        })?;

        if subsidiaries.is_empty() {
            return Err(ToolError::NotFound(format!(
                "Không tìm thấy thông tin công ty con cho mã {symbol}."
            )));
        }
        Ok(format::subsidiaries_table(&subsidiaries))
    }

    fn name(&self) -> &str {
        "get_subsidiaries"
    }

    fn description(&self) -> &str {
        "Lấy danh sách các công ty con (subsidiaries) của một công ty theo mã chứng khoán."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}
