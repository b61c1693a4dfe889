//! Market data capability consumed by the tools

use crate::error::Result;
use crate::models::{CompanyProfile, Officer, PriceBar, Shareholder, Subsidiary};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Anything that can answer the six market questions for a ticker
///
/// Symbols arrive already trimmed and upper-cased. Implementations return an
/// empty collection (or `None`) when the provider simply has nothing for the
/// symbol, and an error only when the request itself failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars with `start <= time <= end`, ascending by date
    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>>;

    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>>;

    async fn shareholders(&self, symbol: &str) -> Result<Vec<Shareholder>>;

    /// Officers currently in office
    async fn officers(&self, symbol: &str) -> Result<Vec<Officer>>;

    async fn subsidiaries(&self, symbol: &str) -> Result<Vec<Subsidiary>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
