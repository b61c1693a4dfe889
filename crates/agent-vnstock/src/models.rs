//! Market data records as returned by a [`crate::source::MarketDataSource`]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar
///
/// Only these six fields survive parsing, whatever else the provider sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub time: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Company overview from the listing record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    /// ICB level 2 name
    pub sector: Option<String>,
    /// ICB level 3 name
    pub industry: Option<String>,
    /// ICB level 4 name
    pub sub_industry: Option<String>,
    pub issue_share: Option<f64>,
    pub company_profile: Option<String>,
    pub history: Option<String>,
}

impl CompanyProfile {
    /// True when the provider returned a record with nothing in it
    pub fn is_empty(&self) -> bool {
        self.sector.is_none()
            && self.industry.is_none()
            && self.sub_industry.is_none()
            && self.issue_share.is_none()
            && self.company_profile.is_none()
            && self.history.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shareholder {
    pub name: String,
    pub quantity: Option<f64>,
    /// Ownership ratio, 0.0..=1.0
    pub ownership: Option<f64>,
    pub update_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    pub name: String,
    pub position: Option<String>,
    pub quantity: Option<f64>,
    /// Ownership ratio, 0.0..=1.0
    pub ownership: Option<f64>,
    pub update_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsidiary {
    pub code: Option<String>,
    pub name: String,
    /// Parent's ownership ratio, 0.0..=1.0
    pub ownership: Option<f64>,
}
