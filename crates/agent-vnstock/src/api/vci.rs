//! VCI (Vietcap) market data client
//!
//! Daily bars come from the chart endpoint, company records from the
//! trading site's GraphQL endpoint. Both are public but expect browser-like
//! headers.

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::{CompanyProfile, Officer, PriceBar, Shareholder, Subsidiary};
use crate::source::MarketDataSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Ho_Chi_Minh;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde_json::{Value, json};
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const SITE_REFERER: &str = "https://trading.vietcap.com.vn/";
const SITE_ORIGIN: &str = "https://trading.vietcap.com.vn";

const PROFILE_QUERY: &str = "query Query($ticker: String!) {
  CompanyListingInfo(ticker: $ticker) {
    id
    issueShare
    history
    companyProfile
    icbName2
    icbName3
    icbName4
  }
}";

const SHAREHOLDERS_QUERY: &str = "query Query($ticker: String!) {
  OrganizationShareHolders(ticker: $ticker) {
    id
    ownerFullName
    quantity
    percentage
    updateDate
  }
}";

const OFFICERS_QUERY: &str = "query Query($ticker: String!) {
  OrganizationManagers(ticker: $ticker) {
    id
    fullName
    positionName
    positionShortName
    percentage
    quantity
    updateDate
  }
}";

const SUBSIDIARIES_QUERY: &str = "query Query($ticker: String!) {
  Subsidiary(ticker: $ticker) {
    id
    organCode
    subOrganCode
    percentage
    subOrListingInfo {
      organName
    }
  }
}";

/// HTTP client for the VCI trading site
pub struct VciClient {
    client: Client,
    history_url: String,
    graphql_url: String,
    price_divisor: f64,
}

impl VciClient {
    /// Create a client from the service configuration
    pub fn new(config: &StockConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(SITE_REFERER));
        headers.insert(ORIGIN, HeaderValue::from_static(SITE_ORIGIN));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            history_url: config.history_url(),
            graphql_url: config.graphql_url(),
            price_divisor: config.price_divisor,
        })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "VCI request failed");
            return Err(StockError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Run one GraphQL query and pull out its top-level field
    async fn graphql(&self, query: &str, symbol: &str, field: &str) -> Result<Option<Value>> {
        debug!(%symbol, %field, "VCI GraphQL query");
        let body = json!({
            "query": query,
            "variables": { "ticker": symbol, "lang": "vi" },
        });
        let payload = self.post_json(&self.graphql_url, &body).await?;
        graphql_field(payload, field)
    }
}

#[async_trait]
impl MarketDataSource for VciClient {
    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        if start > end {
            return Err(StockError::InvalidDate(format!(
                "start {start} is after end {end}"
            )));
        }

        // Trading days never outnumber calendar days, so this covers the range.
        let count_back = (end - start).num_days() + 1;
        let body = json!({
            "timeFrame": "ONE_DAY",
            "symbols": [symbol],
            "to": end_of_day_timestamp(end),
            "countBack": count_back,
        });
        debug!(%symbol, %start, %end, count_back, "VCI history request");

        let payload = self.post_json(&self.history_url, &body).await?;
        let bars = parse_history(&payload, self.price_divisor)?;
        Ok(bars
            .into_iter()
            .filter(|bar| bar.time >= start && bar.time <= end)
            .collect())
    }

    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        let record = self
            .graphql(PROFILE_QUERY, symbol, "CompanyListingInfo")
            .await?;
        Ok(record
            .map(|value| parse_profile(symbol, &value))
            .filter(|profile| !profile.is_empty()))
    }

    async fn shareholders(&self, symbol: &str) -> Result<Vec<Shareholder>> {
        let rows = self
            .graphql(SHAREHOLDERS_QUERY, symbol, "OrganizationShareHolders")
            .await?;
        Ok(rows.as_ref().map(parse_shareholders).unwrap_or_default())
    }

    async fn officers(&self, symbol: &str) -> Result<Vec<Officer>> {
        let rows = self
            .graphql(OFFICERS_QUERY, symbol, "OrganizationManagers")
            .await?;
        Ok(rows.as_ref().map(parse_officers).unwrap_or_default())
    }

    async fn subsidiaries(&self, symbol: &str) -> Result<Vec<Subsidiary>> {
        let rows = self.graphql(SUBSIDIARIES_QUERY, symbol, "Subsidiary").await?;
        Ok(rows.as_ref().map(parse_subsidiaries).unwrap_or_default())
    }

    fn name(&self) -> &str {
        "vci"
    }
}

/// Unix timestamp of the midnight that ends `date` in Vietnam
fn end_of_day_timestamp(date: NaiveDate) -> i64 {
    let midnight = (date + Duration::days(1)).and_time(NaiveTime::MIN);
    Ho_Chi_Minh
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| midnight.and_utc().timestamp(), |dt| dt.timestamp())
}

fn date_from_unix_seconds(seconds: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.with_timezone(&Ho_Chi_Minh).date_naive())
}

/// Number or numeric string
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Epoch milliseconds, or an ISO-like date string
fn update_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.with_timezone(&Ho_Chi_Minh).date_naive()),
        Value::String(s) => s
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()),
        _ => None,
    }
}

fn graphql_field(mut payload: Value, field: &str) -> Result<Option<Value>> {
    let value = payload
        .get_mut("data")
        .and_then(|data| data.get_mut(field))
        .map(Value::take)
        .filter(|value| !value.is_null());
    if value.is_some() {
        return Ok(value);
    }

    let errors: Vec<String> = payload
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if errors.is_empty() {
        Ok(None)
    } else {
        Err(StockError::Provider(errors.join("; ")))
    }
}

fn series<'a>(entry: &'a Value, key: &str) -> Result<&'a [Value]> {
    entry
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| StockError::UnexpectedResponse(format!("missing series '{key}'")))
}

/// Parse the chart payload into bars, dropping every field but OHLCV and time
///
/// Rows keep the provider's chronological order.
pub fn parse_history(payload: &Value, price_divisor: f64) -> Result<Vec<PriceBar>> {
    let entries = payload.as_array().ok_or_else(|| {
        StockError::UnexpectedResponse("history payload is not an array".to_string())
    })?;
    let Some(entry) = entries.first() else {
        return Ok(Vec::new());
    };

    let times = series(entry, "t")?;
    let opens = series(entry, "o")?;
    let highs = series(entry, "h")?;
    let lows = series(entry, "l")?;
    let closes = series(entry, "c")?;
    let volumes = series(entry, "v")?;

    let len = times.len();
    if [opens, highs, lows, closes, volumes]
        .iter()
        .any(|s| s.len() != len)
    {
        return Err(StockError::UnexpectedResponse(
            "history series have different lengths".to_string(),
        ));
    }

    let price = |values: &[Value], i: usize, key: &str| -> Result<f64> {
        number(&values[i])
            .map(|v| v / price_divisor)
            .ok_or_else(|| StockError::UnexpectedResponse(format!("non-numeric {key} at row {i}")))
    };

    let mut bars = Vec::with_capacity(len);
    for i in 0..len {
        let time = number(&times[i])
            .and_then(|t| date_from_unix_seconds(t as i64))
            .ok_or_else(|| StockError::UnexpectedResponse(format!("bad timestamp at row {i}")))?;
        let volume = number(&volumes[i])
            .ok_or_else(|| StockError::UnexpectedResponse(format!("non-numeric volume at row {i}")))?;

        bars.push(PriceBar {
            time,
            open: price(opens, i, "open")?,
            high: price(highs, i, "high")?,
            low: price(lows, i, "low")?,
            close: price(closes, i, "close")?,
            volume: volume.max(0.0).round() as u64,
        });
    }

    Ok(bars)
}

pub fn parse_profile(symbol: &str, record: &Value) -> CompanyProfile {
    CompanyProfile {
        symbol: symbol.to_string(),
        sector: string(&record["icbName2"]),
        industry: string(&record["icbName3"]),
        sub_industry: string(&record["icbName4"]),
        issue_share: number(&record["issueShare"]),
        company_profile: string(&record["companyProfile"]),
        history: string(&record["history"]),
    }
}

fn rows(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

pub fn parse_shareholders(value: &Value) -> Vec<Shareholder> {
    rows(value)
        .iter()
        .filter_map(|row| {
            Some(Shareholder {
                name: string(&row["ownerFullName"])?,
                quantity: number(&row["quantity"]),
                ownership: number(&row["percentage"]),
                update_date: update_date(&row["updateDate"]),
            })
        })
        .collect()
}

pub fn parse_officers(value: &Value) -> Vec<Officer> {
    rows(value)
        .iter()
        .filter_map(|row| {
            Some(Officer {
                name: string(&row["fullName"])?,
                position: string(&row["positionName"]).or_else(|| string(&row["positionShortName"])),
                quantity: number(&row["quantity"]),
                ownership: number(&row["percentage"]),
                update_date: update_date(&row["updateDate"]),
            })
        })
        .collect()
}

pub fn parse_subsidiaries(value: &Value) -> Vec<Subsidiary> {
    rows(value)
        .iter()
        .filter_map(|row| {
            let code = string(&row["subOrganCode"]);
            let name = string(&row["subOrListingInfo"]["organName"]).or_else(|| code.clone())?;
            Some(Subsidiary {
                code,
                name,
                ownership: number(&row["percentage"]),
            })
        })
        .collect()
}
