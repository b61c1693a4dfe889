//! Plain-text tables handed back to the model

use crate::models::{CompanyProfile, Officer, PriceBar, Shareholder, Subsidiary};
use chrono::NaiveDate;
use comfy_table::Table;
use comfy_table::presets::ASCII_MARKDOWN;

/// Columns of the price history table, in order
pub const PRICE_COLUMNS: [&str; 6] = ["time", "open", "high", "low", "close", "volume"];

fn table(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN).set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

fn percent(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "-".to_string(), |r| format!("{:.2}%", r * 100.0))
}

fn date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn text(value: Option<&str>) -> String {
    value.map_or_else(|| "-".to_string(), str::to_string)
}

/// Daily bars, oldest first
pub fn price_table(bars: &[PriceBar]) -> String {
    table(
        &PRICE_COLUMNS,
        bars.iter().map(|bar| {
            vec![
                bar.time.format("%Y-%m-%d").to_string(),
                format!("{:.2}", bar.open),
                format!("{:.2}", bar.high),
                format!("{:.2}", bar.low),
                format!("{:.2}", bar.close),
                bar.volume.to_string(),
            ]
        }),
    )
}

pub fn profile_table(profile: &CompanyProfile) -> String {
    let rows = [
        ("symbol", profile.symbol.clone()),
        ("sector", text(profile.sector.as_deref())),
        ("industry", text(profile.industry.as_deref())),
        ("sub_industry", text(profile.sub_industry.as_deref())),
        ("issue_share", number(profile.issue_share, 0)),
        ("company_profile", text(profile.company_profile.as_deref())),
        ("history", text(profile.history.as_deref())),
    ];
    table(
        &["field", "value"],
        rows.into_iter().map(|(k, v)| vec![k.to_string(), v]),
    )
}

pub fn shareholders_table(holders: &[Shareholder]) -> String {
    table(
        &["name", "quantity", "ownership", "update_date"],
        holders.iter().map(|h| {
            vec![
                h.name.clone(),
                number(h.quantity, 0),
                percent(h.ownership),
                date(h.update_date),
            ]
        }),
    )
}

pub fn officers_table(officers: &[Officer]) -> String {
    table(
        &["name", "position", "quantity", "ownership", "update_date"],
        officers.iter().map(|o| {
            vec![
                o.name.clone(),
                text(o.position.as_deref()),
                number(o.quantity, 0),
                percent(o.ownership),
                date(o.update_date),
            ]
        }),
    )
}

pub fn subsidiaries_table(subsidiaries: &[Subsidiary]) -> String {
    table(
        &["code", "name", "ownership"],
        subsidiaries.iter().map(|s| {
            vec![
                text(s.code.as_deref()),
                s.name.clone(),
                percent(s.ownership),
            ]
        }),
    )
}
