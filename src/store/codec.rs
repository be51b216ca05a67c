//! Key and row encoding for the table store

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

/// Separates the ticker from the date in COT keys.
pub const KEY_SEPARATOR: u8 = 0;

const DATE_FORMAT: &str = "%Y-%m-%d";
const STORED_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn price_key(date: NaiveDate) -> Vec<u8> {
    date.format(DATE_FORMAT).to_string().into_bytes()
}

pub fn cot_key(ticker: &str, date_text: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(ticker.len() + 1 + date_text.len());
    key.extend_from_slice(ticker.as_bytes());
    key.push(KEY_SEPARATOR);
    key.extend_from_slice(date_text.as_bytes());
    key
}

/// Splits a COT key into its ticker and raw date text.
pub fn split_cot_key(key: &[u8]) -> Option<(&str, &str)> {
    let pos = key.iter().position(|b| *b == KEY_SEPARATOR)?;
    let ticker = std::str::from_utf8(&key[..pos]).ok()?;
    let date = std::str::from_utf8(&key[pos + 1..]).ok()?;
    if ticker.is_empty() {
        return None;
    }
    Some((ticker, date))
}

/// Encodes a row as a JSON object; NaN cells become `null`.
pub fn encode_row(values: &BTreeMap<String, f64>) -> serde_json::Result<Vec<u8>> {
    let row: BTreeMap<&str, Option<f64>> = values
        .iter()
        .map(|(k, v)| (k.as_str(), if v.is_nan() { None } else { Some(*v) }))
        .collect();
    serde_json::to_vec(&row)
}

/// Decodes a JSON row; `null` cells become NaN.
pub fn decode_row(bytes: &[u8]) -> serde_json::Result<BTreeMap<String, f64>> {
    let row: BTreeMap<String, Option<f64>> = serde_json::from_slice(bytes)?;
    Ok(row
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or(f64::NAN)))
        .collect())
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Reads a date that was stored in an already-normalized timestamp form.
fn parse_stored_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    STORED_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
}

/// Converts the date level of an index to calendar dates.
///
/// The whole level is parsed as `YYYY-MM-DD` first. If that fails the level is
/// taken to be normalized already and each entry is read in whichever stored
/// form it has. Returns `None` only when some entry is not temporal at all.
pub fn normalize_dates(raw: &[&str]) -> Option<Vec<NaiveDate>> {
    let strict: Option<Vec<NaiveDate>> = raw.iter().map(|s| parse_date(s)).collect();
    if strict.is_some() {
        return strict;
    }
    debug!("Date index is not in {DATE_FORMAT} form, keeping stored timestamps");
    raw.iter()
        .map(|s| parse_date(s).or_else(|| parse_stored_date(s)))
        .collect()
}
