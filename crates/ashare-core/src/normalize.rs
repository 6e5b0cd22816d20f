//! Shared table-shape contract.
//!
//! Each adapter turns its provider payload into [`RawRow`]s (text time plus
//! loosely typed numeric cells), then [`parse_bars`] coerces them and
//! [`finish_series`] enforces ordering and the requested length.

use std::collections::BTreeMap;

use serde_json::Value;
use time::PrimitiveDateTime;

use crate::data_source::SourceError;
use crate::domain::timestamp::parse_bar_timestamp;
use crate::{Bar, BarSeries, Frequency, SecurityCode};

/// Column order of every normalized table, independent of provider order.
pub const COLUMNS: [&str; 6] = ["time", "open", "close", "high", "low", "volume"];

/// One provider row before numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub time: String,
    pub open: Value,
    pub close: Value,
    pub high: Value,
    pub low: Value,
    pub volume: Value,
}

impl RawRow {
    /// Read a positional Tencent row: `[time, open, close, high, low, volume, ..]`.
    /// Trailing cells are ignored.
    pub fn from_positional(cells: &[Value]) -> Result<Self, SourceError> {
        if cells.len() < 6 {
            return Err(SourceError::parse(format!(
                "kline row has {} cells, expected at least 6",
                cells.len()
            )));
        }

        let time = cells[0]
            .as_str()
            .ok_or_else(|| SourceError::parse("kline row time is not a string"))?;

        Ok(Self {
            time: time.to_owned(),
            open: cells[1].clone(),
            close: cells[2].clone(),
            high: cells[3].clone(),
            low: cells[4].clone(),
            volume: cells[5].clone(),
        })
    }
}

/// Coerce a numeric cell given either as a JSON number or numeric text.
pub fn coerce_decimal(column: &str, value: &Value) -> Result<f64, SourceError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(number) if number.is_finite() => Ok(number),
        _ => Err(SourceError::parse(format!(
            "column '{column}' has non-numeric value {value}"
        ))),
    }
}

pub fn parse_bar(row: &RawRow) -> Result<Bar, SourceError> {
    let timestamp = parse_bar_timestamp(&row.time)
        .map_err(|error| SourceError::parse(error.to_string()))?;

    Ok(Bar::new(
        timestamp,
        coerce_decimal("open", &row.open)?,
        coerce_decimal("close", &row.close)?,
        coerce_decimal("high", &row.high)?,
        coerce_decimal("low", &row.low)?,
        coerce_decimal("volume", &row.volume)?,
    ))
}

pub fn parse_bars<'a>(rows: impl IntoIterator<Item = &'a RawRow>) -> Result<Vec<Bar>, SourceError> {
    rows.into_iter().map(parse_bar).collect()
}

/// Order bars by time, collapse duplicate timestamps (the later row wins) and
/// keep the most recent `count`.
///
/// # Errors
///
/// Returns an empty-result error when no bars remain.
pub fn finish_series(
    code: SecurityCode,
    frequency: Frequency,
    bars: Vec<Bar>,
    count: usize,
) -> Result<BarSeries, SourceError> {
    let by_time = bars
        .into_iter()
        .map(|bar| (bar.timestamp, bar))
        .collect::<BTreeMap<PrimitiveDateTime, Bar>>();

    if by_time.is_empty() {
        return Err(SourceError::empty_result(format!(
            "no {frequency} bars returned for '{code}'"
        )));
    }

    let skip = by_time.len().saturating_sub(count);
    let bars = by_time.into_values().skip(skip).collect();
    Ok(BarSeries::from_sorted(code, frequency, bars))
}
