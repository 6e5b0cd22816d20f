use serde::Serialize;
use time::PrimitiveDateTime;

use super::timestamp::serialize_bar_timestamp;
use crate::{Frequency, SecurityCode};

/// One OHLCV observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    #[serde(rename = "time", serialize_with = "serialize_bar_timestamp")]
    pub timestamp: PrimitiveDateTime,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: PrimitiveDateTime,
        open: f64,
        close: f64,
        high: f64,
        low: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            close,
            high,
            low,
            volume,
        }
    }
}

/// Ordered bars for one code and frequency.
///
/// Built by [`crate::normalize::finish_series`], which guarantees strictly
/// increasing timestamps and at most the requested number of bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    code: SecurityCode,
    frequency: Frequency,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub(crate) fn from_sorted(code: SecurityCode, frequency: Frequency, bars: Vec<Bar>) -> Self {
        Self {
            code,
            frequency,
            bars,
        }
    }

    pub fn code(&self) -> &SecurityCode {
        &self.code
    }

    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
