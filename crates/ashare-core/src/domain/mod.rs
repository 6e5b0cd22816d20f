//! # Domain Models
//!
//! Canonical types shared by every source adapter.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SecurityCode`] | Market-prefixed security code (`sh600519`) |
//! | [`Frequency`] | Bar period (1m, 5m, 15m, 30m, 60m, 1d, 1w, 1M) |
//! | [`Bar`] | Timezone-naive OHLCV bar |
//! | [`BarSeries`] | Ordered bars for one code and frequency |

mod code;
mod frequency;
mod models;
pub mod timestamp;

pub use code::SecurityCode;
pub use frequency::Frequency;
pub use models::{Bar, BarSeries};
