use time::macros::offset;
use time::{Date, OffsetDateTime, UtcOffset};

/// Exchange wall-clock offset (Asia/Shanghai, no DST).
const MARKET_OFFSET: UtcOffset = offset!(+8);

/// Source of "today" for end-date handling.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Current date on the exchange calendar.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(MARKET_OFFSET).date()
    }
}

/// Pinned date, for deterministic tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
