use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifiers for the upstream kline endpoints the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Tencent forward-adjusted day/week/month klines.
    TencentDay,
    /// Tencent intraday minute klines.
    TencentMinute,
    /// Sina unified kline endpoint, every frequency.
    Sina,
}

impl SourceId {
    pub const ALL: [Self; 3] = [Self::Sina, Self::TencentDay, Self::TencentMinute];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TencentDay => "tencent_day",
            Self::TencentMinute => "tencent_minute",
            Self::Sina => "sina",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
