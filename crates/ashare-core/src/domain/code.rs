use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

const SHANGHAI_SUFFIX: &str = ".XSHG";
const SHENZHEN_SUFFIX: &str = ".XSHE";

/// Security code in the market-prefixed form the quote providers expect
/// (`sh600519`, `sz000001`).
///
/// Joinquant-style suffixed codes (`600519.XSHG`, `000001.XSHE`) are rewritten;
/// anything else is assumed to already be in provider form and passes through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityCode(String);

impl SecurityCode {
    pub fn normalize(raw: &str) -> Self {
        let prefix = if raw.contains(SHANGHAI_SUFFIX) {
            Some("sh")
        } else if raw.contains(SHENZHEN_SUFFIX) {
            Some("sz")
        } else {
            None
        };

        match prefix {
            Some(prefix) => {
                let digits = raw
                    .replace(SHANGHAI_SUFFIX, "")
                    .replace(SHENZHEN_SUFFIX, "");
                Self(format!("{prefix}{digits}"))
            }
            None => Self(raw.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SecurityCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
