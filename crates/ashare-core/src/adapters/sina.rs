use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use time::Date;
use tracing::debug;

use super::{fetch_body, parse_json};
use crate::clock::{Clock, SystemClock};
use crate::data_source::{BarSource, FetchRequest, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::normalize::{finish_series, parse_bars, RawRow};
use crate::{BarSeries, Frequency, SourceId};

pub const DEFAULT_SINA_URL: &str = "http://money.finance.sina.com.cn/quotes_service/api/json_v2.php/CN_MarketData.getKLineData";

#[derive(Debug, Deserialize)]
struct SinaKline {
    day: String,
    open: Value,
    high: Value,
    low: Value,
    close: Value,
    volume: Value,
}

impl From<SinaKline> for RawRow {
    fn from(kline: SinaKline) -> Self {
        Self {
            time: kline.day,
            open: kline.open,
            close: kline.close,
            high: kline.high,
            low: kline.low,
            volume: kline.volume,
        }
    }
}

/// Sina unified kline endpoint, serving intraday and day/week/month bars.
///
/// The endpoint has no end-date parameter; it always returns the latest
/// `datalen` bars. Bounded daily-family requests therefore over-fetch by the
/// calendar distance to the end date and trim afterwards.
#[derive(Clone)]
pub struct SinaAdapter {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for SinaAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), Arc::new(SystemClock))
    }
}

impl SinaAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            http_client,
            clock,
            base_url: DEFAULT_SINA_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn request_url(&self, req: &FetchRequest) -> String {
        format!(
            "{}?symbol={}&scale={}&ma=5&datalen={}",
            self.base_url,
            req.code,
            scale(req.frequency),
            self.datalen(req)
        )
    }

    /// Number of bars to ask for: `count`, plus enough extra bars to reach
    /// back to the end date for bounded daily-family requests.
    fn datalen(&self, req: &FetchRequest) -> usize {
        let Some(end_date) = bounded_end_date(req) else {
            return req.count;
        };
        let Some(divisor) = bars_per_day_divisor(req.frequency) else {
            return req.count;
        };

        let elapsed_days = (self.clock.today() - end_date).whole_days();
        let extra = elapsed_days.div_euclid(divisor).max(0);
        req.count.saturating_add(usize::try_from(extra).unwrap_or(usize::MAX))
    }

    async fn fetch_series(&self, req: FetchRequest) -> Result<BarSeries, SourceError> {
        let url = self.request_url(&req);
        let body = fetch_body(self.http_client.as_ref(), self.id(), url, self.timeout_ms).await?;

        let payload = parse_json(self.id(), &body)?;
        if payload.is_null() {
            return Err(SourceError::empty_result(format!(
                "sina returned no {} bars for '{}'",
                req.frequency, req.code
            )));
        }

        let klines = serde_json::from_value::<Vec<SinaKline>>(payload)
            .map_err(|error| SourceError::parse(format!("unexpected sina kline shape: {error}")))?;
        let rows = klines.into_iter().map(RawRow::from).collect::<Vec<_>>();
        let mut bars = parse_bars(&rows)?;

        if let Some(end_date) = bounded_end_date(&req) {
            let fetched = bars.len();
            bars.retain(|bar| bar.timestamp.date() <= end_date);
            debug!(
                code = %req.code,
                %end_date,
                fetched,
                kept = bars.len(),
                "trimmed sina bars past end date"
            );
        }

        finish_series(req.code, req.frequency, bars, req.count)
    }
}

impl BarSource for SinaAdapter {
    fn id(&self) -> SourceId {
        SourceId::Sina
    }

    fn supports(&self, _frequency: Frequency) -> bool {
        true
    }

    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_series(req))
    }
}

/// Provider `scale` parameter: bucket width in minutes, with trading-day
/// equivalents for day (240), week (1200) and month (7200).
fn scale(frequency: Frequency) -> u32 {
    match frequency {
        Frequency::Daily => 240,
        Frequency::Weekly => 1200,
        Frequency::Monthly => 7200,
        intraday => intraday.minutes().unwrap_or(1),
    }
}

/// Calendar days per bar used to size the over-fetch.
fn bars_per_day_divisor(frequency: Frequency) -> Option<i64> {
    match frequency {
        Frequency::Daily => Some(1),
        Frequency::Weekly => Some(4),
        Frequency::Monthly => Some(29),
        _ => None,
    }
}

/// End date that bounds the result: only daily-family requests are trimmed.
fn bounded_end_date(req: &FetchRequest) -> Option<Date> {
    req.end_date.filter(|_| req.frequency.is_daily_family())
}
