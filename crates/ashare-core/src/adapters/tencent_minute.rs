use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{fetch_body, lookup, parse_json};
use crate::data_source::{BarSource, FetchRequest, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::normalize::{coerce_decimal, finish_series, parse_bars, RawRow};
use crate::{BarSeries, Frequency, SourceId};

pub const DEFAULT_TENCENT_MINUTE_URL: &str = "http://ifzq.gtimg.cn/appstock/app/kline/mkline";

/// Position of the last traded price inside the `qt` quote array.
const QUOTE_PRICE_INDEX: usize = 3;

/// Tencent intraday klines. The endpoint only serves the latest `count`
/// bars; end dates are not forwarded.
#[derive(Clone)]
pub struct TencentMinuteAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for TencentMinuteAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl TencentMinuteAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_TENCENT_MINUTE_URL.to_owned(),
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
            "{}?param={},m{},,{}",
            self.base_url,
            req.code,
            minute_multiplier(req.frequency),
            req.count
        )
    }

    async fn fetch_series(&self, req: FetchRequest) -> Result<BarSeries, SourceError> {
        if !self.supports(req.frequency) {
            return Err(SourceError::invalid_request(format!(
                "tencent_minute cannot serve '{}' bars",
                req.frequency
            )));
        }
        if let Some(end_date) = req.end_date {
            debug!(
                code = %req.code,
                %end_date,
                "tencent_minute serves latest bars only; end date not forwarded"
            );
        }

        let url = self.request_url(&req);
        let body = fetch_body(self.http_client.as_ref(), self.id(), url, self.timeout_ms).await?;
        let payload = parse_json(self.id(), &body)?;

        let code = req.code.as_str();
        let series_key = format!("m{}", minute_multiplier(req.frequency));
        let rows = lookup(self.id(), &payload, &["data", code, series_key.as_str()])?
            .as_array()
            .ok_or_else(|| {
                SourceError::parse(format!("tencent_minute '{series_key}' is not an array"))
            })?
            .iter()
            .map(|row| match row {
                Value::Array(cells) => RawRow::from_positional(cells),
                other => Err(SourceError::parse(format!(
                    "tencent_minute kline row is not an array: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let live_close = live_price(&payload, code)?;
        let mut bars = parse_bars(&rows)?;

        // The last minute bar lags the live quote; trust the quote.
        if let Some(latest) = bars.iter_mut().max_by_key(|bar| bar.timestamp) {
            latest.close = live_close;
        }

        finish_series(req.code, req.frequency, bars, req.count)
    }
}

impl BarSource for TencentMinuteAdapter {
    fn id(&self) -> SourceId {
        SourceId::TencentMinute
    }

    fn supports(&self, frequency: Frequency) -> bool {
        frequency.is_intraday()
    }

    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_series(req))
    }
}

/// Numeric prefix of the frequency label (`5m` -> 5); 1 when it does not parse.
fn minute_multiplier(frequency: Frequency) -> u32 {
    let label = frequency.as_str();
    label[..label.len() - 1].parse().unwrap_or(1)
}

fn live_price(payload: &Value, code: &str) -> Result<f64, SourceError> {
    let quote = lookup(SourceId::TencentMinute, payload, &["data", code, "qt", code])?;
    let price = quote.get(QUOTE_PRICE_INDEX).ok_or_else(|| {
        SourceError::parse(format!(
            "tencent_minute quote for '{code}' has no price at index {QUOTE_PRICE_INDEX}"
        ))
    })?;
    coerce_decimal("qt", price)
}
