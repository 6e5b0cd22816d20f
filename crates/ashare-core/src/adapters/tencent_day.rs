use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{fetch_body, lookup, parse_json};
use crate::clock::{Clock, SystemClock};
use crate::data_source::{BarSource, FetchRequest, SourceError};
use crate::domain::timestamp::format_date;
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::normalize::{finish_series, parse_bars, RawRow};
use crate::{BarSeries, Frequency, SourceId};

pub const DEFAULT_TENCENT_DAY_URL: &str = "http://web.ifzq.gtimg.cn/appstock/app/fqkline/get";

/// Which series of the per-code payload was used.
///
/// Equities carry a forward-adjusted series (`qfqday`); indices only carry the
/// raw one (`day`). Selection is by key presence, adjusted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesVariant {
    Adjusted,
    Raw,
}

impl SeriesVariant {
    const LOOKUP_ORDER: [Self; 2] = [Self::Adjusted, Self::Raw];

    fn key(self, unit: &str) -> String {
        match self {
            Self::Adjusted => format!("qfq{unit}"),
            Self::Raw => unit.to_owned(),
        }
    }
}

/// Tencent day/week/month klines (forward-adjusted where available).
#[derive(Clone)]
pub struct TencentDayAdapter {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for TencentDayAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), Arc::new(SystemClock))
    }
}

impl TencentDayAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            http_client,
            clock,
            base_url: DEFAULT_TENCENT_DAY_URL.to_owned(),
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

    /// Query URL for a request. An end date equal to today is sent empty, since
    /// the provider only includes the live bar when no end date is given.
    pub fn request_url(&self, req: &FetchRequest) -> String {
        let today = self.clock.today();
        let end_date = match req.end_date {
            Some(date) if date != today => format_date(date),
            _ => String::new(),
        };

        format!(
            "{}?param={},{},,{},{},qfq",
            self.base_url,
            req.code,
            unit(req.frequency),
            end_date,
            req.count
        )
    }

    async fn fetch_series(&self, req: FetchRequest) -> Result<BarSeries, SourceError> {
        if !self.supports(req.frequency) {
            return Err(SourceError::invalid_request(format!(
                "tencent_day cannot serve '{}' bars",
                req.frequency
            )));
        }

        let url = self.request_url(&req);
        let body = fetch_body(self.http_client.as_ref(), self.id(), url, self.timeout_ms).await?;
        let payload = parse_json(self.id(), &body)?;

        let unit = unit(req.frequency);
        let stock = lookup(self.id(), &payload, &["data", req.code.as_str()])?;
        let (variant, rows) = select_series(stock, unit).ok_or_else(|| {
            SourceError::parse(format!(
                "tencent_day response for '{}' has neither 'qfq{unit}' nor '{unit}'",
                req.code
            ))
        })?;
        debug!(code = %req.code, ?variant, rows = rows.len(), "selected tencent_day series");

        let rows = rows
            .iter()
            .map(|row| match row {
                Value::Array(cells) => RawRow::from_positional(cells),
                other => Err(SourceError::parse(format!(
                    "tencent_day kline row is not an array: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bars = parse_bars(&rows)?;
        finish_series(req.code, req.frequency, bars, req.count)
    }
}

impl BarSource for TencentDayAdapter {
    fn id(&self) -> SourceId {
        SourceId::TencentDay
    }

    fn supports(&self, frequency: Frequency) -> bool {
        frequency.is_daily_family()
    }

    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_series(req))
    }
}

fn unit(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Weekly => "week",
        Frequency::Monthly => "month",
        _ => "day",
    }
}

fn select_series<'a>(stock: &'a Value, unit: &str) -> Option<(SeriesVariant, &'a Vec<Value>)> {
    SeriesVariant::LOOKUP_ORDER.into_iter().find_map(|variant| {
        stock
            .get(variant.key(unit))
            .and_then(Value::as_array)
            .map(|rows| (variant, rows))
    })
}
