use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::adapters::{
    SinaAdapter, TencentDayAdapter, TencentMinuteAdapter, DEFAULT_SINA_URL,
    DEFAULT_TENCENT_DAY_URL, DEFAULT_TENCENT_MINUTE_URL,
};
use crate::clock::{Clock, SystemClock};
use crate::data_source::{BarSource, FetchRequest, QuoteRequest, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{BarSeries, Frequency, SourceId};

/// Primary source for a frequency and the source tried when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePlan {
    pub primary: SourceId,
    pub fallback: Option<SourceId>,
}

impl RoutePlan {
    /// Routing policy:
    ///
    /// | frequency | primary | fallback |
    /// |-----------|---------|----------|
    /// | 1d, 1w, 1M | sina | tencent_day |
    /// | 1m | tencent_minute | none |
    /// | 5m, 15m, 30m, 60m | sina | tencent_minute |
    pub const fn for_frequency(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Daily | Frequency::Weekly | Frequency::Monthly => Self {
                primary: SourceId::Sina,
                fallback: Some(SourceId::TencentDay),
            },
            Frequency::OneMinute => Self {
                primary: SourceId::TencentMinute,
                fallback: None,
            },
            Frequency::FiveMinutes
            | Frequency::FifteenMinutes
            | Frequency::ThirtyMinutes
            | Frequency::SixtyMinutes => Self {
                primary: SourceId::Sina,
                fallback: Some(SourceId::TencentMinute),
            },
        }
    }

    pub fn chain(self) -> Vec<SourceId> {
        std::iter::once(self.primary).chain(self.fallback).collect()
    }
}

/// One failed adapter attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAttempt {
    pub source: SourceId,
    pub error: SourceError,
}

/// Successful routed call.
#[derive(Debug, Clone)]
pub struct RouteSuccess<T> {
    pub data: T,
    pub selected_source: SourceId,
    pub source_chain: Vec<SourceId>,
    /// Failed attempts that preceded the successful one.
    pub failures: Vec<SourceAttempt>,
    pub latency_ms: u64,
}

/// Failed routed call after the plan is exhausted.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    pub source_chain: Vec<SourceId>,
    pub failures: Vec<SourceAttempt>,
    pub latency_ms: u64,
}

impl RouteFailure {
    /// Error of the last source tried; this is what gets reported.
    pub fn final_error(&self) -> Option<&SourceError> {
        self.failures.last().map(|attempt| &attempt.error)
    }
}

pub type RouteResult<T> = Result<RouteSuccess<T>, RouteFailure>;

/// Adapter registry and routing engine.
///
/// Holds no per-request state: concurrent `route` calls are independent.
pub struct SourceRouter {
    adapters: HashMap<SourceId, Arc<dyn BarSource>>,
}

impl Default for SourceRouter {
    fn default() -> Self {
        SourceRouterBuilder::new().build()
    }
}

impl SourceRouter {
    pub fn new(adapters: Vec<Arc<dyn BarSource>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.id(), adapter))
            .collect();
        Self { adapters }
    }

    pub fn is_registered(&self, source: SourceId) -> bool {
        self.adapters.contains_key(&source)
    }

    /// Fetch bars for `req`, trying the primary source and then, only if it
    /// failed, the fallback. At most one upstream call is in flight.
    pub async fn route(&self, req: &QuoteRequest) -> RouteResult<BarSeries> {
        let started = Instant::now();
        let fetch = FetchRequest::from(req);
        let plan = RoutePlan::for_frequency(req.frequency);

        let mut source_chain = Vec::with_capacity(2);
        let mut failures = Vec::new();

        for source in plan.chain() {
            source_chain.push(source);

            let result = match self.adapters.get(&source) {
                Some(adapter) => adapter.fetch(fetch.clone()).await,
                None => Err(SourceError::adapter_not_registered(source)),
            };

            match result {
                Ok(data) => {
                    let latency_ms = elapsed_ms(started);
                    info!(
                        code = %req.code,
                        frequency = %req.frequency,
                        source = %source,
                        bars = data.len(),
                        fallback = !failures.is_empty(),
                        latency_ms,
                        "kline route succeeded"
                    );
                    return Ok(RouteSuccess {
                        data,
                        selected_source: source,
                        source_chain,
                        failures,
                        latency_ms,
                    });
                }
                Err(error) => {
                    warn!(
                        code = %req.code,
                        frequency = %req.frequency,
                        source = %source,
                        error = %error,
                        "kline source failed"
                    );
                    failures.push(SourceAttempt { source, error });
                }
            }
        }

        let latency_ms = elapsed_ms(started);
        warn!(
            code = %req.code,
            frequency = %req.frequency,
            attempts = failures.len(),
            latency_ms,
            "kline route exhausted"
        );
        Err(RouteFailure {
            source_chain,
            failures,
            latency_ms,
        })
    }
}

/// Builder wiring the three production adapters over one shared HTTP client.
///
/// # Environment Variables
///
/// | Variable | Default |
/// |----------|---------|
/// | `ASHARE_TENCENT_DAY_URL` | [`DEFAULT_TENCENT_DAY_URL`] |
/// | `ASHARE_TENCENT_MINUTE_URL` | [`DEFAULT_TENCENT_MINUTE_URL`] |
/// | `ASHARE_SINA_URL` | [`DEFAULT_SINA_URL`] |
/// | `ASHARE_HTTP_TIMEOUT_MS` | `10000` |
///
/// # Example
///
/// ```rust,ignore
/// use ashare_core::SourceRouterBuilder;
///
/// let router = SourceRouterBuilder::new().with_env_overrides().build();
/// ```
pub struct SourceRouterBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Arc<dyn Clock>,
    tencent_day_url: String,
    tencent_minute_url: String,
    sina_url: String,
    timeout_ms: u64,
}

impl Default for SourceRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRouterBuilder {
    pub fn new() -> Self {
        Self {
            http_client: None,
            clock: Arc::new(SystemClock),
            tencent_day_url: DEFAULT_TENCENT_DAY_URL.to_owned(),
            tencent_minute_url: DEFAULT_TENCENT_MINUTE_URL.to_owned(),
            sina_url: DEFAULT_SINA_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Apply endpoint and timeout overrides from the environment.
    /// Unset or unparsable variables leave the current value in place.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("ASHARE_TENCENT_DAY_URL") {
            self.tencent_day_url = url;
        }
        if let Ok(url) = env::var("ASHARE_TENCENT_MINUTE_URL") {
            self.tencent_minute_url = url;
        }
        if let Ok(url) = env::var("ASHARE_SINA_URL") {
            self.sina_url = url;
        }
        match env::var("ASHARE_HTTP_TIMEOUT_MS").map(|raw| raw.trim().parse::<u64>()) {
            Ok(Ok(timeout_ms)) if timeout_ms > 0 => self.timeout_ms = timeout_ms,
            Ok(_) => warn!("ignoring invalid ASHARE_HTTP_TIMEOUT_MS"),
            Err(_) => {}
        }
        self
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tencent_day_url(mut self, url: impl Into<String>) -> Self {
        self.tencent_day_url = url.into();
        self
    }

    pub fn with_tencent_minute_url(mut self, url: impl Into<String>) -> Self {
        self.tencent_minute_url = url.into();
        self
    }

    pub fn with_sina_url(mut self, url: impl Into<String>) -> Self {
        self.sina_url = url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn build(self) -> SourceRouter {
        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestHttpClient::new()),
        };

        let sina = SinaAdapter::new(Arc::clone(&http_client), Arc::clone(&self.clock))
            .with_base_url(self.sina_url)
            .with_timeout_ms(self.timeout_ms);
        let tencent_day = TencentDayAdapter::new(Arc::clone(&http_client), Arc::clone(&self.clock))
            .with_base_url(self.tencent_day_url)
            .with_timeout_ms(self.timeout_ms);
        let tencent_minute = TencentMinuteAdapter::new(http_client)
            .with_base_url(self.tencent_minute_url)
            .with_timeout_ms(self.timeout_ms);

        let adapters: Vec<Arc<dyn BarSource>> = vec![
            Arc::new(sina),
            Arc::new(tencent_day),
            Arc::new(tencent_minute),
        ];
        SourceRouter::new(adapters)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
