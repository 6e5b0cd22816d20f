//! Offline doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use ashare_core::{
    Bar, BarSeries, BarSource, FetchRequest, Frequency, HttpClient, HttpError, HttpRequest,
    HttpResponse, SourceError, SourceId,
};
use serde_json::{json, Value};
use time::macros::{date, datetime};
use time::Date;

/// Fixed "today" used across the suites.
pub const TODAY: Date = date!(2024-03-08);

/// HTTP client answering from a URL script and recording every request.
#[derive(Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<HashMap<String, Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.lock_responses().insert(
            url.into(),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        );
    }

    pub fn respond_json(&self, url: impl Into<String>, body: &Value) {
        self.respond(url, 200, body.to_string());
    }

    pub fn fail(&self, url: impl Into<String>, message: &str) {
        self.lock_responses()
            .insert(url.into(), Err(HttpError::new(message)));
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, Result<HttpResponse, HttpError>>> {
        self.responses.lock().expect("responses lock")
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let outcome = self
            .lock_responses()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Err(HttpError::new(format!("unscripted url {}", request.url))));
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { outcome })
    }
}

/// Router-level stand-in for an adapter with a fixed outcome.
pub struct StubSource {
    id: SourceId,
    outcome: Result<Vec<Bar>, SourceError>,
    calls: Mutex<Vec<FetchRequest>>,
}

impl StubSource {
    pub fn succeeding(id: SourceId, bars: Vec<Bar>) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome: Ok(bars),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(id: SourceId, error: SourceError) -> Arc<Self> {
        Arc::new(Self {
            id,
            outcome: Err(error),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl BarSource for StubSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn supports(&self, _frequency: Frequency) -> bool {
        true
    }

    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        self.calls.lock().expect("calls lock").push(req.clone());
        let outcome = self.outcome.clone();
        Box::pin(async move {
            let bars = outcome?;
            ashare_core::normalize::finish_series(req.code, req.frequency, bars, req.count)
        })
    }
}

/// Five consecutive trading-day bars ending on 2024-03-08.
pub fn daily_bars() -> Vec<Bar> {
    vec![
        Bar::new(datetime!(2024-03-04 00:00), 10.0, 10.2, 10.3, 9.9, 1000.0),
        Bar::new(datetime!(2024-03-05 00:00), 10.2, 10.4, 10.5, 10.1, 1100.0),
        Bar::new(datetime!(2024-03-06 00:00), 10.4, 10.3, 10.6, 10.2, 1200.0),
        Bar::new(datetime!(2024-03-07 00:00), 10.3, 10.6, 10.7, 10.2, 1300.0),
        Bar::new(datetime!(2024-03-08 00:00), 10.6, 10.8, 10.9, 10.5, 1400.0),
    ]
}

/// Tencent day payload; `series_key` is `qfqday`, `day`, `qfqweek`, ...
pub fn tencent_day_payload(code: &str, series_key: &str) -> Value {
    json!({
        "code": 0,
        "msg": "",
        "data": {
            code: {
                series_key: [
                    ["2024-03-05", "10.20", "10.40", "10.50", "10.10", "1100.000"],
                    ["2024-03-06", "10.40", "10.30", "10.60", "10.20", "1200.000"],
                    ["2024-03-07", "10.30", "10.60", "10.70", "10.20", "1300.000", {"nd": "2024-03-07"}],
                    ["2024-03-08", "10.60", "10.80", "10.90", "10.50", "1400.000"]
                ],
                "qt": {},
            }
        }
    })
}

/// Tencent minute payload with a live quote price of `live_price`.
pub fn tencent_minute_payload(code: &str, series_key: &str, live_price: &str) -> Value {
    json!({
        "code": 0,
        "msg": "",
        "data": {
            code: {
                series_key: [
                    ["202403081455", "10.70", "10.72", "10.73", "10.69", "5200.00", {}, ""],
                    ["202403081500", "10.72", "10.75", "10.76", "10.71", "6100.00", {}, ""],
                    ["202403081450", "10.68", "10.70", "10.71", "10.66", "4800.00", {}, ""]
                ],
                "qt": {
                    code: ["1", "平安银行", "000001", live_price, "10.70", "10.65"]
                }
            }
        }
    })
}

/// Sina daily payload covering 2024-03-04 ..= 2024-03-08.
pub fn sina_daily_payload() -> Value {
    json!([
        {"day": "2024-03-04", "open": "10.000", "high": "10.300", "low": "9.900", "close": "10.200", "volume": "1000", "ma_price5": 10.1, "ma_volume5": 1000},
        {"day": "2024-03-05", "open": "10.200", "high": "10.500", "low": "10.100", "close": "10.400", "volume": "1100"},
        {"day": "2024-03-06", "open": "10.400", "high": "10.600", "low": "10.200", "close": "10.300", "volume": "1200"},
        {"day": "2024-03-07", "open": "10.300", "high": "10.700", "low": "10.200", "close": "10.600", "volume": "1300"},
        {"day": "2024-03-08", "open": "10.600", "high": "10.900", "low": "10.500", "close": "10.800", "volume": "1400"}
    ])
}
