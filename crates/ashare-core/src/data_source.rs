//! Source adapter contract and request/error types.
//!
//! Every upstream kline endpoint is wrapped in a [`BarSource`]. The router
//! hands each adapter a [`FetchRequest`] whose code has already been through
//! [`SecurityCode::normalize`], and gets back an explicit
//! `Result<BarSeries, SourceError>`.
//!
//! # Error kinds
//!
//! | Kind | Origin |
//! |------|--------|
//! | [`SourceErrorKind::Transport`] | DNS/connect/timeout or non-2xx status |
//! | [`SourceErrorKind::Parse`] | Malformed body or missing expected key |
//! | [`SourceErrorKind::EmptyResult`] | Well-formed body with no usable bars |
//! | [`SourceErrorKind::InvalidRequest`] | Frequency the adapter cannot serve |
//! | [`SourceErrorKind::AdapterNotRegistered`] | Router has no adapter for a planned source |
//!
//! The router treats all kinds identically: any of them triggers fallback.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use time::Date;

use crate::domain::timestamp::parse_end_date;
use crate::http_client::HttpError;
use crate::{BarSeries, Frequency, SecurityCode, SourceId, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Transport,
    Parse,
    EmptyResult,
    InvalidRequest,
    AdapterNotRegistered,
}

/// Structured adapter failure consumed by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            message: message.into(),
        }
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::EmptyResult,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn adapter_not_registered(source: SourceId) -> Self {
        Self {
            kind: SourceErrorKind::AdapterNotRegistered,
            message: format!("source adapter '{source}' is not registered"),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Parse => "source.parse",
            SourceErrorKind::EmptyResult => "source.empty_result",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::AdapterNotRegistered => "source.adapter_not_registered",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<HttpError> for SourceError {
    fn from(error: HttpError) -> Self {
        Self::transport(error.message())
    }
}

/// Adapter-independent kline request as received from callers.
///
/// `code` is kept verbatim so results can echo it back unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub code: String,
    pub end_date: Option<Date>,
    pub count: usize,
    pub frequency: Frequency,
}

impl QuoteRequest {
    pub fn new(
        code: impl Into<String>,
        end_date: Option<Date>,
        count: usize,
        frequency: Frequency,
    ) -> Result<Self, ValidationError> {
        if count == 0 {
            return Err(ValidationError::ZeroCount);
        }
        Ok(Self {
            code: code.into(),
            end_date,
            count,
            frequency,
        })
    }

    /// Build a request from raw tool arguments (`end_date` may be empty).
    pub fn parse(
        code: impl Into<String>,
        end_date: &str,
        count: usize,
        frequency: &str,
    ) -> Result<Self, ValidationError> {
        let frequency = frequency.parse::<Frequency>()?;
        let end_date = parse_end_date(end_date)?;
        Self::new(code, end_date, count, frequency)
    }
}

/// Request handed to adapters, carrying the provider-form code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub code: SecurityCode,
    pub end_date: Option<Date>,
    pub count: usize,
    pub frequency: Frequency,
}

impl From<&QuoteRequest> for FetchRequest {
    fn from(req: &QuoteRequest) -> Self {
        Self {
            code: SecurityCode::normalize(&req.code),
            end_date: req.end_date,
            count: req.count,
            frequency: req.frequency,
        }
    }
}

/// Source adapter contract.
///
/// Implementations issue exactly one upstream read per [`fetch`](BarSource::fetch)
/// and must be `Send + Sync`; the router shares them across concurrent requests.
pub trait BarSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Whether this source can serve bars of the given frequency.
    fn supports(&self, frequency: Frequency) -> bool;

    /// Fetch and normalize bars.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure, an unparseable or
    /// unexpected body, or a response without bars.
    fn fetch<'a>(
        &'a self,
        req: FetchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>>;
}
