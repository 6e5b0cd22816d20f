//! # Ashare Core
//!
//! Multi-source daily and intraday kline retrieval for China A-share
//! securities.
//!
//! ## Overview
//!
//! - **Code normalization** from exchange-suffixed codes (`000001.XSHG`) to
//!   the prefixed form upstreams expect (`sh000001`)
//! - **Source adapters** for the Tencent day/week/month, Tencent minute and
//!   Sina kline endpoints
//! - **Row normalization** into one canonical bar shape
//! - **Routing** with a fixed primary/fallback plan per frequency
//! - **Tool entry point** [`get_price`] that never fails and reports through
//!   [`StockData`]
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Tencent and Sina kline adapters |
//! | [`clock`] | Calendar date source used by the "today" rules |
//! | [`data_source`] | Adapter trait, request types, source errors |
//! | [`domain`] | Security codes, frequencies, bars |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Raw upstream rows to canonical bars |
//! | [`routing`] | Per-frequency source plans and fallback |
//! | [`source`] | Source identifiers |
//! | [`tool`] | `get_price` tool surface |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ashare_core::{get_price, PriceArgs, SourceRouter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = SourceRouter::default();
//!     let mut args = PriceArgs::new("000001.XSHG");
//!     args.count = 5;
//!
//!     let result = get_price(&router, &args).await;
//!     println!("{}", result.message);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ get_price tool  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Source Router  │────▶│ RoutePlan        │
//! └────────┬────────┘     │ (per frequency)  │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ BarSource       │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Normalizer      │
//! │ (BarSeries)     │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Adapters and the router return structured errors:
//!
//! ```rust
//! use ashare_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::Transport => "upstream unreachable",
//!         SourceErrorKind::Parse => "upstream payload changed",
//!         SourceErrorKind::EmptyResult => "no bars",
//!         _ => "request problem",
//!     }
//! }
//! ```

pub mod adapters;
pub mod clock;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod routing;
pub mod source;
pub mod tool;

// Adapter implementations
pub use adapters::{SinaAdapter, TencentDayAdapter, TencentMinuteAdapter};

// Calendar
pub use clock::{Clock, FixedClock, SystemClock};

// Data source trait and types
pub use data_source::{BarSource, FetchRequest, QuoteRequest, SourceError, SourceErrorKind};

// Domain models
pub use domain::{Bar, BarSeries, Frequency, SecurityCode};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Routing types
pub use routing::{
    RouteFailure, RoutePlan, RouteResult, RouteSuccess, SourceAttempt, SourceRouter,
    SourceRouterBuilder,
};

// Source identifiers
pub use source::SourceId;

// Tool surface
pub use tool::{get_price, PriceArgs, StockData};
