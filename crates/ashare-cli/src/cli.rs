//! CLI argument definitions for `ashare`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `price` | Fetch klines for one security |
//! | `sources` | Show the per-frequency routing table |
//! | `serve` | Run the `get_price` tool server on stdio |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `ASHARE_HTTP_TIMEOUT_MS` or `10000` | Per-request upstream timeout |
//!
//! # Examples
//!
//! ```bash
//! ashare price 000001.XSHG --count 5 --pretty
//! ashare price sh600519 --frequency 15m --fields close,volume
//! ashare serve --stdio
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// A-share kline fetcher backed by Tencent and Sina quote endpoints.
#[derive(Debug, Parser)]
#[command(
    name = "ashare",
    author,
    version,
    about = "A-share kline fetcher with Tencent/Sina fallback"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Upstream request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Plain-text table for terminal display.
    Table,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch klines for a security.
    ///
    /// # Examples
    ///
    ///   ashare price 000001.XSHG
    ///   ashare price sh000001 --end-date 2024-01-05 --count 3
    ///   ashare price sz000001 --frequency 5m --count 48
    Price(PriceArgs),

    /// Show which sources serve each frequency.
    Sources,

    /// Run the JSON-RPC tool server.
    Serve(ServeArgs),
}

/// Arguments for the `price` command.
#[derive(Debug, Args)]
pub struct PriceArgs {
    /// Security code, prefixed (`sh000001`) or suffixed (`000001.XSHG`).
    pub code: String,

    /// Inclusive end date (YYYY-MM-DD); empty means through the latest bar.
    #[arg(long, default_value = "")]
    pub end_date: String,

    /// Number of bars to return.
    #[arg(long, default_value_t = ashare_core::tool::DEFAULT_COUNT)]
    pub count: usize,

    /// Bar frequency: 1m, 5m, 15m, 30m, 60m, 1d, 1w, 1M.
    #[arg(long, default_value = ashare_core::tool::DEFAULT_FREQUENCY)]
    pub frequency: String,

    /// Columns to return besides time (open, close, high, low, volume).
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

/// Arguments for the `serve` command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Serve over stdin/stdout. This is the only transport.
    #[arg(long, default_value_t = true)]
    pub stdio: bool,
}
