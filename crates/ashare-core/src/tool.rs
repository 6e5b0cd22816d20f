//! Tool-level entry point.
//!
//! [`get_price`] is what a tool host calls: raw arguments in, a
//! [`StockData`] value out. It never fails; fetch and validation problems are
//! reported through `message` with an empty `data` object.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::timestamp::format_bar_timestamp;
use crate::normalize::COLUMNS;
use crate::routing::SourceRouter;
use crate::{Bar, BarSeries, QuoteRequest, ValidationError};

pub const DEFAULT_COUNT: usize = 10;
pub const DEFAULT_FREQUENCY: &str = "1d";

/// Arguments accepted by the `get_price` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceArgs {
    /// Security code, `sh000001` or `000001.XSHG`.
    pub code: String,
    /// Inclusive end date `YYYY-MM-DD`; empty means through latest.
    #[serde(default)]
    pub end_date: String,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    /// Columns to return besides `time`; empty means all.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl PriceArgs {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            end_date: String::new(),
            count: DEFAULT_COUNT,
            frequency: default_frequency(),
            fields: Vec::new(),
        }
    }
}

fn default_count() -> usize {
    DEFAULT_COUNT
}

fn default_frequency() -> String {
    DEFAULT_FREQUENCY.to_owned()
}

/// Tool result: the caller's code, a `{records, columns}` table (or `{}`), and
/// a human-readable outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    pub code: String,
    pub data: Value,
    pub message: String,
}

impl StockData {
    pub fn success(
        code: impl Into<String>,
        frequency: &str,
        records: Vec<Value>,
        columns: Vec<&str>,
    ) -> Self {
        let code = code.into();
        let message = format!("成功获取{code}的{frequency}周期数据，共{}条记录", records.len());
        Self {
            code,
            data: json!({ "records": records, "columns": columns }),
            message,
        }
    }

    pub fn failure(code: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self {
            code: code.into(),
            data: Value::Object(Map::new()),
            message: format!("获取数据失败: {detail}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.get("records").is_some()
    }
}

/// Fetch bars for `args` through `router` and shape them into a [`StockData`].
pub async fn get_price(router: &SourceRouter, args: &PriceArgs) -> StockData {
    let columns = match select_columns(&args.fields) {
        Ok(columns) => columns,
        Err(error) => return StockData::failure(&args.code, error),
    };

    let parsed = QuoteRequest::parse(&args.code, &args.end_date, args.count, &args.frequency);
    let request = match parsed {
        Ok(request) => request,
        Err(error) => return StockData::failure(&args.code, error),
    };

    match router.route(&request).await {
        Ok(route) => {
            let records = to_records(&route.data, &columns);
            StockData::success(&args.code, request.frequency.as_str(), records, columns)
        }
        Err(failure) => match failure.final_error() {
            Some(error) => StockData::failure(&args.code, error),
            None => StockData::failure(&args.code, "no source attempted"),
        },
    }
}

/// `time` plus the requested columns, in canonical order.
fn select_columns(fields: &[String]) -> Result<Vec<&'static str>, ValidationError> {
    if fields.is_empty() {
        return Ok(COLUMNS.to_vec());
    }

    for field in fields {
        let known = COLUMNS[1..].iter().any(|column| *column == field.trim());
        if !known {
            return Err(ValidationError::UnknownField {
                value: field.clone(),
            });
        }
    }

    Ok(COLUMNS
        .into_iter()
        .filter(|column| *column == "time" || fields.iter().any(|field| field.trim() == *column))
        .collect())
}

fn to_records(series: &BarSeries, columns: &[&str]) -> Vec<Value> {
    series
        .bars()
        .iter()
        .map(|bar| {
            let record = columns
                .iter()
                .map(|column| ((*column).to_owned(), cell(bar, column)))
                .collect::<Map<String, Value>>();
            Value::Object(record)
        })
        .collect()
}

fn cell(bar: &Bar, column: &str) -> Value {
    match column {
        "time" => Value::String(format_bar_timestamp(bar.timestamp)),
        "open" => json!(bar.open),
        "close" => json!(bar.close),
        "high" => json!(bar.high),
        "low" => json!(bar.low),
        _ => json!(bar.volume),
    }
}
