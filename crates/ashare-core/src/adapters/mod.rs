mod sina;
mod tencent_day;
mod tencent_minute;

pub use sina::{SinaAdapter, DEFAULT_SINA_URL};
pub use tencent_day::{TencentDayAdapter, DEFAULT_TENCENT_DAY_URL};
pub use tencent_minute::{TencentMinuteAdapter, DEFAULT_TENCENT_MINUTE_URL};

use serde_json::Value;
use tracing::debug;

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::SourceId;

/// Issue the single upstream read for an adapter call and return the body.
async fn fetch_body(
    http_client: &dyn HttpClient,
    source: SourceId,
    url: String,
    timeout_ms: u64,
) -> Result<String, SourceError> {
    debug!(source = %source, url = %url, "requesting klines");

    let request = HttpRequest::get(url).with_timeout_ms(timeout_ms);
    let response = http_client.execute(request).await.map_err(|error| {
        SourceError::transport(format!("{source} transport error: {}", error.message()))
    })?;

    if !response.is_success() {
        return Err(SourceError::transport(format!(
            "{source} upstream returned status {}",
            response.status
        )));
    }

    Ok(response.body)
}

fn parse_json(source: SourceId, body: &str) -> Result<Value, SourceError> {
    serde_json::from_str(body)
        .map_err(|error| SourceError::parse(format!("failed to parse {source} response: {error}")))
}

/// Walk `keys` into nested JSON objects, naming the missing path on failure.
fn lookup<'a>(source: SourceId, root: &'a Value, keys: &[&str]) -> Result<&'a Value, SourceError> {
    let mut current = root;
    for (depth, key) in keys.iter().enumerate() {
        current = current.get(*key).ok_or_else(|| {
            SourceError::parse(format!(
                "{source} response is missing key '{}'",
                keys[..=depth].join(".")
            ))
        })?;
    }
    Ok(current)
}
