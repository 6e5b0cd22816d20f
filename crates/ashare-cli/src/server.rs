//! Line-delimited JSON-RPC 2.0 tool server.
//!
//! One request per line on the reader, one response per line on the writer.
//! Each request runs on its own task, so responses may arrive out of order
//! and a stalled upstream call holds up only its own request. Notifications
//! (requests without an `id`) get no response.
//!
//! | Method | Result |
//! |--------|--------|
//! | `initialize` | Server info and tool capability |
//! | `tools/list` | The `get_price` tool and its input schema |
//! | `tools/call` | `StockData` for `get_price` |
//!
//! Fetch failures are tool results, never JSON-RPC errors.

use std::sync::Arc;

use ashare_core::{get_price, PriceArgs, SourceRouter, StockData};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const TOOL_NAME: &str = "get_price";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Clone)]
pub struct ToolServer {
    router: Arc<SourceRouter>,
}

impl ToolServer {
    pub fn new(router: SourceRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    /// Serve until the reader reaches EOF and every in-flight request has
    /// been answered.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("tool server listening on stdio");
        let (responses, mut outbox) = mpsc::unbounded_channel::<Value>();

        let read_requests = async move {
            let mut lines = reader.lines();
            while let Some(line) = lines.next_line().await? {
                let server = self.clone();
                let responses = responses.clone();
                tokio::spawn(async move {
                    if let Some(response) = server.handle_line(&line).await {
                        // The writer only goes away on a failed write.
                        let _ = responses.send(response);
                    }
                });
            }
            info!("tool server input closed");
            Ok::<(), std::io::Error>(())
        };

        let write_responses = async {
            while let Some(response) = outbox.recv().await {
                let mut payload = response.to_string();
                payload.push('\n');
                writer.write_all(payload.as_bytes()).await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        tokio::try_join!(read_requests, write_responses)?;
        Ok(())
    }

    /// Handle one input line; `None` for blank lines and notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let raw = match serde_json::from_str::<Value>(line) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "unparseable request line");
                return Some(error_response(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("parse error: {error}")),
                ));
            }
        };

        let id_hint = raw.get("id").cloned().unwrap_or(Value::Null);
        let request = match serde_json::from_value::<RpcRequest>(raw) {
            Ok(request) => request,
            Err(error) => {
                return Some(error_response(
                    id_hint,
                    RpcError::new(INVALID_REQUEST, format!("invalid request: {error}")),
                ));
            }
        };

        debug!(method = %request.method, "rpc request");
        let outcome = self.dispatch(&request.method, request.params).await;

        let id = request.id?;
        Some(match outcome {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(error) => error_response(id, error),
        })
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "ashare",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "notifications/initialized" | "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": [tool_descriptor()] })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::new(
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        }
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcError> {
        let call = serde_json::from_value::<CallParams>(params)
            .map_err(|error| RpcError::new(INVALID_PARAMS, format!("invalid params: {error}")))?;
        if call.name != TOOL_NAME {
            return Err(RpcError::new(
                INVALID_PARAMS,
                format!("unknown tool: {}", call.name),
            ));
        }

        let args = serde_json::from_value::<PriceArgs>(call.arguments).map_err(|error| {
            RpcError::new(INVALID_PARAMS, format!("invalid arguments: {error}"))
        })?;

        let result = get_price(&self.router, &args).await;
        Ok(tool_result(&result))
    }
}

fn tool_result(result: &StockData) -> Value {
    let text = serde_json::to_string(result).unwrap_or_else(|_| result.message.clone());
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": result,
        "isError": false,
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": error })
}

fn tool_descriptor() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "获取A股行情K线数据 (Fetch A-share kline bars with Tencent/Sina fallback)",
        "inputSchema": {
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Security code, e.g. sh000001 or 000001.XSHG",
                },
                "end_date": {
                    "type": "string",
                    "description": "Inclusive end date YYYY-MM-DD; empty for latest",
                    "default": "",
                },
                "count": {
                    "type": "integer",
                    "minimum": 1,
                    "default": ashare_core::tool::DEFAULT_COUNT,
                },
                "frequency": {
                    "type": "string",
                    "enum": ["1m", "5m", "15m", "30m", "60m", "1d", "1w", "1M"],
                    "default": ashare_core::tool::DEFAULT_FREQUENCY,
                },
                "fields": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": ["open", "close", "high", "low", "volume"],
                    },
                    "default": [],
                },
            },
            "required": ["code"],
        },
    })
}
