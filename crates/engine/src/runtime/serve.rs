//! Serve — line-delimited JSON-RPC 2.0 over stdin/stdout.
//!
//! One request per line; the method is a tool name and `params` is the tool
//! argument object. Tool-level failures ride inside `result` as `{"error"}`
//! documents; only transport-level faults (bad JSON, unknown method, bad
//! params) become JSON-RPC error objects. Requests without an `id` are
//! notifications: they execute but produce no response line.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::conf::EngineConfig;
use crate::state::SharedState;
use crate::tools;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

pub async fn serve(
    state: SharedState,
    _config: EngineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    info!("Listening for requests on stdin");
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(&state, &line).await {
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            stdout.write_all(&out).await?;
            stdout.flush().await?;
        }
    }
    info!("stdin closed, shutting down");
    Ok(())
}

/// Process one request line. `None` means nothing should be written back.
pub async fn handle_line(state: &SharedState, line: &str) -> Option<Value> {
    let request: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return Some(error_response(
                Value::Null,
                PARSE_ERROR,
                &format!("Parse error: {e}"),
            ))
        }
    };

    let id = request.get("id").cloned();
    let is_notification = id.is_none();

    let method = match request.get("method").and_then(Value::as_str) {
        Some(m) => m,
        None => {
            if is_notification {
                return None;
            }
            return Some(error_response(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "Invalid request: missing method",
            ));
        }
    };

    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
    if !params.is_object() {
        if is_notification {
            return None;
        }
        return Some(error_response(
            id.unwrap_or(Value::Null),
            INVALID_PARAMS,
            "Invalid params: expected an object",
        ));
    }

    debug!(method, "handling request");
    match tools::dispatch(state, method, &params).await {
        Some(result) => {
            if is_notification {
                None
            } else {
                Some(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result,
                }))
            }
        }
        None => {
            if is_notification {
                return None;
            }
            Some(error_response(
                id.unwrap_or(Value::Null),
                METHOD_NOT_FOUND,
                &format!("Method not found: {method}"),
            ))
        }
    }
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}
