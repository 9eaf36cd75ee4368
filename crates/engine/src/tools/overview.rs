//! Overview — file size, line count, detected format, and time range.

use serde_json::{json, Value};

use super::map;
use crate::error::ToolError;
use crate::session::{ingest, resolve_session, IngestParams};
use crate::state::EngineState;

pub async fn run(state: &EngineState, args: &Value) -> Value {
    match handle(state, args).await {
        Ok(doc) => doc,
        Err(err) => err.into_document(),
    }
}

async fn handle(state: &EngineState, args: &Value) -> Result<Value, ToolError> {
    let path = map::file_arg(args)?;
    // Nothing here depends on clustering parameters, so reuse whatever
    // session is already current for this file rather than forcing a
    // default-parameter pass that would reassign it; cluster ids handed
    // out by a prior `cluster` call must stay resolvable afterwards.
    let (key, entry) = if map::bool_arg(args, "force_refresh") {
        let params = IngestParams {
            force_refresh: true,
            ..Default::default()
        };
        ingest(state, &path, params).await?
    } else {
        resolve_session(state, &path).await?
    };

    Ok(json!({
        "file": path.display().to_string(),
        "size_bytes": key.identity.size,
        "size_human": map::human_bytes(key.identity.size),
        "total_lines": entry.total_lines,
        "timestamp_format": entry.detection.map(|d| d.kind.name()),
        "time_range": map::time_range_doc(&entry.timestamps),
    }))
}
