//! Fetch — raw matching lines with line numbers, paged by offset/limit.

use serde_json::{json, Value};

use super::map;
use crate::error::ToolError;
use crate::filter;
use crate::reader;
use crate::state::EngineState;

pub async fn run(state: &EngineState, args: &Value) -> Value {
    match handle(state, args).await {
        Ok(doc) => doc,
        Err(err) => err.into_document(),
    }
}

async fn handle(_state: &EngineState, args: &Value) -> Result<Value, ToolError> {
    let path = map::file_arg(args)?;
    let offset = map::u64_arg(args, "offset").unwrap_or(0) as usize;
    let limit = map::u64_arg(args, "limit")
        .map(|v| v as usize)
        .unwrap_or(map::DEFAULT_FETCH_LIMIT);

    let matcher = match map::str_arg(args, "filter") {
        Some(pattern) => Some(filter::compile(pattern)?),
        None => None,
    };

    let mut lines = reader::open_lines(&path).await?;
    let mut matched: u64 = 0;
    let mut out: Vec<Value> = Vec::new();
    let mut line_number: u64 = 0;

    // Scanning stops as soon as the window is full; `total_scanned` is the
    // number of matches observed up to and including the returned window.
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if let Some(f) = &matcher {
            if !f.is_match(&line) {
                continue;
            }
        }
        matched += 1;
        if matched as usize <= offset {
            continue;
        }
        if out.len() < limit {
            out.push(json!({ "line_number": line_number, "line": line }));
        }
        if out.len() >= limit {
            break;
        }
    }

    Ok(json!({
        "file": path.display().to_string(),
        "offset": offset,
        "limit": limit,
        "total_scanned": matched,
        "lines": out,
    }))
}
