//! Cluster — group a file's lines into templated clusters.

use serde_json::{json, Value};

use super::map;
use crate::error::ToolError;
use crate::session::{ingest, IngestParams};
use crate::state::EngineState;

/// Examples echoed per cluster in the result document.
const RESULT_EXAMPLES: usize = 3;

pub async fn run(state: &EngineState, args: &Value) -> Value {
    match handle(state, args).await {
        Ok(doc) => doc,
        Err(err) => err.into_document(),
    }
}

async fn handle(state: &EngineState, args: &Value) -> Result<Value, ToolError> {
    let path = map::file_arg(args)?;
    let params = IngestParams {
        max_clusters: map::max_clusters_arg(args),
        threshold: map::threshold_arg(args),
        filter: map::str_arg(args, "filter").map(str::to_string),
        force_refresh: map::bool_arg(args, "force_refresh"),
    };
    let (_, entry) = ingest(state, &path, params).await?;

    let clusters: Vec<Value> = entry
        .clusterer
        .stats()
        .iter()
        .map(|view| map::cluster_doc(view, RESULT_EXAMPLES))
        .collect();

    Ok(json!({
        "file": path.display().to_string(),
        "total_lines": entry.total_lines,
        "clusters": clusters,
    }))
}
