//! Cluster drill — sub-cluster one parent cluster by re-scanning the file.

use serde_json::{json, Value};

use super::map;
use crate::cluster::DrillDown;
use crate::error::ToolError;
use crate::filter;
use crate::reader;
use crate::session::resolve_session;
use crate::state::EngineState;

const RESULT_EXAMPLES: usize = 3;

pub async fn run(state: &EngineState, args: &Value) -> Value {
    match handle(state, args).await {
        Ok(doc) => doc,
        Err(err) => err.into_document(),
    }
}

async fn handle(state: &EngineState, args: &Value) -> Result<Value, ToolError> {
    let path = map::file_arg(args)?;
    let cluster_id = map::required_u64(args, "cluster_id")?;
    let max_subclusters = map::u64_arg(args, "max_subclusters")
        .map(|v| (v as usize).max(1))
        .unwrap_or(map::DEFAULT_SUBCLUSTERS);

    let (key, entry) = resolve_session(state, &path).await?;
    let parent = entry
        .clusterer
        .get(cluster_id)
        .ok_or(ToolError::UnknownCluster(cluster_id))?;

    // The re-scan sees the file through the same filter the parent ingest used.
    let line_filter = match &key.filter {
        Some(pattern) => Some(filter::compile(pattern)?),
        None => None,
    };

    let mut drill = DrillDown::new(parent, max_subclusters);
    let mut lines = reader::open_lines(&path).await?;
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }
        if let Some(f) = &line_filter {
            if !f.is_match(&line) {
                continue;
            }
        }
        let ts = entry
            .detection
            .and_then(|d| d.kind.extract(&line, d.base_year));
        drill.offer(&line, ts);
    }

    let sub = drill.into_clusterer();
    let subclusters: Vec<Value> = sub
        .stats()
        .iter()
        .map(|view| map::cluster_doc(view, RESULT_EXAMPLES))
        .collect();

    Ok(json!({
        "file": path.display().to_string(),
        "parent": {
            "id": parent.id,
            "template": &parent.template.pattern,
            "count": parent.count,
        },
        "subclusters": subclusters,
    }))
}
