//! Tool surface — the six analysis operations.
//!
//! Every handler takes a JSON argument object and returns a JSON document;
//! failures ride inside the document as `{"error": …}`, never across the
//! transport.

pub mod cluster;
pub mod drill;
pub mod fetch;
pub mod grep;
pub mod map;
pub mod overview;
pub mod timeline;

use serde_json::Value;

use crate::state::EngineState;

pub const TOOL_NAMES: [&str; 6] = [
    "overview",
    "cluster",
    "cluster_drill",
    "timeline",
    "grep",
    "fetch",
];

/// Run one tool by name. `None` means the name is not a tool.
pub async fn dispatch(state: &EngineState, method: &str, args: &Value) -> Option<Value> {
    let result = match method {
        "overview" => overview::run(state, args).await,
        "cluster" => cluster::run(state, args).await,
        "cluster_drill" => drill::run(state, args).await,
        "timeline" => timeline::run(state, args).await,
        "grep" => grep::run(state, args).await,
        "fetch" => fetch::run(state, args).await,
        _ => return None,
    };
    Some(result)
}
