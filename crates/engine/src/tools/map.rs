//! Map — argument extraction, clamping, and human formatting for tools.
//!
//! Out-of-range numeric parameters are clamped into range rather than
//! rejected; the clamp is observable only through later results.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::cluster::ClusterView;
use crate::error::ToolError;

pub const DEFAULT_MAX_CLUSTERS: usize = 10;
pub const MAX_CLUSTERS_MIN: usize = 2;
pub const MAX_CLUSTERS_MAX: usize = 20;

pub const DEFAULT_THRESHOLD: f64 = 0.4;
pub const THRESHOLD_MIN: f64 = 0.1;
pub const THRESHOLD_MAX: f64 = 0.9;

pub const DEFAULT_SUBCLUSTERS: usize = 5;
pub const DEFAULT_GREP_EXAMPLES: usize = 5;
pub const DEFAULT_CONTEXT_LINES: usize = 0;
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// The mandatory `file` argument.
pub fn file_arg(args: &Value) -> Result<PathBuf, ToolError> {
    match args.get("file").and_then(Value::as_str) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(ToolError::InvalidRequest(
            "missing required parameter: file".to_string(),
        )),
    }
}

pub fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    str_arg(args, key).ok_or_else(|| {
        ToolError::InvalidRequest(format!("missing required parameter: {key}"))
    })
}

pub fn u64_arg(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

pub fn required_u64(args: &Value, key: &str) -> Result<u64, ToolError> {
    u64_arg(args, key).ok_or_else(|| {
        ToolError::InvalidRequest(format!("missing required parameter: {key}"))
    })
}

pub fn f64_arg(args: &Value, key: &str) -> Option<f64> {
    args.get(key).and_then(Value::as_f64)
}

pub fn bool_arg(args: &Value, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// `max_clusters`, defaulted and clamped into `[2, 20]`.
pub fn max_clusters_arg(args: &Value) -> usize {
    let raw = u64_arg(args, "max_clusters")
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_MAX_CLUSTERS);
    raw.clamp(MAX_CLUSTERS_MIN, MAX_CLUSTERS_MAX)
}

/// `threshold`, defaulted and clamped into `[0.1, 0.9]`.
pub fn threshold_arg(args: &Value) -> f64 {
    let raw = f64_arg(args, "threshold").unwrap_or(DEFAULT_THRESHOLD);
    raw.clamp(THRESHOLD_MIN, THRESHOLD_MAX)
}

pub fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub fn human_duration(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// `{start, end, duration}` of a timestamp series, or null when empty.
pub fn time_range_doc(timestamps: &[DateTime<Utc>]) -> Value {
    match (timestamps.iter().min(), timestamps.iter().max()) {
        (Some(start), Some(end)) => json!({
            "start": start.format("%Y-%m-%d %H:%M:%S").to_string(),
            "end": end.format("%Y-%m-%d %H:%M:%S").to_string(),
            "duration": human_duration((*end - *start).num_seconds()),
        }),
        _ => Value::Null,
    }
}

/// One cluster row, with up to `example_cap` examples.
pub fn cluster_doc(view: &ClusterView, example_cap: usize) -> Value {
    json!({
        "id": view.id,
        "count": view.count,
        "percent": format!("{:.1}%", view.percent),
        "template": &view.template,
        "examples": view.examples.iter().take(example_cap).collect::<Vec<_>>(),
    })
}
