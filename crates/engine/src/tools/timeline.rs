//! Timeline — bucketed histogram with anomaly marking and ASCII bars.

use serde_json::{json, Value};

use super::map;
use crate::error::ToolError;
use crate::session::resolve_session;
use crate::state::EngineState;
use crate::temporal;

pub async fn run(state: &EngineState, args: &Value) -> Value {
    match handle(state, args).await {
        Ok(doc) => doc,
        Err(err) => err.into_document(),
    }
}

async fn handle(state: &EngineState, args: &Value) -> Result<Value, ToolError> {
    let path = map::file_arg(args)?;
    let (_, entry) = resolve_session(state, &path).await?;
    entry.detection.ok_or(ToolError::NoTimestamp)?;

    let series = match map::u64_arg(args, "cluster_id") {
        Some(id) => {
            let cluster = entry
                .clusterer
                .get(id)
                .ok_or(ToolError::UnknownCluster(id))?;
            &cluster.timestamps
        }
        None => &entry.timestamps,
    };
    let (min, max) = match (series.iter().min(), series.iter().max()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => return Err(ToolError::NoTimestamp),
    };
    let bucket_size = match map::str_arg(args, "bucket_size").unwrap_or("auto") {
        "minute" => 60,
        "hour" => 3_600,
        "day" => 86_400,
        _ => temporal::calculate_bucket_size(min, max, state.config.target_buckets),
    };

    let hist = temporal::build(series, bucket_size).ok_or(ToolError::NoTimestamp)?;
    let anomalies = temporal::anomalies(&hist);

    let buckets: Vec<Value> = hist
        .buckets
        .iter()
        .map(|b| {
            json!({
                "start": b.start.format("%Y-%m-%d %H:%M:%S").to_string(),
                "end": b.end.format("%Y-%m-%d %H:%M:%S").to_string(),
                "count": b.count,
            })
        })
        .collect();

    let anomaly_docs: Vec<Value> = anomalies
        .iter()
        .map(|a| {
            json!({
                "bucket_start": a.bucket_start.format("%Y-%m-%d %H:%M:%S").to_string(),
                "count": a.count,
                "deviation": a.label(),
            })
        })
        .collect();

    Ok(json!({
        "file": path.display().to_string(),
        "bucket_size_seconds": hist.bucket_size,
        "buckets": buckets,
        "visualization": temporal::render_ascii(&hist, state.config.bar_width),
        "anomalies": anomaly_docs,
        "time_range": map::time_range_doc(series),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::EngineConfig;
    use crate::session::{ingest, IngestParams};
    use std::path::PathBuf;

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn state() -> EngineState {
        EngineState::new(EngineConfig::default())
    }

    /// Two hours of minute logs; ERROR spikes 10× during minutes 60–74.
    /// ERROR lines sit at second :30 so the two populations never share an
    /// identical timestamp prefix.
    fn spiky_body() -> String {
        let mut body = String::new();
        for minute in 0..120 {
            let hh = 10 + minute / 60;
            let mm = minute % 60;
            for k in 0..5 {
                body.push_str(&format!(
                    "2024-03-01T{hh:02}:{mm:02}:00Z INFO steady traffic item {k}\n"
                ));
            }
            let errors = if (60..75).contains(&minute) { 10 } else { 1 };
            for _ in 0..errors {
                body.push_str(&format!(
                    "2024-03-01T{hh:02}:{mm:02}:30Z ERROR payment declined by issuer\n"
                ));
            }
        }
        body
    }

    #[tokio::test]
    async fn test_timeline_whole_file() {
        let path = fixture(
            "loglens_tool_timeline_basic.log",
            "2024-03-01T10:00:00Z tick one\n\
             2024-03-01T10:20:00Z tick two\n\
             2024-03-01T11:00:00Z tick three\n",
        );
        let state = state();
        let doc = run(&state, &json!({"file": path.to_str().unwrap()})).await;

        // One-hour span: automatic sizing lands on 1-minute buckets.
        assert_eq!(doc["bucket_size_seconds"], 60);
        let buckets = doc["buckets"].as_array().unwrap();
        let total: u64 = buckets.iter().map(|b| b["count"].as_u64().unwrap()).sum();
        assert_eq!(total, 3);
        assert_eq!(doc["time_range"]["duration"], "1h 0m 0s");
        assert!(doc["visualization"].as_str().unwrap().contains('█'));
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_timeline_bucket_override() {
        let path = fixture(
            "loglens_tool_timeline_hour.log",
            "2024-03-01T10:00:00Z a\n2024-03-01T13:30:00Z b\n",
        );
        let state = state();
        let doc = run(
            &state,
            &json!({"file": path.to_str().unwrap(), "bucket_size": "hour"}),
        )
        .await;
        assert_eq!(doc["bucket_size_seconds"], 3_600);
        assert_eq!(doc["buckets"].as_array().unwrap().len(), 4);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_timeline_error_cluster_spike() {
        let path = fixture("loglens_tool_timeline_spike.log", &spiky_body());
        let state = state();
        let (_, entry) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        let error_id = entry
            .clusterer
            .clusters()
            .iter()
            .find(|c| c.template.pattern.contains("ERROR payment declined"))
            .map(|c| c.id)
            .expect("ERROR cluster exists");

        let doc = run(
            &state,
            &json!({
                "file": path.to_str().unwrap(),
                "cluster_id": error_id,
                "bucket_size": "minute",
            }),
        )
        .await;

        let anomalies = doc["anomalies"].as_array().unwrap();
        assert!(!anomalies.is_empty(), "the spike must be flagged");
        for anomaly in anomalies {
            let start = anomaly["bucket_start"].as_str().unwrap();
            // Minutes 60–74 are 11:00 through 11:14.
            assert!(start.starts_with("2024-03-01 11:0") || start.starts_with("2024-03-01 11:1"));
            assert!(anomaly["deviation"].as_str().unwrap().ends_with('σ'));
        }
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_timeline_no_format_detected() {
        let path = fixture(
            "loglens_tool_timeline_none.log",
            "no stamps\nstill none\nnothing\n",
        );
        let state = state();
        let doc = run(&state, &json!({"file": path.to_str().unwrap()})).await;
        assert_eq!(doc["error"], "No timestamp format detected in this file");
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_timeline_unknown_cluster() {
        let path = fixture(
            "loglens_tool_timeline_unknown.log",
            "2024-03-01T10:00:00Z tick\n2024-03-01T10:00:01Z tock\n",
        );
        let state = state();
        let doc = run(
            &state,
            &json!({"file": path.to_str().unwrap(), "cluster_id": 404}),
        )
        .await;
        assert_eq!(doc["error"], "Unknown cluster id: 404");
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_timeline_bucket_coverage_invariant() {
        let path = fixture("loglens_tool_timeline_cover.log", &spiky_body());
        let state = state();
        let doc = run(
            &state,
            &json!({"file": path.to_str().unwrap(), "bucket_size": "minute"}),
        )
        .await;
        let buckets = doc["buckets"].as_array().unwrap();
        let total: u64 = buckets.iter().map(|b| b["count"].as_u64().unwrap()).sum();
        // 120 minutes × 5 INFO + 105 × 1 + 15 × 10 ERROR lines.
        assert_eq!(total, 600 + 105 + 150);
        std::fs::remove_file(&path).ok();
    }
}
