//! Ingest — the single full pass that feeds the clusterer.
//!
//! The first lines are buffered for timestamp-format detection, then every
//! line streams through filter → timestamp extraction → cluster admission.
//! The cache is written only after the pass runs to completion, so an
//! interrupted or failed pass can never leave a partial entry behind.

use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, Utc};

use crate::cluster::Clusterer;
use crate::error::ToolError;
use crate::filter;
use crate::reader;
use crate::session::cache::{SessionEntry, SessionKey};
use crate::state::EngineState;
use crate::temporal::detect_format;

#[derive(Debug, Clone)]
pub struct IngestParams {
    pub max_clusters: usize,
    pub threshold: f64,
    pub filter: Option<String>,
    pub force_refresh: bool,
}

impl Default for IngestParams {
    fn default() -> Self {
        Self {
            max_clusters: 10,
            threshold: 0.4,
            filter: None,
            force_refresh: false,
        }
    }
}

/// Run (or reuse) a full ingest of `path` under `params`.
pub async fn ingest(
    state: &EngineState,
    path: &Path,
    params: IngestParams,
) -> Result<(SessionKey, Arc<SessionEntry>), ToolError> {
    let identity = reader::identify(path).await?;
    let key = SessionKey::new(
        identity,
        params.max_clusters,
        params.threshold,
        params.filter.clone(),
    );

    if !params.force_refresh {
        if let Some(entry) = state.sessions.get(&key) {
            tracing::debug!(path = %path.display(), "session cache hit");
            return Ok((key, entry));
        }
    }

    // Compile the filter up front so a bad pattern costs no file scan.
    let line_filter = match &params.filter {
        Some(pattern) => Some(filter::compile(pattern)?),
        None => None,
    };

    let mut lines = reader::open_lines(path).await?;

    // Buffer the detection sample, then replay it through the same pipeline.
    let mut buffered: Vec<String> = Vec::with_capacity(state.config.sample_lines);
    while buffered.len() < state.config.sample_lines {
        match lines.next_line().await? {
            Some(line) => buffered.push(line),
            None => break,
        }
    }
    let detection = detect_format(&buffered, Utc::now().year());

    let mut clusterer = Clusterer::new(key.threshold(), params.max_clusters);
    let mut timestamps = Vec::new();
    let mut total_lines: u64 = 0;

    let mut admit = |line: String| {
        total_lines += 1;
        if line.is_empty() {
            return;
        }
        if let Some(f) = &line_filter {
            if !f.is_match(&line) {
                return;
            }
        }
        let ts = detection.and_then(|d| d.kind.extract(&line, d.base_year));
        if let Some(ts) = ts {
            timestamps.push(ts);
        }
        clusterer.add(&line, ts);
    };

    for line in buffered {
        admit(line);
    }
    while let Some(line) = lines.next_line().await? {
        admit(line);
    }
    drop(admit);

    tracing::debug!(
        path = %path.display(),
        total_lines,
        clusters = clusterer.len(),
        format = detection.map(|d| d.kind.name()).unwrap_or("none"),
        "ingest complete"
    );

    let entry = Arc::new(SessionEntry {
        total_lines,
        clusterer,
        timestamps,
        detection,
    });
    state.sessions.insert(key.clone(), Arc::clone(&entry));
    Ok((key, entry))
}

/// The session a `cluster_drill` or `timeline` call should resolve ids
/// against: the most recent ingest of this file, or a fresh default one.
pub async fn resolve_session(
    state: &EngineState,
    path: &Path,
) -> Result<(SessionKey, Arc<SessionEntry>), ToolError> {
    if let Some(hit) = state.sessions.recent_for(path) {
        return Ok(hit);
    }
    ingest(state, path, IngestParams::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::EngineConfig;
    use std::path::PathBuf;

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn state() -> EngineState {
        EngineState::new(EngineConfig::default())
    }

    #[tokio::test]
    async fn test_ingest_clusters_and_counts() {
        let path = fixture(
            "loglens_ingest_basic.log",
            "User john logged in from 192.168.1.1\n\
             User admin logged in from 10.0.0.5\n\
             cache warmed in 30s\n",
        );
        let state = state();
        let (_, entry) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        assert_eq!(entry.total_lines, 3);
        assert_eq!(entry.clusterer.len(), 2);
        assert_eq!(entry.clusterer.total_count(), 3);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_ingest_is_memoized() {
        let path = fixture("loglens_ingest_memo.log", "one line only\n");
        let state = state();
        let (_, first) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        let (_, second) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second), "second call must hit the cache");
        assert_eq!(state.sessions.len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_force_refresh_overwrites() {
        let path = fixture("loglens_ingest_force.log", "one line only\n");
        let state = state();
        let (_, first) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        let params = IngestParams {
            force_refresh: true,
            ..Default::default()
        };
        let (_, second) = ingest(&state, &path, params).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second), "refresh must rebuild the entry");
        assert_eq!(state.sessions.len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_filter_restricts_admission() {
        let path = fixture(
            "loglens_ingest_filter.log",
            "ERROR disk full on sda\nINFO all fine\nERROR disk full on sdb\n",
        );
        let state = state();
        let params = IngestParams {
            filter: Some("ERROR".into()),
            ..Default::default()
        };
        let (_, entry) = ingest(&state, &path, params).await.unwrap();
        assert_eq!(entry.total_lines, 3, "every line is still counted");
        assert_eq!(entry.clusterer.total_count(), 2, "only matches are admitted");
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_bad_filter_writes_nothing() {
        let path = fixture("loglens_ingest_badfilter.log", "a line\n");
        let state = state();
        let params = IngestParams {
            filter: Some("/[abc/".into()),
            ..Default::default()
        };
        let err = ingest(&state, &path, params).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidPattern(_)));
        assert!(state.sessions.is_empty(), "failed pass must not touch the cache");
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_empty_file() {
        let path = fixture("loglens_ingest_empty.log", "");
        let state = state();
        let (_, entry) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        assert_eq!(entry.total_lines, 0);
        assert!(entry.clusterer.is_empty());
        assert!(entry.timestamps.is_empty());
        assert!(entry.detection.is_none());
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_empty_lines_are_counted_not_admitted() {
        let path = fixture("loglens_ingest_blank.log", "real line\n\n\nreal line\n");
        let state = state();
        let (_, entry) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        assert_eq!(entry.total_lines, 4);
        assert_eq!(entry.clusterer.total_count(), 2);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_timestamps_collected_when_detected() {
        let path = fixture(
            "loglens_ingest_ts.log",
            "2024-03-01T10:00:00Z alpha start\n\
             2024-03-01T10:00:30Z beta start\n\
             2024-03-01T10:01:00Z gamma start\n",
        );
        let state = state();
        let (_, entry) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        let detection = entry.detection.unwrap();
        assert_eq!(detection.kind.name(), "iso8601");
        assert_eq!(entry.timestamps.len(), 3);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_deterministic_re_ingest() {
        let mut body = String::new();
        for i in 0..50 {
            body.push_str(&format!("job {} finished in {}ms\n", i, i * 3));
            if i % 5 == 0 {
                body.push_str("ERROR queue overflow detected\n");
            }
        }
        let path = fixture("loglens_ingest_det.log", &body);
        let state = state();
        let (_, first) = ingest(&state, &path, IngestParams::default()).await.unwrap();
        let params = IngestParams {
            force_refresh: true,
            ..Default::default()
        };
        let (_, second) = ingest(&state, &path, params).await.unwrap();

        let a: Vec<_> = first
            .clusterer
            .clusters()
            .iter()
            .map(|c| (c.id, c.count, c.template.pattern.clone()))
            .collect();
        let b: Vec<_> = second
            .clusterer
            .clusters()
            .iter()
            .map(|c| (c.id, c.count, c.template.pattern.clone()))
            .collect();
        assert_eq!(a, b, "identical parameters must reproduce identical clusters");
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_resolve_session_prefers_recent() {
        let path = fixture("loglens_ingest_recent.log", "some line here\n");
        let state = state();
        let custom = IngestParams {
            max_clusters: 5,
            threshold: 0.6,
            ..Default::default()
        };
        ingest(&state, &path, custom).await.unwrap();
        let (key, _) = resolve_session(&state, &path).await.unwrap();
        assert_eq!(key.max_clusters, 5);
        assert!((key.threshold() - 0.6).abs() < 1e-9);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let state = state();
        let err = ingest(&state, Path::new("/no/such/file.log"), IngestParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::FileNotFound(_)));
    }
}
