//! Session cache — memoized ingest results for the life of the process.
//!
//! Keyed by file identity plus the clustering parameters; never invalidated
//! automatically. A `force_refresh` admission on the ingest side overwrites
//! the entry. The cache also remembers the most recent key per file so a
//! follow-up `cluster_drill` or `timeline` can resolve cluster ids against
//! the ingest that issued them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::cluster::Clusterer;
use crate::reader::FileIdentity;
use crate::temporal::Detection;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub identity: FileIdentity,
    pub max_clusters: usize,
    /// Threshold in thousandths, so the key stays hashable.
    threshold_permille: u32,
    pub filter: Option<String>,
}

impl SessionKey {
    pub fn new(
        identity: FileIdentity,
        max_clusters: usize,
        threshold: f64,
        filter: Option<String>,
    ) -> Self {
        Self {
            identity,
            max_clusters,
            threshold_permille: (threshold * 1000.0).round() as u32,
            filter,
        }
    }

    pub fn threshold(&self) -> f64 {
        f64::from(self.threshold_permille) / 1000.0
    }
}

/// Everything one completed ingest pass produced.
#[derive(Debug)]
pub struct SessionEntry {
    pub total_lines: u64,
    pub clusterer: Clusterer,
    /// File-wide series, one instant per admitted line that carried one.
    pub timestamps: Vec<DateTime<Utc>>,
    pub detection: Option<Detection>,
}

#[derive(Debug, Default)]
pub struct SessionCache {
    entries: DashMap<SessionKey, Arc<SessionEntry>>,
    recent: DashMap<PathBuf, SessionKey>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SessionKey) -> Option<Arc<SessionEntry>> {
        self.entries.get(key).map(|e| Arc::clone(&e))
    }

    pub fn insert(&self, key: SessionKey, entry: Arc<SessionEntry>) {
        self.recent
            .insert(key.identity.path.clone(), key.clone());
        self.entries.insert(key, entry);
    }

    /// The entry of the most recent completed ingest for `path`, if any.
    pub fn recent_for(&self, path: &Path) -> Option<(SessionKey, Arc<SessionEntry>)> {
        let key = self.recent.get(path).map(|k| k.clone())?;
        let entry = self.entries.get(&key).map(|e| Arc::clone(&e))?;
        Some((key, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.recent.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(path: &str) -> FileIdentity {
        FileIdentity {
            path: PathBuf::from(path),
            size: 100,
            modified_millis: 1,
        }
    }

    fn entry() -> Arc<SessionEntry> {
        Arc::new(SessionEntry {
            total_lines: 10,
            clusterer: Clusterer::new(0.4, 10),
            timestamps: Vec::new(),
            detection: None,
        })
    }

    #[test]
    fn test_roundtrip_by_key() {
        let cache = SessionCache::new();
        let key = SessionKey::new(identity("/var/log/a.log"), 10, 0.4, None);
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), entry());
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_parameters_distinct_entries() {
        let cache = SessionCache::new();
        let a = SessionKey::new(identity("/var/log/a.log"), 10, 0.4, None);
        let b = SessionKey::new(identity("/var/log/a.log"), 10, 0.5, None);
        let c = SessionKey::new(identity("/var/log/a.log"), 10, 0.4, Some("ERROR".into()));
        cache.insert(a.clone(), entry());
        cache.insert(b.clone(), entry());
        cache.insert(c.clone(), entry());
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_some());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_threshold_round_trips_through_key() {
        let key = SessionKey::new(identity("/x"), 10, 0.4, None);
        assert!((key.threshold() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_recent_tracks_latest_ingest() {
        let cache = SessionCache::new();
        let first = SessionKey::new(identity("/var/log/a.log"), 10, 0.4, None);
        let second = SessionKey::new(identity("/var/log/a.log"), 5, 0.6, None);
        cache.insert(first, entry());
        cache.insert(second.clone(), entry());
        let (key, _) = cache.recent_for(Path::new("/var/log/a.log")).unwrap();
        assert_eq!(key, second);
    }

    #[test]
    fn test_recent_for_unknown_path() {
        let cache = SessionCache::new();
        assert!(cache.recent_for(Path::new("/nope")).is_none());
    }
}
