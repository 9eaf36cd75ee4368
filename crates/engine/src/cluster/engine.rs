//! Clusterer — online bounded clustering of log lines by template similarity.
//!
//! Lines are admitted into the *best*-matching cluster above the threshold,
//! not the first one above it; an older, wider cluster must not trap lines
//! that a tighter cluster explains better. When the collection is full, the
//! least-populated cluster is evicted before a new one opens.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::mine::Template;

/// Raw lines retained per cluster, insertion-ordered.
pub const MAX_EXAMPLES: usize = 5;

#[derive(Debug, Clone)]
pub struct Cluster {
    pub id: u64,
    pub template: Template,
    pub count: u64,
    pub examples: Vec<String>,
    pub timestamps: Vec<DateTime<Utc>>,
}

impl Cluster {
    /// Membership similarity of `line` against this cluster, without mutating it.
    pub fn similarity(&self, line: &str) -> f64 {
        self.template.merge(line).1
    }
}

/// One row of [`Clusterer::stats`].
#[derive(Debug, Clone, Serialize)]
pub struct ClusterView {
    pub id: u64,
    pub count: u64,
    pub percent: f64,
    pub template: String,
    pub examples: Vec<String>,
}

#[derive(Debug)]
pub struct Clusterer {
    threshold: f64,
    max_clusters: usize,
    next_id: u64,
    clusters: Vec<Cluster>,
}

impl Clusterer {
    pub fn new(threshold: f64, max_clusters: usize) -> Self {
        Self {
            threshold,
            max_clusters,
            next_id: 0,
            clusters: Vec::new(),
        }
    }

    /// Admit a line: refine the best-matching cluster above the threshold,
    /// or open a new one (evicting first if full). Returns the cluster id.
    pub fn add(&mut self, line: &str, timestamp: Option<DateTime<Utc>>) -> u64 {
        let mut best: Option<(usize, Template, f64)> = None;
        for (idx, cluster) in self.clusters.iter().enumerate() {
            let (merged, sim) = cluster.template.merge(line);
            if best.as_ref().map_or(true, |(_, _, s)| sim > *s) {
                best = Some((idx, merged, sim));
            }
        }

        if let Some((idx, merged, sim)) = best {
            if sim >= self.threshold {
                let cluster = &mut self.clusters[idx];
                cluster.template = merged;
                cluster.count += 1;
                if cluster.examples.len() < MAX_EXAMPLES {
                    cluster.examples.push(line.to_string());
                }
                if let Some(ts) = timestamp {
                    cluster.timestamps.push(ts);
                }
                return cluster.id;
            }
        }

        if self.clusters.len() >= self.max_clusters {
            self.evict();
        }

        let id = self.next_id;
        self.next_id += 1;
        self.clusters.push(Cluster {
            id,
            template: Template::literal(line),
            count: 1,
            examples: vec![line.to_string()],
            timestamps: timestamp.into_iter().collect(),
        });
        id
    }

    /// Remove the smallest cluster; ties go to the oldest by insertion.
    /// Ids are never reused afterwards.
    fn evict(&mut self) {
        let victim = self
            .clusters
            .iter()
            .enumerate()
            .min_by_key(|(idx, c)| (c.count, *idx))
            .map(|(idx, _)| idx);
        if let Some(idx) = victim {
            let evicted = self.clusters.remove(idx);
            tracing::debug!(id = evicted.id, count = evicted.count, "evicted cluster");
        }
    }

    pub fn get(&self, id: u64) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Total admitted lines across all live clusters.
    pub fn total_count(&self) -> u64 {
        self.clusters.iter().map(|c| c.count).sum()
    }

    /// Views sorted by count descending, percent rounded to one decimal.
    pub fn stats(&self) -> Vec<ClusterView> {
        let total = self.total_count();
        let mut views: Vec<ClusterView> = self
            .clusters
            .iter()
            .map(|c| ClusterView {
                id: c.id,
                count: c.count,
                percent: if total == 0 {
                    0.0
                } else {
                    round1(100.0 * c.count as f64 / total as f64)
                },
                template: c.template.pattern.clone(),
                examples: c.examples.clone(),
            })
            .collect();
        views.sort_by(|x, y| y.count.cmp(&x.count));
        views
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
