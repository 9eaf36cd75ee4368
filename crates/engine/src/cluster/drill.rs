//! Drill — second-pass sub-clustering within one parent cluster.
//!
//! The caller re-streams the source and offers every line; a line enters the
//! sub-clusterer only if it membership-matches the parent template. The
//! membership floor and the sub-threshold are part of the external contract.

use chrono::{DateTime, Utc};

use super::engine::{Cluster, Clusterer};
use crate::mine::Template;

/// Minimum similarity against the parent for a line to count as a member.
pub const MEMBERSHIP_FLOOR: f64 = 0.4;

/// Threshold of the fresh sub-clusterer; tighter than the usual default so
/// sub-populations inside one parent actually separate.
pub const SUB_THRESHOLD: f64 = 0.5;

pub struct DrillDown {
    parent: Template,
    sub: Clusterer,
}

impl DrillDown {
    pub fn new(parent: &Cluster, max_subclusters: usize) -> Self {
        Self {
            parent: parent.template.clone(),
            sub: Clusterer::new(SUB_THRESHOLD, max_subclusters),
        }
    }

    /// Offer one line from the re-scan. Returns whether it was a member.
    pub fn offer(&mut self, line: &str, timestamp: Option<DateTime<Utc>>) -> bool {
        let (_, similarity) = self.parent.merge(line);
        if similarity < MEMBERSHIP_FLOOR {
            return false;
        }
        self.sub.add(line, timestamp);
        true
    }

    pub fn into_clusterer(self) -> Clusterer {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_of(lines: &[&str]) -> Cluster {
        let mut cl = Clusterer::new(0.4, 10);
        let mut id = 0;
        for line in lines {
            id = cl.add(line, None);
        }
        cl.get(id).unwrap().clone()
    }

    #[test]
    fn test_members_pass_the_floor() {
        let parent = parent_of(&[
            "ERROR upstream request failed: timeout while talking to billing backend",
            "ERROR upstream request failed: connection refused by payments gateway node",
        ]);
        let mut drill = DrillDown::new(&parent, 5);
        assert!(drill.offer(
            "ERROR upstream request failed: unexpected stream reset during checkout",
            None
        ));
        assert!(!drill.offer("INFO request completed in 12ms", None));
        assert_eq!(drill.into_clusterer().total_count(), 1);
    }

    #[test]
    fn test_subclusters_separate_populations() {
        let parent = parent_of(&[
            "ERROR upstream request failed: timeout while talking to billing backend",
            "ERROR upstream request failed: connection refused by payments gateway node",
            "ERROR upstream request failed: unexpected stream reset during checkout",
        ]);
        let mut drill = DrillDown::new(&parent, 3);
        for _ in 0..4 {
            drill.offer(
                "ERROR upstream request failed: timeout while talking to billing backend",
                None,
            );
            drill.offer(
                "ERROR upstream request failed: connection refused by payments gateway node",
                None,
            );
            drill.offer(
                "ERROR upstream request failed: unexpected stream reset during checkout",
                None,
            );
        }
        let sub = drill.into_clusterer();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.total_count(), 12);
    }

    #[test]
    fn test_offer_does_not_mutate_parent() {
        let parent = parent_of(&["gc pause 12ms survivors 8", "gc pause 9ms survivors 3"]);
        let before = parent.template.pattern.clone();
        let mut drill = DrillDown::new(&parent, 5);
        drill.offer("gc pause 44ms survivors 1", None);
        assert_eq!(parent.template.pattern, before);
    }
}
