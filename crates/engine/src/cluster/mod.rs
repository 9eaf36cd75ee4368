//! Online clustering: the bounded clusterer and the drill-down protocol.

pub mod drill;
pub mod engine;

pub use drill::{DrillDown, MEMBERSHIP_FLOOR, SUB_THRESHOLD};
pub use engine::{Cluster, ClusterView, Clusterer, MAX_EXAMPLES};
