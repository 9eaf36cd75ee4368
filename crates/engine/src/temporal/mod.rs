//! Temporal subsystem: timestamp format induction and histogramming.

pub mod histogram;
pub mod recognize;

pub use histogram::{
    anomalies, build, calculate_bucket_size, render_ascii, Anomaly, Bucket, Histogram,
};
pub use recognize::{detect_format, Detection, TimestampKind, CATALOGUE, DETECTION_SAMPLE};
