//! Histogram — adaptive time bucketing, anomaly marking, ASCII rendering.
//!
//! Bucket sizes come from a fixed canonical ladder so axes stay readable;
//! the first bucket is aligned to a multiple of the size, and anomalies are
//! buckets more than two population standard deviations above the mean.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Canonical bucket durations, ascending, in seconds:
/// 1 s, 1 min, 5 min, 15 min, 1 h, 6 h, 1 d, 1 w, 30 d.
pub const CANONICAL_SIZES: [i64; 9] = [
    1,
    60,
    300,
    900,
    3_600,
    21_600,
    86_400,
    604_800,
    2_592_000,
];

/// Buckets above this many σ over the mean are reported as anomalies.
pub const ANOMALY_SIGMA: f64 = 2.0;

#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct Histogram {
    /// Seconds per bucket; constant across the histogram.
    pub bucket_size: i64,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    pub bucket_start: DateTime<Utc>,
    pub count: u64,
    /// `(count − μ) / σ`, rounded to one decimal.
    pub deviation: f64,
}

impl Anomaly {
    pub fn label(&self) -> String {
        format!("{:.1}σ", self.deviation)
    }
}

/// The largest canonical size whose duration fits `target` times into the
/// span. Never zero: sub-second spans fall back to one second.
pub fn calculate_bucket_size(min: DateTime<Utc>, max: DateTime<Utc>, target: u32) -> i64 {
    let span = (max - min).num_seconds();
    if span < 1 {
        return 1;
    }
    let limit = span / i64::from(target.max(1));
    CANONICAL_SIZES
        .iter()
        .rev()
        .find(|&&size| size <= limit)
        .copied()
        .unwrap_or(1)
}

/// Bucket the series. The first bucket starts at the floor of the earliest
/// instant to a multiple of `bucket_size`; buckets run contiguously until
/// the last one contains the latest instant. Returns `None` on an empty
/// series.
pub fn build(timestamps: &[DateTime<Utc>], bucket_size: i64) -> Option<Histogram> {
    let min = timestamps.iter().min()?.timestamp();
    let max = timestamps.iter().max()?.timestamp();
    let first = min.div_euclid(bucket_size) * bucket_size;

    let mut buckets = Vec::new();
    let mut start = first;
    loop {
        buckets.push(Bucket {
            start: DateTime::from_timestamp(start, 0)?,
            end: DateTime::from_timestamp(start + bucket_size, 0)?,
            count: 0,
        });
        if max < start + bucket_size {
            break;
        }
        start += bucket_size;
    }

    for ts in timestamps {
        let idx = ((ts.timestamp() - first) / bucket_size) as usize;
        buckets[idx].count += 1;
    }

    Some(Histogram {
        bucket_size,
        buckets,
    })
}

/// Buckets with `count > μ + 2σ` (population standard deviation), in order.
pub fn anomalies(hist: &Histogram) -> Vec<Anomaly> {
    let n = hist.buckets.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = hist.buckets.iter().map(|b| b.count as f64).sum::<f64>() / n as f64;
    let variance = hist
        .buckets
        .iter()
        .map(|b| {
            let d = b.count as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;
    let sigma = variance.sqrt();
    if sigma == 0.0 {
        return Vec::new();
    }

    hist.buckets
        .iter()
        .filter(|b| b.count as f64 > mean + ANOMALY_SIGMA * sigma)
        .map(|b| Anomaly {
            bucket_start: b.start,
            count: b.count,
            deviation: ((b.count as f64 - mean) / sigma * 10.0).round() / 10.0,
        })
        .collect()
}

/// One line per bucket: wall time, a proportional bar of solid and light
/// cells, and the count.
pub fn render_ascii(hist: &Histogram, bar_width: usize) -> String {
    let max_count = hist.buckets.iter().map(|b| b.count).max().unwrap_or(0);
    let mut out = String::new();
    for bucket in &hist.buckets {
        let filled = if max_count == 0 {
            0
        } else {
            ((bucket.count as f64 / max_count as f64) * bar_width as f64).round() as usize
        };
        out.push_str(&format!(
            "{} | {}{} {}\n",
            bucket.start.format("%Y-%m-%d %H:%M:%S"),
            "█".repeat(filled),
            "░".repeat(bar_width - filled),
            bucket.count,
        ));
    }
    out
}
