//! Model — EngineConfig.

use serde::{Deserialize, Serialize};

use crate::temporal::DETECTION_SAMPLE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lines sampled from the head of a file for timestamp-format detection.
    pub sample_lines: usize,
    /// Histogram bucket-count target used by automatic bucket sizing.
    pub target_buckets: u32,
    /// Cells in the timeline's ASCII bars.
    pub bar_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_lines: DETECTION_SAMPLE,
            target_buckets: 20,
            bar_width: 40,
        }
    }
}

impl EngineConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_lines == 0 {
            return Err("sample_lines must be > 0".to_string());
        }
        if self.target_buckets == 0 {
            return Err("target_buckets must be > 0".to_string());
        }
        if self.bar_width == 0 {
            return Err("bar_width must be > 0".to_string());
        }
        Ok(())
    }
}
