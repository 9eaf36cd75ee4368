//! Error — tool-level failure kinds and their wire form.
//!
//! Every failure is local to one invocation and rides inside the result
//! document as `{"error": …}`; nothing is raised across the transport.
//! Out-of-range numeric parameters are clamped, never rejected.

use std::path::Path;

use serde_json::{json, Value};
use thiserror::Error;

use crate::filter::FilterError;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("Unknown cluster id: {0}")]
    UnknownCluster(u64),

    #[error("No timestamp format detected in this file")]
    NoTimestamp,

    #[error("Invalid regex: {0}")]
    InvalidPattern(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ToolError {
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ToolError::FileNotFound(path.display().to_string())
        } else {
            ToolError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            }
        }
    }

    /// The wire form of a failed tool call.
    pub fn into_document(self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<FilterError> for ToolError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidRegex(msg) => ToolError::InvalidPattern(msg),
        }
    }
}
