//! Pattern — the shared pattern language for `cluster`, `grep`, and `fetch`.
//!
//! A pattern wrapped in forward slashes compiles as a regular expression;
//! anything else matches as a literal substring.

use super::engine::{FilterEngine, FilterError};

pub fn compile(pattern: &str) -> Result<FilterEngine, FilterError> {
    if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        FilterEngine::regex(&pattern[1..pattern.len() - 1])
    } else {
        Ok(FilterEngine::substring(pattern))
    }
}
