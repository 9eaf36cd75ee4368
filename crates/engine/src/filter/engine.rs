//! Filter engine — compiled line matcher with scan statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid regex: {0}")]
    InvalidRegex(String),
}

#[derive(Debug, Default)]
pub struct FilterStats {
    pub lines_scanned: AtomicU64,
    pub lines_matched: AtomicU64,
    pub bytes_processed: AtomicU64,
}

enum LineMatcher {
    Regex(RegexMatcher),
    Substring(String),
}

impl std::fmt::Debug for LineMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineMatcher::Regex(_) => f.write_str("LineMatcher::Regex(..)"),
            LineMatcher::Substring(s) => f.debug_tuple("LineMatcher::Substring").field(s).finish(),
        }
    }
}

#[derive(Debug)]
pub struct FilterEngine {
    matcher: LineMatcher,
    stats: FilterStats,
}

impl FilterEngine {
    /// Compile a regular-expression matcher.
    pub fn regex(pattern: &str) -> Result<Self, FilterError> {
        let matcher = RegexMatcherBuilder::new()
            .multi_line(false)
            .build(pattern)
            .map_err(|e| FilterError::InvalidRegex(e.to_string()))?;
        Ok(Self {
            matcher: LineMatcher::Regex(matcher),
            stats: FilterStats::default(),
        })
    }

    /// A plain substring matcher; never fails.
    pub fn substring(needle: &str) -> Self {
        Self {
            matcher: LineMatcher::Substring(needle.to_string()),
            stats: FilterStats::default(),
        }
    }

    #[inline]
    pub fn is_match(&self, line: &str) -> bool {
        self.stats.lines_scanned.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes_processed
            .fetch_add(line.len() as u64, Ordering::Relaxed);

        let matched = match &self.matcher {
            LineMatcher::Regex(m) => m.is_match(line.as_bytes()).unwrap_or(false),
            LineMatcher::Substring(needle) => line.contains(needle.as_str()),
        };

        if matched {
            self.stats.lines_matched.fetch_add(1, Ordering::Relaxed);
        }
        matched
    }

    /// `(lines_scanned, lines_matched, bytes_processed)`
    pub fn stats(&self) -> (u64, u64, u64) {
        (
            self.stats.lines_scanned.load(Ordering::Relaxed),
            self.stats.lines_matched.load(Ordering::Relaxed),
            self.stats.bytes_processed.load(Ordering::Relaxed),
        )
    }
}
