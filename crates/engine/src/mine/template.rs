//! Template — static fragments and wildcard gaps induced from line pairs.
//!
//! A template is built from two lines, then refined line by line: each merge
//! may only widen gaps, never narrow them. Merging joins the current static
//! parts with a NUL sentinel before re-matching, so a matched run can never
//! bridge two parts (incoming lines are NUL-free by the reader's contract).

use super::blocks::match_blocks;
use super::token::tokenize;

/// The gap marker. Two adjacent markers are always collapsed into one.
pub const WILDCARD: &str = ".*";

/// Join sentinel between static parts during a merge.
const SENTINEL: char = '\0';

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub pattern: String,
    pub static_parts: Vec<String>,
}

impl Template {
    /// A template that matches exactly one line shape: the line itself.
    pub fn literal(line: &str) -> Self {
        Self {
            pattern: line.to_string(),
            static_parts: vec![line.to_string()],
        }
    }

    /// Induce a template from two raw lines.
    ///
    /// Similarity is `2 * matched_chars / (a.len() + b.len())`, where
    /// `matched_chars` counts the characters of the emitted static parts.
    pub fn extract(a: &str, b: &str) -> (Template, f64) {
        let ta = tokenize(a);
        let tb = tokenize(b);
        let blocks = match_blocks(&ta, &tb);
        if blocks.is_empty() {
            return (Template::degenerate(), 0.0);
        }

        let mut pieces: Vec<Option<String>> = Vec::new();
        if blocks[0].a_start != 0 {
            pieces.push(None);
        }
        for (idx, bl) in blocks.iter().enumerate() {
            if idx > 0 {
                pieces.push(None);
            }
            let text: String = ta[bl.a_start..bl.a_end]
                .iter()
                .map(|t| t.text.as_str())
                .collect();
            pieces.push(Some(text));
        }
        if blocks[blocks.len() - 1].a_end != ta.len() {
            pieces.push(None);
        }

        let template = Template::from_pieces(pieces);
        let matched: usize = template.static_parts.iter().map(String::len).sum();
        let similarity = 2.0 * matched as f64 / (a.len() + b.len()) as f64;
        (template, similarity)
    }

    /// Refine this template against a new line.
    ///
    /// Similarity here is `2 * new_matched_chars / (pattern.len() + line.len())`.
    /// The asymmetry with [`Template::extract`] is deliberate: cluster
    /// membership is decided against exactly this quantity.
    pub fn merge(&self, line: &str) -> (Template, f64) {
        let synthetic = self.synthetic();
        let ta = tokenize(&synthetic);
        let tb = tokenize(line);
        let blocks = match_blocks(&ta, &tb);
        if blocks.is_empty() {
            return (Template::degenerate(), 0.0);
        }

        let mut pieces: Vec<Option<String>> = Vec::new();
        if blocks[0].a_start != 0 {
            pieces.push(None);
        }
        for (idx, bl) in blocks.iter().enumerate() {
            if idx > 0 {
                pieces.push(None);
            }
            let text: String = ta[bl.a_start..bl.a_end]
                .iter()
                .map(|t| t.text.as_str())
                .collect();
            let stripped: String = text.chars().filter(|&c| c != SENTINEL).collect();
            if stripped.is_empty() {
                // The boundary fell between static parts.
                pieces.push(None);
            } else {
                pieces.push(Some(stripped));
            }
        }
        if blocks[blocks.len() - 1].a_end != ta.len() {
            pieces.push(None);
        }

        let template = Template::from_pieces(pieces);
        let matched: usize = template.static_parts.iter().map(String::len).sum();
        let similarity = 2.0 * matched as f64 / (self.pattern.len() + line.len()) as f64;
        (template, similarity)
    }

    /// Count the gap markers in the pattern.
    pub fn wildcards(&self) -> usize {
        self.pattern.matches(WILDCARD).count()
    }

    /// The merge-side sequence: static parts joined by the sentinel, with
    /// edge sentinels standing in for leading/trailing gaps so those gaps
    /// survive the re-match (a sentinel token never equals a line token).
    fn synthetic(&self) -> String {
        let mut s = String::new();
        if self.pattern.starts_with(WILDCARD) {
            s.push(SENTINEL);
        }
        let mut first = true;
        for part in &self.static_parts {
            if !first {
                s.push(SENTINEL);
            }
            s.push_str(part);
            first = false;
        }
        if !self.static_parts.is_empty() && self.pattern.ends_with(WILDCARD) {
            s.push(SENTINEL);
        }
        s
    }

    fn degenerate() -> Self {
        Self {
            pattern: WILDCARD.to_string(),
            static_parts: Vec::new(),
        }
    }

    /// Assemble the pattern, collapsing runs of gaps into a single marker.
    fn from_pieces(pieces: Vec<Option<String>>) -> Self {
        let mut pattern = String::new();
        let mut static_parts = Vec::new();
        let mut gap_open = false;
        for piece in pieces {
            match piece {
                None => {
                    if !gap_open {
                        pattern.push_str(WILDCARD);
                        gap_open = true;
                    }
                }
                Some(text) => {
                    pattern.push_str(&text);
                    static_parts.push(text);
                    gap_open = false;
                }
            }
        }
        Self {
            pattern,
            static_parts,
        }
    }
}
