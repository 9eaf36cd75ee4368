//! Blocks — non-overlapping matching runs between two token sequences.
//!
//! The table tracks the longest common run *ending* at each position pair,
//! so every positive cell names a concrete contiguous match. Candidates are
//! then admitted greedily by score, which favours long, information-dense
//! runs over classical LCS reconstruction and tolerates reordering.

use super::token::Token;

/// A correspondence between equal token slices of two sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
    pub len: usize,
}

struct Candidate {
    block: Block,
    score: usize,
}

/// Match `a` against `b`, returning disjoint blocks sorted by `a_start`.
///
/// Every returned block contains at least one significant word token;
/// runs of pure delimiters never anchor a match on their own.
pub fn match_blocks(a: &[Token], b: &[Token]) -> Vec<Block> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut candidates = collect_candidates(a, b);

    // Stable sort: equal scores keep emission order (row-major over the table).
    candidates.sort_by(|x, y| y.score.cmp(&x.score));

    let mut used_a = vec![false; a.len()];
    let mut used_b = vec![false; b.len()];
    let mut admitted = Vec::new();

    for cand in candidates {
        let bl = cand.block;
        let overlaps = used_a[bl.a_start..bl.a_end].iter().any(|&u| u)
            || used_b[bl.b_start..bl.b_end].iter().any(|&u| u);
        if overlaps {
            continue;
        }
        used_a[bl.a_start..bl.a_end].iter_mut().for_each(|u| *u = true);
        used_b[bl.b_start..bl.b_end].iter_mut().for_each(|u| *u = true);
        admitted.push(bl);
    }

    admitted.sort_by_key(|bl| bl.a_start);
    admitted
}

/// One candidate per positive table cell: the full run ending there,
/// scored `len + non_delimiter_count` and rejected without a significant word.
fn collect_candidates(a: &[Token], b: &[Token]) -> Vec<Candidate> {
    let m = b.len();
    let mut prev = vec![0usize; m + 1];
    let mut candidates = Vec::new();

    for i in 1..=a.len() {
        let mut row = vec![0usize; m + 1];
        for j in 1..=m {
            if a[i - 1].text != b[j - 1].text {
                continue;
            }
            let len = prev[j - 1] + 1;
            row[j] = len;

            let a_start = i - len;
            let slice = &a[a_start..i];
            if !slice.iter().any(Token::is_significant) {
                continue;
            }
            let non_delim = slice.iter().filter(|t| !t.is_delimiter).count();
            candidates.push(Candidate {
                block: Block {
                    a_start,
                    a_end: i,
                    b_start: j - len,
                    b_end: j,
                    len,
                },
                score: len + non_delim,
            });
        }
        prev = row;
    }

    candidates
}
