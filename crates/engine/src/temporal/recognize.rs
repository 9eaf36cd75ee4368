//! Recognize — timestamp format induction over a line sample.
//!
//! A small closed catalogue of recognizers, each a match-then-parse pair on
//! one enum variant. Detection runs every recognizer over the sample and
//! keeps the most confident one; after that the winner is applied per line
//! and a parse failure simply yields no timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

/// Default number of head lines sampled for format detection; the engine
/// configuration starts from this value.
pub const DETECTION_SAMPLE: usize = 100;

/// A recognizer must validly parse more than half the sample to win.
pub const MIN_CONFIDENCE: f64 = 0.5;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The recognizer catalogue, in priority order. Earlier entries win ties.
pub const CATALOGUE: [TimestampKind; 7] = [
    TimestampKind::Iso8601,
    TimestampKind::Clf,
    TimestampKind::Syslog,
    TimestampKind::Simple,
    TimestampKind::EpochMs,
    TimestampKind::EpochS,
    TimestampKind::Bracket,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    /// `YYYY-MM-DD[T ]HH:MM:SS[.fff][Z|±HH:MM]`
    Iso8601,
    /// `[DD/Mon/YYYY:HH:MM:SS ±HHMM]` — the offset is honored.
    Clf,
    /// `Mon D HH:MM:SS` — the year comes from the detection pass.
    Syslog,
    /// `YYYY-MM-DD HH:MM:SS`
    Simple,
    /// 13-digit integer starting `1[4-9]`; the narrow prefix avoids
    /// collisions with request ids and port numbers.
    EpochMs,
    /// 10-digit integer starting `1[4-9]`.
    EpochS,
    /// `[YYYY-MM-DD HH:MM:SS[.fff]]`
    Bracket,
}

/// The outcome of a detection pass: which recognizer, how sure, and the
/// wall-clock year captured once for year-less formats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub kind: TimestampKind,
    pub confidence: f64,
    pub base_year: i32,
}

impl TimestampKind {
    pub fn name(self) -> &'static str {
        match self {
            TimestampKind::Iso8601 => "iso8601",
            TimestampKind::Clf => "clf",
            TimestampKind::Syslog => "syslog",
            TimestampKind::Simple => "simple",
            TimestampKind::EpochMs => "epoch_ms",
            TimestampKind::EpochS => "epoch_s",
            TimestampKind::Bracket => "bracket",
        }
    }

    /// Locate the first candidate span in `line`, without validating it
    /// as a real instant.
    pub fn find(self, line: &str) -> Option<&str> {
        match self {
            TimestampKind::Iso8601 => find_iso8601(line),
            TimestampKind::Clf => find_clf(line),
            TimestampKind::Syslog => find_syslog(line),
            TimestampKind::Simple => find_simple(line),
            TimestampKind::EpochMs => find_digit_run(line, 13),
            TimestampKind::EpochS => find_digit_run(line, 10),
            TimestampKind::Bracket => find_bracket(line),
        }
    }

    /// Parse a span previously returned by [`TimestampKind::find`].
    pub fn parse(self, raw: &str, base_year: i32) -> Option<DateTime<Utc>> {
        match self {
            TimestampKind::Iso8601 => parse_iso8601(raw),
            TimestampKind::Clf => DateTime::parse_from_str(raw, "%d/%b/%Y:%H:%M:%S %z")
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            TimestampKind::Syslog => parse_syslog(raw, base_year),
            TimestampKind::Simple => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|n| n.and_utc()),
            TimestampKind::EpochMs => raw
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis),
            TimestampKind::EpochS => raw
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            TimestampKind::Bracket => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc()),
        }
    }

    /// Match and parse in one step.
    pub fn extract(self, line: &str, base_year: i32) -> Option<DateTime<Utc>> {
        self.find(line).and_then(|raw| self.parse(raw, base_year))
    }
}

/// Run every recognizer over the sample; keep the most confident one above
/// [`MIN_CONFIDENCE`]. Ties keep the earlier catalogue entry.
pub fn detect_format(sample: &[String], base_year: i32) -> Option<Detection> {
    if sample.is_empty() {
        return None;
    }
    let mut best: Option<Detection> = None;
    for kind in CATALOGUE {
        let valid = sample
            .iter()
            .filter(|line| kind.extract(line, base_year).is_some())
            .count();
        let confidence = valid as f64 / sample.len() as f64;
        if best.map_or(true, |b| confidence > b.confidence) {
            best = Some(Detection {
                kind,
                confidence,
                base_year,
            });
        }
    }
    best.filter(|d| d.confidence > MIN_CONFIDENCE)
}

// ─── Span scanners ──────────────────────────────────────────────

fn digits(b: &[u8], n: usize) -> bool {
    b.len() >= n && b[..n].iter().all(u8::is_ascii_digit)
}

/// `dddd-dd-dd` at the start of `b`.
fn date_at(b: &[u8]) -> bool {
    digits(b, 4)
        && b.len() >= 10
        && b[4] == b'-'
        && digits(&b[5..], 2)
        && b[7] == b'-'
        && digits(&b[8..], 2)
}

/// `dd:dd:dd` at the start of `b`.
fn time_at(b: &[u8]) -> bool {
    digits(b, 2)
        && b.len() >= 8
        && b[2] == b':'
        && digits(&b[3..], 2)
        && b[5] == b':'
        && digits(&b[6..], 2)
}

fn find_iso8601(line: &str) -> Option<&str> {
    let b = line.as_bytes();
    for i in 0..b.len() {
        let rest = &b[i..];
        if rest.len() < 19 || !date_at(rest) {
            continue;
        }
        if rest[10] != b'T' && rest[10] != b' ' {
            continue;
        }
        if !time_at(&rest[11..]) {
            continue;
        }
        let mut end = 19;
        if rest.get(end) == Some(&b'.') {
            let mut k = end + 1;
            while k < rest.len() && rest[k].is_ascii_digit() {
                k += 1;
            }
            if k > end + 1 {
                end = k;
            }
        }
        match rest.get(end) {
            Some(&b'Z') => end += 1,
            Some(&b'+') | Some(&b'-')
                if digits(&rest[end + 1..], 2)
                    && rest.get(end + 3) == Some(&b':')
                    && digits(&rest[end + 4..], 2) =>
            {
                end += 6;
            }
            _ => {}
        }
        return Some(&line[i..i + end]);
    }
    None
}

fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    let mut normalized = raw.to_string();
    // The space-separated variant is normalized before parsing.
    if normalized.as_bytes().get(10) == Some(&b' ') {
        normalized.replace_range(10..11, "T");
    }
    let zoned = normalized.ends_with('Z')
        || matches!(normalized.as_bytes(), b if b.len() >= 6
            && (b[b.len() - 6] == b'+' || b[b.len() - 6] == b'-')
            && b[b.len() - 3] == b':');
    if zoned {
        DateTime::parse_from_rfc3339(&normalized)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|n| n.and_utc())
    }
}

fn find_clf(line: &str) -> Option<&str> {
    let b = line.as_bytes();
    for i in 0..b.len() {
        if b[i] != b'[' {
            continue;
        }
        let rest = &b[i + 1..];
        // DD/Mon/YYYY:HH:MM:SS ±HHMM]
        if rest.len() < 27 {
            continue;
        }
        let shape = digits(rest, 2)
            && rest[2] == b'/'
            && rest[3..6].iter().all(u8::is_ascii_alphabetic)
            && rest[6] == b'/'
            && digits(&rest[7..], 4)
            && rest[11] == b':'
            && time_at(&rest[12..])
            && rest[20] == b' '
            && (rest[21] == b'+' || rest[21] == b'-')
            && digits(&rest[22..], 4)
            && rest[26] == b']';
        if shape {
            return Some(&line[i + 1..i + 27]);
        }
    }
    None
}

fn find_syslog(line: &str) -> Option<&str> {
    let b = line.as_bytes();
    for i in 0..b.len().saturating_sub(11) {
        let at_boundary = i == 0 || !b[i - 1].is_ascii_alphanumeric();
        if !at_boundary {
            continue;
        }
        if !MONTHS.iter().any(|m| b[i..].starts_with(m.as_bytes())) {
            continue;
        }
        if b.get(i + 3) != Some(&b' ') {
            continue;
        }
        // Day: "Jan  5", "Jan 5", or "Jan 15".
        let mut k = i + 4;
        if b.get(k) == Some(&b' ') {
            k += 1;
        }
        let day_start = k;
        while k < b.len() && b[k].is_ascii_digit() {
            k += 1;
        }
        let day_len = k - day_start;
        if day_len == 0 || day_len > 2 {
            continue;
        }
        if b.get(k) != Some(&b' ') || !time_at(&b[k + 1..]) {
            continue;
        }
        return Some(&line[i..k + 9]);
    }
    None
}

fn parse_syslog(raw: &str, base_year: i32) -> Option<DateTime<Utc>> {
    let month = MONTHS.iter().position(|m| raw.starts_with(m))? as u32 + 1;
    let mut fields = raw[3..].split_whitespace();
    let day: u32 = fields.next()?.parse().ok()?;
    let time = NaiveTime::parse_from_str(fields.next()?, "%H:%M:%S").ok()?;
    let date = NaiveDate::from_ymd_opt(base_year, month, day)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

fn find_simple(line: &str) -> Option<&str> {
    let b = line.as_bytes();
    for i in 0..b.len() {
        let rest = &b[i..];
        if rest.len() >= 19 && date_at(rest) && rest[10] == b' ' && time_at(&rest[11..]) {
            return Some(&line[i..i + 19]);
        }
    }
    None
}

/// A digit run of exactly `width`, starting with `1` then `4`..`9`.
fn find_digit_run(line: &str, width: usize) -> Option<&str> {
    let b = line.as_bytes();
    let mut i = 0;
    while i < b.len() {
        if !b[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i - start == width && b[start] == b'1' && (b'4'..=b'9').contains(&b[start + 1]) {
            return Some(&line[start..i]);
        }
    }
    None
}

fn find_bracket(line: &str) -> Option<&str> {
    let b = line.as_bytes();
    for i in 0..b.len() {
        if b[i] != b'[' {
            continue;
        }
        let rest = &b[i + 1..];
        if rest.len() < 20 || !date_at(rest) || rest[10] != b' ' || !time_at(&rest[11..]) {
            continue;
        }
        let mut end = 19;
        if rest.get(end) == Some(&b'.') {
            let mut k = end + 1;
            while k < rest.len() && rest[k].is_ascii_digit() {
                k += 1;
            }
            if k > end + 1 {
                end = k;
            }
        }
        if rest.get(end) == Some(&b']') {
            return Some(&line[i + 1..i + 1 + end]);
        }
    }
    None
}
