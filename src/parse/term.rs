// src/parse/term.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Semester;

/// Term text used by the export for credits recognized before enrollment tracking.
pub const PRIOR_CREDIT_TERM: &str = "기이수 인정 학점";

static TERM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\s*년\s*(봄|여름|가을|겨울)\s*학기").unwrap());

fn season(word: &str) -> Option<Semester> {
    match word {
        "봄" => Some(Semester::Spring),
        "여름" => Some(Semester::Summer),
        "가을" => Some(Semester::Fall),
        "겨울" => Some(Semester::Winter),
        _ => None,
    }
}

/// Parse `"2023년 가을학기"` style text into `(year, semester)`.
/// The prior-credit term maps to `(0, Spring)`.
pub fn parse_term(text: &str) -> Option<(u16, Semester)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text == PRIOR_CREDIT_TERM {
        return Some((0, Semester::Spring));
    }
    let caps = TERM_RE.captures(text)?;
    let year: u16 = caps[1].parse().ok()?;
    let semester = season(&caps[2])?;
    Some((year, semester))
}
