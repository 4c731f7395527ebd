// src/parse/mod.rs

pub mod label;
pub mod term;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::types::{Grade, ParsedRow};

pub use label::{parse_category_label, CategoryLabel, CORE_TAG};
pub use term::{parse_term, PRIOR_CREDIT_TERM};

/// A spreadsheet cell after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Trimmed string form. Integral numbers render without a fraction.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Column label → cell, one per spreadsheet row.
pub type RawRow = HashMap<String, CellValue>;

/// Header labels of the four columns the parser reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    pub term: String,
    pub code: String,
    pub category: String,
    pub grade: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            term: "이수학기".to_string(),
            code: "교과목번호".to_string(),
            category: "이수구분".to_string(),
            grade: "성적".to_string(),
        }
    }
}

impl ColumnLabels {
    pub fn all(&self) -> [&str; 4] {
        [&self.term, &self.code, &self.category, &self.grade]
    }
}

fn cell_text(row: &RawRow, label: &str) -> String {
    row.get(label).map(CellValue::as_text).unwrap_or_default()
}

/// Parse one row using the default export labels.
pub fn parse_row(row: &RawRow) -> Option<ParsedRow> {
    parse_row_with(row, &ColumnLabels::default())
}

/// Parse one row. Boilerplate rows (bad term text, no course code) yield `None`.
pub fn parse_row_with(row: &RawRow, labels: &ColumnLabels) -> Option<ParsedRow> {
    let term_text = cell_text(row, &labels.term);
    let (year, semester) = parse_term(&term_text)?;

    let course_code = cell_text(row, &labels.code);
    if course_code.is_empty() {
        return None;
    }

    let CategoryLabel { base, tags } = parse_category_label(&cell_text(row, &labels.category));
    let grade = Grade::coerce(&cell_text(row, &labels.grade));

    Some(ParsedRow {
        year,
        semester,
        course_code,
        category_base_label: base,
        required_tags: tags,
        grade,
    })
}

/// Parse every row, dropping the ones that don't describe an enrollment.
pub fn parse_rows<'a, I>(rows: I, labels: &ColumnLabels) -> Vec<ParsedRow>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut out = Vec::new();
    for (idx, row) in rows.into_iter().enumerate() {
        match parse_row_with(row, labels) {
            Some(parsed) => {
                trace!(row = idx, code = %parsed.course_code, "parsed row");
                out.push(parsed);
            }
            None => debug!(row = idx, "skipping row without term or course code"),
        }
    }
    out
}
