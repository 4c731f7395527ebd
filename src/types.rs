// src/types.rs

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

/// Academic term within a year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Semester {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Semester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Spring => "SPRING",
            Semester::Summer => "SUMMER",
            Semester::Fall => "FALL",
            Semester::Winter => "WINTER",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of grade symbols a transcript export can carry.
/// Anything outside the set is coerced to `NR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A0")]
    AZero,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B0")]
    BZero,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C0")]
    CZero,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D0")]
    DZero,
    #[serde(rename = "D-")]
    DMinus,
    F,
    S,
    U,
    P,
    NR,
    W,
}

impl Grade {
    pub const ALL: [Grade; 18] = [
        Grade::APlus,
        Grade::AZero,
        Grade::AMinus,
        Grade::BPlus,
        Grade::BZero,
        Grade::BMinus,
        Grade::CPlus,
        Grade::CZero,
        Grade::CMinus,
        Grade::DPlus,
        Grade::DZero,
        Grade::DMinus,
        Grade::F,
        Grade::S,
        Grade::U,
        Grade::P,
        Grade::NR,
        Grade::W,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::AZero => "A0",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::BZero => "B0",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::CZero => "C0",
            Grade::CMinus => "C-",
            Grade::DPlus => "D+",
            Grade::DZero => "D0",
            Grade::DMinus => "D-",
            Grade::F => "F",
            Grade::S => "S",
            Grade::U => "U",
            Grade::P => "P",
            Grade::NR => "NR",
            Grade::W => "W",
        }
    }

    /// Exact symbol lookup (after trimming). Case matters: `a+` is not a grade.
    pub fn from_symbol(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|g| g.as_str() == s)
    }

    /// Lookup that never fails: unknown or empty text becomes `NR`.
    pub fn coerce(s: &str) -> Self {
        Self::from_symbol(s).unwrap_or(Grade::NR)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript row after parsing. Never built for header/boilerplate rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRow {
    /// `0` marks prior-credit rows.
    pub year: u16,
    pub semester: Semester,
    pub course_code: String,
    pub category_base_label: String,
    /// Group tag first, then type tag; either may be absent.
    pub required_tags: Vec<String>,
    pub grade: Grade,
}

/// A category as served by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A course as served by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<f32>,
}

impl Course {
    pub fn has_tags<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|t| self.tags.contains(t.as_ref()))
    }
}

/// The persisted unit: one course taken in one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnrollment {
    pub course_id: i64,
    pub enrolled_year: u16,
    pub enrolled_semester: Semester,
    pub grade: Grade,
}

impl RawEnrollment {
    /// `"<courseId>-<year>-<semester>"`, the dedup key within one import.
    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.course_id, self.enrolled_year, self.enrolled_semester
        )
    }
}
