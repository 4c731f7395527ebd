// src/import/diagnostics.rs

use serde::Serialize;
use std::collections::HashSet;

/// Which list a diagnostic lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    NotFound,
    TagMismatch,
    CategoryMismatch,
    UnknownCategory,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::NotFound => "not found",
            Bucket::TagMismatch => "tag mismatch",
            Bucket::CategoryMismatch => "category mismatch",
            Bucket::UnknownCategory => "unknown category",
        }
    }
}

/// One `"<code>(<context>)"` entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub bucket: Bucket,
    pub entry: String,
}

impl Diagnostic {
    pub fn new(bucket: Bucket, code: &str, context: &str) -> Self {
        Self {
            bucket,
            entry: format!("{}({})", code, context),
        }
    }
}

/// The four diagnostic lists of an import, deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub not_found_codes: Vec<String>,
    pub tag_mismatch: Vec<String>,
    pub category_mismatch: Vec<String>,
    pub unknown_category: Vec<String>,
    #[serde(skip)]
    seen: HashSet<(Bucket, String)>,
}

impl Diagnostics {
    pub fn push(&mut self, diag: Diagnostic) {
        if !self.seen.insert((diag.bucket, diag.entry.clone())) {
            return;
        }
        self.list_mut(diag.bucket).push(diag.entry);
    }

    pub fn list(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::NotFound => &self.not_found_codes,
            Bucket::TagMismatch => &self.tag_mismatch,
            Bucket::CategoryMismatch => &self.category_mismatch,
            Bucket::UnknownCategory => &self.unknown_category,
        }
    }

    fn list_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::NotFound => &mut self.not_found_codes,
            Bucket::TagMismatch => &mut self.tag_mismatch,
            Bucket::CategoryMismatch => &mut self.category_mismatch,
            Bucket::UnknownCategory => &mut self.unknown_category,
        }
    }

    pub fn total(&self) -> usize {
        self.not_found_codes.len()
            + self.tag_mismatch.len()
            + self.category_mismatch.len()
            + self.unknown_category.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
