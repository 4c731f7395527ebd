// src/import/report.rs

use std::fmt::Write;

use super::{Bucket, ImportResult};

const BUCKETS: [Bucket; 4] = [
    Bucket::NotFound,
    Bucket::TagMismatch,
    Bucket::CategoryMismatch,
    Bucket::UnknownCategory,
];

impl ImportResult {
    /// Human-readable confirmation text: enrollment count, then each non-empty
    /// diagnostic bucket with up to `sample` example entries.
    pub fn summary(&self, sample: usize) -> String {
        let mut out = format!(
            "{} enrollments ready from {} rows.",
            self.raw_enrollments.len(),
            self.stats.rows
        );
        for bucket in BUCKETS {
            let entries = self.diagnostics.list(bucket);
            if entries.is_empty() {
                continue;
            }
            let shown = entries
                .iter()
                .take(sample)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(out, "\n{}: {}", bucket.as_str(), entries.len());
            if !shown.is_empty() {
                let _ = write!(out, " ({}", shown);
                if entries.len() > sample {
                    let _ = write!(out, ", +{} more", entries.len() - sample);
                }
                out.push(')');
            }
        }
        out
    }
}
