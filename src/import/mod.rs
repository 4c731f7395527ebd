// src/import/mod.rs

pub mod diagnostics;
pub mod report;

use anyhow::{Context, Result};
use futures::{stream, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::cancel::{CancellationToken, Cancelled};
use crate::catalog::CourseCatalog;
use crate::matcher::{resolve_row, RowOutcome};
use crate::parse::{parse_rows, ColumnLabels, RawRow};
use crate::resolve::CategoryResolver;
use crate::types::{ParsedRow, RawEnrollment};

pub use diagnostics::{Bucket, Diagnostic, Diagnostics};

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Rows resolved concurrently; `1` resolves strictly one row after another.
    pub concurrency: usize,
    pub cancel: CancellationToken,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            cancel: CancellationToken::new(),
        }
    }
}

/// Row counts by terminal outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub rows: usize,
    pub matched: usize,
    pub tag_mismatch: usize,
    pub not_found: usize,
}

/// What an import hands back to its caller. Nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub raw_enrollments: Vec<RawEnrollment>,
    #[serde(flatten)]
    pub diagnostics: Diagnostics,
    pub stats: ImportStats,
}

/// Enrollments keyed by `(course, year, semester)`. A repeated key replaces the
/// earlier value in place.
#[derive(Debug, Default)]
struct EnrollmentSet {
    items: Vec<RawEnrollment>,
    index: HashMap<String, usize>,
}

impl EnrollmentSet {
    fn upsert(&mut self, enrollment: RawEnrollment) {
        let key = enrollment.key();
        match self.index.get(&key) {
            Some(&i) => {
                debug!(key = %key, "overwriting earlier row");
                self.items[i] = enrollment;
            }
            None => {
                self.index.insert(key, self.items.len());
                self.items.push(enrollment);
            }
        }
    }

    fn into_vec(self) -> Vec<RawEnrollment> {
        self.items
    }
}

/// Reconcile parsed rows against the catalog.
///
/// Fails only when the catalog can't be read or the import is cancelled; every
/// per-row problem ends up in the returned diagnostics instead.
#[instrument(level = "info", skip_all, fields(rows = rows.len()))]
pub async fn apply_import<C: CourseCatalog>(
    rows: &[ParsedRow],
    catalog: &C,
    opts: &ImportOptions,
) -> Result<ImportResult> {
    let start = Instant::now();

    let categories = catalog
        .categories()
        .await
        .context("loading category catalog")?;
    let resolver = CategoryResolver::new(&categories);
    info!(categories = resolver.len(), "category catalog loaded");

    let resolver = &resolver;
    let cancel = &opts.cancel;
    let mut resolutions = stream::iter(rows.iter().enumerate())
        .map(move |(idx, row)| async move {
            if cancel.is_cancelled() {
                return Err(anyhow::Error::new(Cancelled { rows_done: idx }));
            }
            resolve_row(catalog, resolver, row)
                .await
                .with_context(|| format!("resolving row {} ({})", idx, row.course_code))
                .map(|res| (row, res))
        })
        .buffered(opts.concurrency.max(1));

    let mut enrollments = EnrollmentSet::default();
    let mut diagnostics = Diagnostics::default();
    let mut stats = ImportStats {
        rows: rows.len(),
        ..Default::default()
    };

    while let Some(next) = resolutions.next().await {
        let (row, resolution) = next?;
        for diag in resolution.diagnostics {
            diagnostics.push(diag);
        }
        match resolution.outcome {
            RowOutcome::Matched(course) => {
                stats.matched += 1;
                enrollments.upsert(RawEnrollment {
                    course_id: course.id,
                    enrolled_year: row.year,
                    enrolled_semester: row.semester,
                    grade: row.grade,
                });
            }
            RowOutcome::TagMismatch => stats.tag_mismatch += 1,
            RowOutcome::NotFound => stats.not_found += 1,
        }
    }

    let raw_enrollments = enrollments.into_vec();
    info!(
        enrollments = raw_enrollments.len(),
        matched = stats.matched,
        tag_mismatch = stats.tag_mismatch,
        not_found = stats.not_found,
        elapsed = ?start.elapsed(),
        "import finished"
    );

    Ok(ImportResult {
        raw_enrollments,
        diagnostics,
        stats,
    })
}

/// Parse raw spreadsheet rows, then run [`apply_import`] on what survives.
pub async fn import_raw_rows<C: CourseCatalog>(
    rows: &[RawRow],
    labels: &ColumnLabels,
    catalog: &C,
    opts: &ImportOptions,
) -> Result<ImportResult> {
    let parsed = parse_rows(rows, labels);
    info!(raw = rows.len(), parsed = parsed.len(), "parsed spreadsheet rows");
    apply_import(&parsed, catalog, opts).await
}
