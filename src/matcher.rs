// src/matcher.rs

use anyhow::Result;
use tracing::{debug, trace};

use crate::catalog::{CourseCatalog, CourseQuery};
use crate::import::diagnostics::{Bucket, Diagnostic};
use crate::parse::CORE_TAG;
use crate::resolve::CategoryResolver;
use crate::types::{Course, ParsedRow};

/// The only category whose tag combinations may be matched loosely.
pub const HSE_CATEGORY_ID: &str = "HSE";

/// Choose the course a row refers to.
///
/// Primary rule: first candidate in the expected category (if any) carrying every
/// required tag. When that fails, an HSE row with exactly two required tags may take
/// an HSE course tagged `[first tag, 핵심]`, or else an untagged HSE course.
pub fn pick_course<'a, S: AsRef<str>>(
    candidates: &'a [Course],
    expected_category: Option<&str>,
    required_tags: &[S],
    allow_fallback: bool,
) -> Option<&'a Course> {
    let primary = candidates.iter().find(|c| {
        expected_category.map_or(true, |cat| c.category == cat) && c.has_tags(required_tags)
    });
    if primary.is_some() {
        return primary;
    }

    if !allow_fallback || expected_category != Some(HSE_CATEGORY_ID) || required_tags.len() != 2
    {
        return None;
    }

    let in_hse = || candidates.iter().filter(|c| c.category == HSE_CATEGORY_ID);
    let first = required_tags[0].as_ref();
    if let Some(c) = in_hse().find(|c| c.tags.contains(first) && c.tags.contains(CORE_TAG)) {
        trace!(code = %c.code, "fallback: first tag + core");
        return Some(c);
    }
    let untagged = in_hse().find(|c| c.tags.is_empty());
    if let Some(c) = untagged {
        trace!(code = %c.code, "fallback: untagged HSE course");
    }
    untagged
}

/// Terminal state of one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Matched(Course),
    TagMismatch,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowResolution {
    pub outcome: RowOutcome,
    /// In the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

fn tag_context(tags: &[String]) -> String {
    tags.join(",")
}

fn row_context(row: &ParsedRow) -> String {
    if row.category_base_label.is_empty() {
        format!("{} {}", row.year, row.semester)
    } else {
        row.category_base_label.clone()
    }
}

/// Resolve a row against the catalog with at most two course queries.
pub async fn resolve_row<C: CourseCatalog>(
    catalog: &C,
    resolver: &CategoryResolver,
    row: &ParsedRow,
) -> Result<RowResolution> {
    let code = row.course_code.as_str();
    let label = row.category_base_label.as_str();
    let tags = &row.required_tags;
    let mut diagnostics = Vec::new();

    let category_id = resolver.resolve(label);
    if category_id.is_none() && !label.is_empty() {
        debug!(code, label, "unknown category label");
        diagnostics.push(Diagnostic::new(Bucket::UnknownCategory, code, label));
    }
    let allow_fallback = category_id == Some(HSE_CATEGORY_ID);
    let tag_mismatch_possible = !tags.is_empty() && !allow_fallback;

    if let Some(cat) = category_id {
        let narrow = catalog
            .courses(&CourseQuery::by_code_and_category(code, cat))
            .await?;
        if let Some(course) = pick_course(&narrow, Some(cat), tags, allow_fallback) {
            return Ok(RowResolution {
                outcome: RowOutcome::Matched(course.clone()),
                diagnostics,
            });
        }
        if !narrow.is_empty() && tag_mismatch_possible {
            diagnostics.push(Diagnostic::new(Bucket::TagMismatch, code, &tag_context(tags)));
        }
    }

    let broad = catalog.courses(&CourseQuery::by_code(code)).await?;
    let outcome = match pick_course(&broad, None, tags, allow_fallback) {
        Some(course) => {
            if let Some(cat) = category_id.filter(|cat| course.category != *cat) {
                let actual = resolver.name_of(&course.category).unwrap_or(&course.category);
                debug!(code, expected = cat, actual, "matched outside the labelled category");
                diagnostics.push(Diagnostic::new(
                    Bucket::CategoryMismatch,
                    code,
                    &format!("{}→{}", label, actual),
                ));
            }
            RowOutcome::Matched(course.clone())
        }
        None if !broad.is_empty() && tag_mismatch_possible => {
            diagnostics.push(Diagnostic::new(Bucket::TagMismatch, code, &tag_context(tags)));
            RowOutcome::TagMismatch
        }
        None => {
            diagnostics.push(Diagnostic::new(Bucket::NotFound, code, &row_context(row)));
            RowOutcome::NotFound
        }
    };

    Ok(RowResolution {
        outcome,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::types::{Category, Grade, Semester};

    fn course(id: i64, code: &str, category: &str, tags: &[&str]) -> Course {
        Course {
            id,
            code: code.to_string(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            name: None,
            credit: None,
        }
    }

    fn row(code: &str, label: &str, tags: &[&str]) -> ParsedRow {
        ParsedRow {
            year: 2023,
            semester: Semester::Spring,
            course_code: code.to_string(),
            category_base_label: label.to_string(),
            required_tags: tags.iter().map(|t| t.to_string()).collect(),
            grade: Grade::AZero,
        }
    }

    fn resolver() -> CategoryResolver {
        CategoryResolver::new(&[
            Category {
                id: "MCR".to_string(),
                name: "전공필수".to_string(),
            },
            Category {
                id: "MCE".to_string(),
                name: "전공선택".to_string(),
            },
            Category {
                id: "HSE".to_string(),
                name: "인문사회선택".to_string(),
            },
        ])
    }

    #[test]
    fn exact_match_wins_over_earlier_loose_candidate() {
        let cands = vec![
            course(1, "HSS001", "MCE", &[]),
            course(2, "HSS001", "HSE", &["사회", "일반"]),
        ];
        let picked = pick_course(&cands, Some("HSE"), &["사회", "일반"], true).unwrap();
        assert_eq!(picked.id, 2);
    }

    #[test]
    fn tags_are_order_independent_subset() {
        let cands = vec![course(1, "X", "MCR", &["b", "a", "c"])];
        assert!(pick_course(&cands, Some("MCR"), &["a", "b"], false).is_some());
        assert!(pick_course(&cands, None, &["a", "d"], false).is_none());
        assert!(pick_course::<&str>(&cands, Some("MCR"), &[], false).is_some());
    }

    #[test]
    fn hse_fallback_prefers_first_tag_plus_core() {
        let cands = vec![
            course(1, "HSS", "HSE", &[]),
            course(2, "HSS", "HSE", &["사회", "핵심"]),
        ];
        let picked = pick_course(&cands, Some("HSE"), &["사회", "일반"], true).unwrap();
        assert_eq!(picked.id, 2);
    }

    #[test]
    fn hse_fallback_then_untagged() {
        let cands = vec![
            course(1, "HSS", "HSE", &["인문", "핵심"]),
            course(2, "HSS", "HSE", &[]),
        ];
        let picked = pick_course(&cands, Some("HSE"), &["사회", "일반"], true).unwrap();
        assert_eq!(picked.id, 2);
    }

    #[test]
    fn fallback_needs_two_tags_and_permission() {
        let cands = vec![course(1, "HSS", "HSE", &[])];
        assert!(pick_course(&cands, Some("HSE"), &["사회"], true).is_none());
        assert!(pick_course(&cands, Some("HSE"), &["사회", "일반"], false).is_none());
        assert!(pick_course(&cands, None, &["사회", "일반"], true).is_none());
    }

    #[test]
    fn fallback_never_applies_outside_hse() {
        let cands = vec![course(1, "X", "MCE", &[])];
        assert!(pick_course(&cands, Some("MCE"), &["사회", "일반"], true).is_none());
    }

    #[tokio::test]
    async fn resolves_by_alias() {
        let catalog = InMemoryCatalog::new(vec![], vec![course(5, "CS101", "MCR", &[])]);
        let res = resolve_row(&catalog, &resolver(), &row("CS101", "전필", &[]))
            .await
            .unwrap();
        assert_eq!(res.outcome, RowOutcome::Matched(course(5, "CS101", "MCR", &[])));
        assert!(res.diagnostics.is_empty());
        assert_eq!(catalog.query_count(), 1);
    }

    #[tokio::test]
    async fn tag_mismatch_outside_hse() {
        let catalog = InMemoryCatalog::new(vec![], vec![course(5, "CS101", "MCE", &["융합"])]);
        let res = resolve_row(&catalog, &resolver(), &row("CS101", "전선", &["사회", "일반"]))
            .await
            .unwrap();
        assert_eq!(res.outcome, RowOutcome::TagMismatch);
        assert_eq!(
            res.diagnostics,
            vec![
                Diagnostic::new(Bucket::TagMismatch, "CS101", "사회,일반"),
                Diagnostic::new(Bucket::TagMismatch, "CS101", "사회,일반"),
            ]
        );
    }

    #[tokio::test]
    async fn hse_row_without_usable_variant_is_not_found() {
        let catalog =
            InMemoryCatalog::new(vec![], vec![course(9, "HSS100", "HSE", &["인문", "융합"])]);
        let res = resolve_row(&catalog, &resolver(), &row("HSS100", "인선", &["사회", "일반"]))
            .await
            .unwrap();
        assert_eq!(res.outcome, RowOutcome::NotFound);
        assert_eq!(
            res.diagnostics,
            vec![Diagnostic::new(Bucket::NotFound, "HSS100", "인선")]
        );
    }

    #[tokio::test]
    async fn unknown_category_still_matches_by_code() {
        let catalog = InMemoryCatalog::new(vec![], vec![course(3, "MAS101", "BR", &[])]);
        let res = resolve_row(&catalog, &resolver(), &row("MAS101", "수학기초", &[]))
            .await
            .unwrap();
        assert_eq!(res.outcome, RowOutcome::Matched(course(3, "MAS101", "BR", &[])));
        assert_eq!(
            res.diagnostics,
            vec![Diagnostic::new(Bucket::UnknownCategory, "MAS101", "수학기초")]
        );
        assert_eq!(catalog.query_count(), 1);
    }

    #[tokio::test]
    async fn unknown_category_never_uses_hse_fallback() {
        let catalog = InMemoryCatalog::new(vec![], vec![course(3, "HSS", "HSE", &[])]);
        let res = resolve_row(&catalog, &resolver(), &row("HSS", "인사선", &["사회", "일반"]))
            .await
            .unwrap();
        assert_eq!(res.outcome, RowOutcome::TagMismatch);
    }

    #[tokio::test]
    async fn match_in_other_category_is_flagged() {
        let catalog = InMemoryCatalog::new(vec![], vec![course(4, "CS202", "MCE", &[])]);
        let res = resolve_row(&catalog, &resolver(), &row("CS202", "전필", &[]))
            .await
            .unwrap();
        assert!(matches!(res.outcome, RowOutcome::Matched(ref c) if c.id == 4));
        assert_eq!(
            res.diagnostics,
            vec![Diagnostic::new(Bucket::CategoryMismatch, "CS202", "전필→전공선택")]
        );
        assert_eq!(catalog.query_count(), 2);
    }

    #[tokio::test]
    async fn missing_code_is_not_found_even_with_tags() {
        let catalog = InMemoryCatalog::new(vec![], vec![]);
        let mut r = row("NOPE1", "", &["사회", "일반"]);
        r.year = 0;
        let res = resolve_row(&catalog, &resolver(), &r).await.unwrap();
        assert_eq!(res.outcome, RowOutcome::NotFound);
        assert_eq!(
            res.diagnostics,
            vec![Diagnostic::new(Bucket::NotFound, "NOPE1", "0 SPRING")]
        );
    }
}
