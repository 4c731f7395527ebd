//! Transcript spreadsheet import: parse exported enrollment rows and reconcile them
//! against a remote course catalog.

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod import;
pub mod matcher;
pub mod parse;
pub mod resolve;
pub mod types;
pub mod xlsx;

pub use cancel::{CancellationToken, Cancelled};
pub use catalog::{CatalogClient, CourseCatalog, CourseQuery, InMemoryCatalog};
pub use config::Config;
pub use import::{apply_import, import_raw_rows, ImportOptions, ImportResult};
pub use matcher::{pick_course, HSE_CATEGORY_ID};
pub use parse::{parse_category_label, parse_row, parse_row_with, CellValue, ColumnLabels, RawRow};
pub use resolve::CategoryResolver;
pub use types::{Category, Course, Grade, ParsedRow, RawEnrollment, Semester};
