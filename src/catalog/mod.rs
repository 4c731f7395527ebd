// src/catalog/mod.rs

pub mod http;
pub mod memory;

use anyhow::Result;

use crate::types::{Category, Course};

pub use http::CatalogClient;
pub use memory::InMemoryCatalog;

/// Filter for a course catalog lookup. `code` is always sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseQuery<'a> {
    pub code: &'a str,
    pub category: Option<&'a str>,
}

impl<'a> CourseQuery<'a> {
    pub fn by_code(code: &'a str) -> Self {
        Self {
            code,
            category: None,
        }
    }

    pub fn by_code_and_category(code: &'a str, category: &'a str) -> Self {
        Self {
            code,
            category: Some(category),
        }
    }
}

/// Read access to the remote category and course catalog.
#[allow(async_fn_in_trait)]
pub trait CourseCatalog {
    /// Full category list. Called once per import.
    async fn categories(&self) -> Result<Vec<Category>>;

    /// Courses matching `query`, in catalog order.
    async fn courses(&self, query: &CourseQuery<'_>) -> Result<Vec<Course>>;
}
