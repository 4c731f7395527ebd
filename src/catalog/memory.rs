// src/catalog/memory.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::{CourseCatalog, CourseQuery};
use crate::types::{Category, Course};

/// A catalog held in memory, e.g. loaded from a JSON snapshot of the backend.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    pub categories: Vec<Category>,
    pub courses: Vec<Course>,
    #[serde(skip)]
    queries: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(categories: Vec<Category>, courses: Vec<Course>) -> Self {
        Self {
            categories,
            courses,
            queries: AtomicUsize::new(0),
        }
    }

    /// Load `{"categories": [...], "courses": [...]}`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading snapshot {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("parsing snapshot {:?}", path))
    }

    /// Number of course queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl CourseCatalog for InMemoryCatalog {
    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn courses(&self, query: &CourseQuery<'_>) -> Result<Vec<Course>> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .courses
            .iter()
            .filter(|c| c.code == query.code)
            .filter(|c| query.category.map_or(true, |cat| c.category == cat))
            .cloned()
            .collect())
    }
}
