// src/resolve.rs

use std::collections::HashMap;
use tracing::trace;

use crate::types::Category;

/// Two-character abbreviations used by transcript exports → canonical category names.
static CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("기필", "기초필수"),
    ("기선", "기초선택"),
    ("전필", "전공필수"),
    ("전선", "전공선택"),
    ("교필", "교양필수"),
    ("인선", "인문사회선택"),
    ("자선", "자유선택"),
    ("공필", "공통필수"),
];

pub fn canonical_name_for_alias(alias: &str) -> Option<&'static str> {
    CATEGORY_ALIASES
        .iter()
        .find(|(a, _)| *a == alias)
        .map(|(_, name)| *name)
}

/// Lookup tables built from one category catalog fetch.
#[derive(Debug, Default, Clone)]
pub struct CategoryResolver {
    name_to_id: HashMap<String, String>,
    id_to_name: HashMap<String, String>,
}

impl CategoryResolver {
    pub fn new(categories: &[Category]) -> Self {
        let mut name_to_id = HashMap::with_capacity(categories.len());
        let mut id_to_name = HashMap::with_capacity(categories.len());
        for c in categories {
            let id = c.id.trim().to_string();
            let name = c.name.trim().to_string();
            name_to_id.insert(name.clone(), id.clone());
            id_to_name.insert(id, name);
        }
        Self {
            name_to_id,
            id_to_name,
        }
    }

    /// Resolve a label as an id, then a canonical name, then an alias.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        if let Some((id, _)) = self.id_to_name.get_key_value(label) {
            trace!(label, "resolved as category id");
            return Some(id.as_str());
        }
        if let Some(id) = self.name_to_id.get(label) {
            trace!(label, id = %id, "resolved as category name");
            return Some(id.as_str());
        }
        let name = canonical_name_for_alias(label)?;
        let id = self.name_to_id.get(name)?;
        trace!(label, name, id = %id, "resolved as category alias");
        Some(id.as_str())
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.id_to_name.get(id.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}
