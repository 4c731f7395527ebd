// src/parse/label.rs

use once_cell::sync::Lazy;
use regex::Regex;

/// Tag of the HSE "core" type, also used by the matcher's fallback.
pub const CORE_TAG: &str = "핵심";

static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\((.*)\)$").unwrap());

/// First character of an abbreviation → group tag.
static GROUP_TAGS: &[(char, &str)] = &[('사', "사회"), ('인', "인문"), ('문', "문학예술")];

/// First character of an abbreviation → type tag.
static TYPE_TAGS: &[(char, &str)] = &[('일', "일반"), ('융', "융합"), ('핵', CORE_TAG)];

/// A category label split into its base name and the tags its abbreviation encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel {
    pub base: String,
    pub tags: Vec<String>,
}

fn first_tag(inside: &str, table: &[(char, &'static str)]) -> Option<&'static str> {
    inside
        .chars()
        .find_map(|c| table.iter().find(|(k, _)| *k == c).map(|(_, tag)| *tag))
}

/// `"인선(사일)"` → base `인선`, tags `[사회, 일반]`; `"교필"` → base `교필`, no tags.
pub fn parse_category_label(label: &str) -> CategoryLabel {
    let label = label.trim();
    let (base, inside) = match PAREN_RE.captures(label) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()).trim(),
            caps.get(2).map_or("", |m| m.as_str()).trim(),
        ),
        None => (label, ""),
    };

    let mut tags = Vec::with_capacity(2);
    if !inside.is_empty() {
        if let Some(group) = first_tag(inside, GROUP_TAGS) {
            tags.push(group.to_string());
        }
        if let Some(kind) = first_tag(inside, TYPE_TAGS) {
            tags.push(kind.to_string());
        }
    }

    CategoryLabel {
        base: base.to_string(),
        tags,
    }
}
