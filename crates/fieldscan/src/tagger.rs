//! Vocabulary tagging from paths and file names
//!
//! A term matches when its normalized form (lowercase, spaces as `_`) is a
//! substring of any haystack token with spaces replaced by `_`. Terms are
//! tried in declaration order and the first hit wins, so the result never
//! depends on token order.

use std::path::{Component, Path};

fn normalize_term(term: &str) -> String {
    term.to_lowercase().replace(' ', "_")
}

/// First vocabulary term that matches any token, or `None`.
pub fn find_match<'v, S: AsRef<str>>(vocabulary: &'v [String], haystack: &[S]) -> Option<&'v str> {
    let tokens: Vec<String> = haystack
        .iter()
        .map(|token| token.as_ref().replace(' ', "_"))
        .collect();

    vocabulary
        .iter()
        .find(|term| {
            let needle = normalize_term(term);
            tokens.iter().any(|token| token.contains(&needle))
        })
        .map(String::as_str)
}

/// Lowercased path segments, used as the haystack for path tags.
pub fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_lowercase()),
            _ => None,
        })
        .collect()
}

/// Subject and activity tags derived from a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTags {
    pub subject: Option<String>,
    pub activity: Option<String>,
}

pub fn path_tags(path: &Path, subjects: &[String], activities: &[String]) -> PathTags {
    let segments = path_segments(path);
    PathTags {
        subject: find_match(subjects, &segments).map(str::to_string),
        activity: find_match(activities, &segments).map(str::to_string),
    }
}

/// File stem split on `-` and `_`, joined by `, `.
pub fn filename_tokens(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.replace('-', "_").split('_').collect::<Vec<_>>().join(", ")
}

/// First two `_`-separated tokens of a layer name, absent for short names.
pub fn first_word(layer: &str) -> Option<String> {
    let mut parts = layer.split('_');
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => Some(format!("{}_{}", first, second)),
        _ => None,
    }
}
