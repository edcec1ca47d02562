//! Path discovery
//!
//! Walks root directories read-only and collects either plain files whose
//! names end with one of a set of suffixes, or database-style container
//! directories whose names end with a container suffix.
//!
//! # Design
//!
//! - Entries are visited sorted by file name, so a fixed snapshot always
//!   yields the same order
//! - Symlinks are not followed
//! - Unreadable entries are logged and skipped; a missing root yields nothing

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::types::DiscoveredItem;

/// A matched container directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub path: PathBuf,
    /// Parent path segment, used as the container's logical name
    pub name: String,
}

/// Literal, case-sensitive suffix test on a file name.
pub fn matches_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

fn walker(root: &Path) -> Option<walkdir::IntoIter> {
    if !root.exists() {
        warn!(root = %root.display(), "Root directory does not exist");
        return None;
    }
    Some(WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter())
}

fn is_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

/// Every non-directory entry under `roots` whose name ends with a suffix.
pub fn discover_files(roots: &[PathBuf], suffixes: &[String]) -> Vec<DiscoveredItem> {
    let mut items = Vec::new();

    for root in roots {
        let Some(walk) = walker(root) else {
            continue;
        };
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            if is_directory(&entry) {
                continue;
            }
            if matches_suffix(&entry_name(&entry), suffixes) {
                items.push(DiscoveredItem::file(entry.into_path()));
            }
        }
    }

    debug!(count = items.len(), "Discovered files");
    items
}

/// Directories under `roots` whose names end with `suffix`. Matched
/// containers are not descended into.
pub fn discover_containers(roots: &[PathBuf], suffix: &str) -> Vec<Container> {
    let mut containers = Vec::new();

    for root in roots {
        let Some(mut walk) = walker(root) else {
            continue;
        };
        while let Some(entry) = walk.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            if !is_directory(&entry) || !entry_name(&entry).ends_with(suffix) {
                continue;
            }

            let name = container_name(entry.path());
            containers.push(Container {
                path: entry.path().to_path_buf(),
                name,
            });
            if entry.file_type().is_dir() {
                walk.skip_current_dir();
            }
        }
    }

    debug!(count = containers.len(), "Discovered containers");
    containers
}

fn container_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn suffixes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_suffix_match_is_literal() {
        let list = suffixes(&[".JPEG", "gif"]);
        assert!(matches_suffix("a.JPEG", &list));
        assert!(!matches_suffix("a.jpeg", &list));
        assert!(matches_suffix("a.gif", &list));
        assert!(matches_suffix("agif", &list));
    }

    #[test]
    fn test_discover_files_sorted_and_recursive() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b/two.csv");
        touch(temp.path(), "a/one.csv");
        touch(temp.path(), "a/skip.txt");
        touch(temp.path(), "zero.xlsx");

        let items = discover_files(
            &[temp.path().to_path_buf()],
            &suffixes(&[".csv", ".xlsx"]),
        );
        let names: Vec<String> = items
            .iter()
            .map(|i| i.path().strip_prefix(temp.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                Path::new("a").join("one.csv").display().to_string(),
                Path::new("b").join("two.csv").display().to_string(),
                "zero.xlsx".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(discover_files(&[missing.clone()], &suffixes(&[".csv"])).is_empty());
        assert!(discover_containers(&[missing], "gdb").is_empty());
    }

    #[test]
    fn test_multiple_roots_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(second.path(), "x.csv");
        touch(first.path(), "y.csv");

        let items = discover_files(
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            &suffixes(&[".csv"]),
        );
        assert_eq!(items.len(), 2);
        assert!(items[0].path().starts_with(first.path()));
        assert!(items[1].path().starts_with(second.path()));
    }

    #[test]
    fn test_discover_containers_names_and_no_descent() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Turtles_Survey/nesting.gdb/a00000001.gdbtable");
        touch(temp.path(), "Turtles_Survey/nesting.gdb/inner.gdb/x");
        touch(temp.path(), "other/notes.gdb.txt");

        let containers = discover_containers(&[temp.path().to_path_buf()], "gdb");
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name, "Turtles_Survey");
        assert!(containers[0].path.ends_with("nesting.gdb"));
    }

    #[test]
    fn test_directories_never_match_file_discovery() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("folder.csv")).unwrap();
        assert!(discover_files(&[temp.path().to_path_buf()], &suffixes(&[".csv"])).is_empty());
    }
}
