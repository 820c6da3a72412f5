//! Locating package directories and their Makefiles.

use crate::config::CheckerConfig;
use gplrel_common::{Error, Result};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Name of the build-metadata file.
pub const MAKEFILE: &str = "Makefile";

/// Find the root directory of package `name`, searching from `start`.
///
/// When `start` itself lies inside a directory called `name` the search
/// ends immediately with `start`. Otherwise the first directory (top-down,
/// name order) holding a sub-directory called `name` wins.
pub fn find_package_dir(start: &Path, name: &str, config: &CheckerConfig) -> Result<PathBuf> {
    if start.components().any(|c| c.as_os_str() == name) {
        return Ok(start.to_path_buf());
    }

    let walker = WalkDir::new(start)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, config));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let candidate = entry.path().join(name);
        if candidate.is_dir() {
            debug!("Found {} at {}", name, candidate.display());
            return Ok(candidate);
        }
    }

    Err(Error::PackageNotFound {
        name: name.to_string(),
        start: start.to_path_buf(),
    })
}

/// Excluded build-artifact directories are not descended, unless they sit
/// inside the unpruned subtree.
fn is_pruned(entry: &DirEntry, config: &CheckerConfig) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if !config.exclude_dirs.iter().any(|d| *d == name) {
        return false;
    }
    let in_subtree = entry.path().parent().is_some_and(|parent| {
        parent
            .components()
            .any(|c| c.as_os_str() == config.unpruned_subtree.as_str())
    });
    !in_subtree
}

/// Every `Makefile` below `root`: files before sub-directories at each
/// level, then by name.
pub fn find_makefiles(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by(files_first)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_name() == MAKEFILE && entry.path().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
