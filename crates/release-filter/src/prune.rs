//! Directory pruning against a keep-list.

use crate::plan::{DeletionPlan, EntryKind};
use gplrel_common::Result;
use std::path::Path;

/// Plan removal of every direct child of `dir` whose name `keep` rejects.
///
/// Returns the number of newly planned entries.
pub fn plan_prune<F>(dir: &Path, keep: F, reason: &str, plan: &mut DeletionPlan) -> Result<usize>
where
    F: Fn(&str) -> bool,
{
    let mut children = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !keep(&name) {
            children.push(entry.path());
        }
    }
    children.sort();

    let mut planned = 0;
    for path in children {
        let kind = EntryKind::of(&path)?;
        if plan.push(path, kind, reason) {
            planned += 1;
        }
    }
    Ok(planned)
}
