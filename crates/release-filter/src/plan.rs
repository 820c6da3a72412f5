//! Staged filesystem deletions.
//!
//! Pruning steps only record what they would remove in a [`DeletionPlan`].
//! The plan is then either reported (dry run) or verified and applied in
//! recording order.

use gplrel_common::{Error, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a planned path is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    /// Kind of the entry at `path`, without following symlinks.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::symlink_metadata(path)?;
        Ok(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }
}

/// One entry scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRemoval {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// The pruning step that scheduled it.
    pub reason: String,
}

/// Ordered set of removals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionPlan {
    removals: Vec<PlannedRemoval>,
}

impl DeletionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `path` for removal.
    ///
    /// Returns `false` when the path is already covered by a planned
    /// directory. Planning a directory drops planned entries beneath it.
    pub fn push(&mut self, path: PathBuf, kind: EntryKind, reason: &str) -> bool {
        if self.covers(&path) {
            return false;
        }
        if kind == EntryKind::Dir {
            self.removals.retain(|r| !r.path.starts_with(&path));
        }
        self.removals.push(PlannedRemoval {
            path,
            kind,
            reason: reason.to_string(),
        });
        true
    }

    /// Whether `path` is planned, or lies below a planned directory.
    pub fn covers(&self, path: &Path) -> bool {
        self.removals
            .iter()
            .any(|r| path == r.path || (r.kind == EntryKind::Dir && path.starts_with(&r.path)))
    }

    pub fn removals(&self) -> &[PlannedRemoval] {
        &self.removals
    }

    pub fn len(&self) -> usize {
        self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }

    /// Check that every planned path still exists.
    pub fn verify(&self) -> Result<()> {
        for removal in &self.removals {
            if std::fs::symlink_metadata(&removal.path).is_err() {
                return Err(Error::PlanDrift(removal.path.clone()));
            }
        }
        Ok(())
    }

    /// Remove every planned entry, in order.
    pub fn apply(&self) -> Result<usize> {
        for removal in &self.removals {
            debug!("Removing {}", removal.path.display());
            match removal.kind {
                EntryKind::Dir => std::fs::remove_dir_all(&removal.path)?,
                EntryKind::File => std::fs::remove_file(&removal.path)?,
            }
        }
        Ok(self.removals.len())
    }

    /// Verify, then apply.
    pub fn verify_and_apply(&self) -> Result<usize> {
        self.verify()?;
        self.apply()
    }

    /// Human-readable listing, paths shown relative to `base`.
    pub fn render_text(&self, base: &Path) -> String {
        let mut out = String::new();
        for removal in &self.removals {
            let shown = removal.path.strip_prefix(base).unwrap_or(&removal.path);
            let marker = match removal.kind {
                EntryKind::Dir => "/",
                EntryKind::File => "",
            };
            let _ = writeln!(out, "{:<12} {}{}", removal.reason, shown.display(), marker);
        }
        out
    }
}
