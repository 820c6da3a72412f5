//! Chip-vendor code tree reconciliation.
//!
//! Only chipcode revisions referenced by some build target may ship, and of
//! those only the allow-listed sub-directories.

use crate::layout::ReleaseLayout;
use crate::plan::DeletionPlan;
use crate::prune::plan_prune;
use crate::target_config::target_values;
use gplrel_common::Result;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Plan the chipcode pruning for a given set of referenced versions.
pub fn plan_chipcode_versions(
    chipcode_dir: &Path,
    versions: &BTreeSet<String>,
    keep_subdirs: &[String],
    plan: &mut DeletionPlan,
) -> Result<usize> {
    if !chipcode_dir.is_dir() {
        warn!("Chipcode tree {:?} not found, skipping", chipcode_dir);
        return Ok(0);
    }

    let mut planned = plan_prune(
        chipcode_dir,
        |name| versions.contains(name),
        "chipcode",
        plan,
    )?;

    for version in versions {
        let version_dir = chipcode_dir.join(version);
        if !version_dir.is_dir() {
            warn!("Referenced chipcode version {} is not in {:?}", version, chipcode_dir);
            continue;
        }
        debug!("Trimming {} to {:?}", version_dir.display(), keep_subdirs);
        planned += plan_prune(
            &version_dir,
            |name| keep_subdirs.iter().any(|k| k == name),
            "chipcode",
            plan,
        )?;
    }

    Ok(planned)
}

/// Plan the chipcode pruning for a tree, reading versions from its targets.
pub fn plan_chipcode(
    root: &Path,
    chipcode_dir: &Path,
    layout: &ReleaseLayout,
    plan: &mut DeletionPlan,
) -> Result<usize> {
    let versions = target_values(root, layout, &layout.chipcode_key)?;
    info!(
        "Referenced chipcode versions: {}",
        versions.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    plan_chipcode_versions(chipcode_dir, &versions, &layout.chipcode_keep, plan)
}
