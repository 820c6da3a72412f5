//! Keep-list of vendor tarballs still referenced by the build.

use crate::fuzzy::find_tarball;
use crate::layout::ReleaseLayout;
use crate::manifest::ManifestEntry;
use crate::target_config::target_values;
use gplrel_common::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// A package the manifest expects but no tarball matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingTarball {
    pub package_name: String,
    pub version: String,
}

/// Tarball names that must survive pruning.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeepList {
    names: BTreeSet<String>,
    /// Expected tarballs that were not found.
    pub missing: Vec<MissingTarball>,
}

impl KeepList {
    /// Build the keep-list from manifest entries and the toolchains of every
    /// build target.
    pub fn build(
        entries: &[ManifestEntry],
        tarball_dir: &Path,
        toolchains: &BTreeSet<String>,
    ) -> Result<Self> {
        let mut keep = KeepList::default();

        for entry in entries.iter().filter(|e| !e.proprietary) {
            if let Some(source) = &entry.source_name {
                debug!("Keeping {} (declared source)", source);
                keep.names.insert(source.clone());
                continue;
            }
            match find_tarball(tarball_dir, &entry.package_name, &entry.version)? {
                Some(name) => {
                    debug!("Keeping {} for {} {}", name, entry.package_name, entry.version);
                    keep.names.insert(name);
                }
                None => {
                    warn!(
                        "No tarball found for {} {}",
                        entry.package_name, entry.version
                    );
                    keep.missing.push(MissingTarball {
                        package_name: entry.package_name.clone(),
                        version: entry.version.clone(),
                    });
                }
            }
        }

        for toolchain in toolchains {
            match find_tarball(tarball_dir, toolchain, "")? {
                Some(name) => {
                    debug!("Keeping {} for toolchain {}", name, toolchain);
                    keep.names.insert(name);
                }
                None => warn!("No tarball found for toolchain {}", toolchain),
            }
        }

        Ok(keep)
    }

    /// Build the keep-list for a tree, reading toolchains from its targets.
    pub fn for_tree(
        entries: &[ManifestEntry],
        root: &Path,
        tarball_dir: &Path,
        layout: &ReleaseLayout,
    ) -> Result<Self> {
        let toolchains = target_values(root, layout, &layout.toolchain_key)?;
        Self::build(entries, tarball_dir, &toolchains)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
