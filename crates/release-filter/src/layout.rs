//! Fixed names of the release workflow.
//!
//! Every name the pipeline relies on (remote locations, sub-directories,
//! configuration keys, allow-lists) is collected in [`ReleaseLayout`]. The
//! defaults describe the firmware tree as it is laid out today; a JSON file
//! can override any subset of them.

use gplrel_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names and locations used while preparing a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseLayout {
    /// Firmware source repository cloned in download mode.
    pub source_repo: String,
    /// Auxiliary build-scripts repository cloned into the tree.
    pub scripts_repo: String,
    /// rsync location of the vendor tarball mirror.
    pub tarball_mirror: String,
    /// Prefix of the release name in download mode.
    pub release_prefix: String,

    /// Directory (relative to the tree) holding the vendor tarballs.
    pub tarball_dir: String,
    /// Directory (relative to the tree) the scripts repository is cloned into.
    pub scripts_dir: String,
    /// Chip-vendor code tree, relative to the tree.
    pub chipcode_dir: String,
    /// Directory holding one sub-directory per build target.
    pub target_dir: String,
    /// Per-target configuration file name.
    pub target_config: String,

    /// Key of the chip-vendor version in the target configuration.
    pub chipcode_key: String,
    /// Key of the toolchain package in the target configuration.
    pub toolchain_key: String,
    /// Sub-directories of a retained chipcode version that may ship.
    pub chipcode_keep: Vec<String>,

    /// Entries of the scripts checkout that may ship.
    pub scripts_keep: Vec<String>,
    /// Top-level proprietary directories removed outright.
    pub proprietary_dirs: Vec<String>,
    /// Name prefix of version-control metadata.
    pub vcs_prefix: String,
    /// Directories whose documentation files are removed.
    pub doc_dirs: Vec<String>,
    /// Documentation files removed from `doc_dirs`.
    pub doc_files: Vec<String>,

    /// Container configuration inside the scripts checkout.
    pub docker_config: String,
    /// Line substituted for every line mentioning `dns`.
    pub dns_line: String,
}

impl Default for ReleaseLayout {
    fn default() -> Self {
        Self {
            source_repo: "git@git-xxx.co.jp:xxx/xxx.git".to_string(),
            scripts_repo: "git@git-xxx.co.jp:xxx/xxx_scripts.git".to_string(),
            tarball_mirror: "rsync://xxx.yyy.zzz.co.jp:/tarballs".to_string(),
            release_prefix: "xxx-gpl-release".to_string(),
            tarball_dir: "tarballs".to_string(),
            scripts_dir: "xxx_scripts".to_string(),
            chipcode_dir: "xxx/chipcode".to_string(),
            target_dir: "buildap/target".to_string(),
            target_config: "xxx_config.py".to_string(),
            chipcode_key: "xxx_chipcode_ver".to_string(),
            toolchain_key: "toolchain_pack".to_string(),
            chipcode_keep: strings(&["codexxxxx"]),
            scripts_keep: strings(&[
                "buildap",
                "buildap.py",
                "buildap_docker.py",
                "helpers.py",
                "docker_user_remap",
                "docker_config.py",
            ]),
            proprietary_dirs: strings(&["xxxprop", "xxxagent"]),
            vcs_prefix: ".git".to_string(),
            doc_dirs: strings(&["xxx-tools", "buildap", "docker"]),
            doc_files: strings(&["README.md", "Readme.txt"]),
            docker_config: "docker_config.py".to_string(),
            dns_line: "dns=['8.8.8.8','8.8.4.4']".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ReleaseLayout {
    /// Load a layout override file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let layout: ReleaseLayout = serde_json::from_str(&content)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Reject layouts that would make pruning meaningless or unsafe.
    pub fn validate(&self) -> Result<()> {
        let relative = [
            ("tarball_dir", &self.tarball_dir),
            ("scripts_dir", &self.scripts_dir),
            ("chipcode_dir", &self.chipcode_dir),
            ("target_dir", &self.target_dir),
        ];
        for (field, value) in relative {
            if value.is_empty() {
                return Err(Error::Layout(format!("{} must not be empty", field)));
            }
            if Path::new(value).is_absolute() {
                return Err(Error::Layout(format!(
                    "{} must be relative to the tree, got {}",
                    field, value
                )));
            }
        }
        if self.vcs_prefix.is_empty() {
            return Err(Error::Layout("vcs_prefix must not be empty".to_string()));
        }
        if self.chipcode_key.is_empty() || self.toolchain_key.is_empty() {
            return Err(Error::Layout(
                "configuration keys must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
