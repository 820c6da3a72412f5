//! Run configuration threaded through the release pipeline.

use crate::layout::ReleaseLayout;
use gplrel_common::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where the source tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Clone the tree at `tag` and remove it after archiving.
    Download { model: String, tag: String },
    /// Use an existing checkout and leave it in place.
    Local { src: PathBuf },
}

/// Compression of the release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[default]
    Xz,
    Gz,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Xz => "tar.xz",
            ArchiveFormat::Gz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Xz => write!(f, "xz"),
            ArchiveFormat::Gz => write!(f, "gz"),
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "xz" => Ok(ArchiveFormat::Xz),
            "gz" | "gzip" => Ok(ArchiveFormat::Gz),
            _ => Err(Error::Other(format!("unsupported archive format: {}", s))),
        }
    }
}

/// Immutable options for one release run.
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    pub mode: Mode,
    /// Directory the archive is written to.
    pub dest: PathBuf,
    /// The package manifest ("package-full-list").
    pub manifest: PathBuf,
    pub verbose: bool,
    /// Only compute and report the deletion plan.
    pub dry_run: bool,
    /// Run the clone and sync commands before filtering.
    pub fetch: bool,
    pub archive_format: ArchiveFormat,
    pub layout: ReleaseLayout,
}

impl ReleaseOptions {
    /// Name of the release directory and archive stem.
    pub fn release_name(&self) -> Result<String> {
        match &self.mode {
            Mode::Local { src } => src
                .components()
                .next_back()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .filter(|name| !matches!(name.as_str(), "" | "/" | "." | ".."))
                .ok_or_else(|| {
                    Error::Other(format!("cannot derive a release name from {}", src.display()))
                }),
            Mode::Download { model, tag } => Ok(format!(
                "{}-{}-{}",
                self.layout.release_prefix,
                model.replace('/', "-"),
                tag.replace('/', "-")
            )),
        }
    }

    /// Resolve the directories of the tree for this run.
    ///
    /// `cwd` is the directory the tool was started from; download mode clones
    /// into it.
    pub fn tree_paths(&self, cwd: &Path) -> Result<TreePaths> {
        let release_name = self.release_name()?;
        let root = match &self.mode {
            Mode::Local { src } => absolute(cwd, src),
            Mode::Download { .. } => cwd.join(&release_name),
        };
        let home = root
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Other(format!("{} has no parent directory", root.display())))?;

        Ok(TreePaths {
            tarballs: root.join(&self.layout.tarball_dir),
            scripts: root.join(&self.layout.scripts_dir),
            chipcode: root.join(&self.layout.chipcode_dir),
            dest: absolute(cwd, &self.dest),
            release_name,
            home,
            root,
        })
    }

    /// Whether the tree is removed once archived.
    pub fn removes_tree(&self) -> bool {
        matches!(self.mode, Mode::Download { .. })
    }
}

/// Absolute directories of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePaths {
    pub release_name: String,
    /// Parent of the tree; the archive is created from here.
    pub home: PathBuf,
    pub root: PathBuf,
    pub tarballs: PathBuf,
    pub scripts: PathBuf,
    pub chipcode: PathBuf,
    pub dest: PathBuf,
}

impl TreePaths {
    pub fn archive_path(&self, format: ArchiveFormat) -> PathBuf {
        self.dest
            .join(format!("{}.{}", self.release_name, format.extension()))
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    // Drop `.` components and trailing separators.
    joined.components().collect()
}
