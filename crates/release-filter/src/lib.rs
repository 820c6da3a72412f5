//! Preparation of publicly releasable firmware source archives.
//!
//! The pipeline strips proprietary material from a firmware tree, prunes
//! vendor tarballs and chipcode revisions no build target references, and
//! packages what remains.

pub mod archive;
pub mod chipcode;
pub mod fetch;
pub mod fuzzy;
pub mod keeplist;
pub mod layout;
pub mod manifest;
pub mod options;
pub mod pipeline;
pub mod plan;
pub mod prune;
pub mod runner;
pub mod strip;
pub mod target_config;

pub use layout::ReleaseLayout;
pub use options::{ArchiveFormat, Mode, ReleaseOptions};
pub use pipeline::{run_release, ReleaseOutcome};
pub use runner::{CommandRunner, SystemRunner};
