//! Retrieval of the tree, the scripts checkout and the tarball mirror.

use crate::options::{Mode, ReleaseOptions, TreePaths};
use crate::runner::{CommandRunner, ExternalCommand};
use gplrel_common::Result;
use std::path::Path;
use tracing::info;

/// The commands that populate the tree, in execution order.
pub fn fetch_commands(options: &ReleaseOptions, paths: &TreePaths, cwd: &Path) -> Vec<ExternalCommand> {
    let quiet = if options.verbose { "" } else { "--quiet" };
    let layout = &options.layout;
    let mut commands = Vec::new();

    if let Mode::Download { tag, .. } = &options.mode {
        commands.push(
            ExternalCommand::new("git", cwd)
                .arg("clone")
                .opt_arg(quiet)
                .arg("-b")
                .arg(tag.as_str())
                .arg("--recursive")
                .arg(layout.source_repo.as_str())
                .arg(paths.release_name.as_str()),
        );
    }

    commands.push(
        ExternalCommand::new("git", &paths.root)
            .arg("clone")
            .opt_arg(quiet)
            .arg(layout.scripts_repo.as_str())
            .arg(layout.scripts_dir.as_str()),
    );

    commands.push(
        ExternalCommand::new("rsync", &paths.tarballs)
            .arg("-av")
            .arg("--progress")
            .arg(layout.tarball_mirror.as_str())
            .arg("."),
    );

    commands
}

/// Populate the tree: clone (download mode), scripts, tarball mirror.
pub fn fetch_sources(
    options: &ReleaseOptions,
    paths: &TreePaths,
    cwd: &Path,
    runner: &dyn CommandRunner,
) -> Result<()> {
    for command in fetch_commands(options, paths, cwd) {
        // The tarball directory does not exist in a fresh checkout.
        std::fs::create_dir_all(&command.cwd)?;
        info!("Entering {}", command.cwd.display());
        runner.run(&command)?;
    }
    Ok(())
}
