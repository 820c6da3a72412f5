//! Release archive creation.

use crate::options::{ArchiveFormat, TreePaths};
use crate::runner::{CommandRunner, ExternalCommand};
use flate2::write::GzEncoder;
use flate2::Compression;
use gplrel_common::hash::write_checksum_file;
use gplrel_common::Result;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::info;

/// Archive the tree as `<dest>/<release name>.<ext>` and write its checksum.
///
/// The archive holds a single top-level directory named after the release.
pub fn create_archive(
    paths: &TreePaths,
    format: ArchiveFormat,
    verbose: bool,
    runner: &dyn CommandRunner,
) -> Result<PathBuf> {
    std::fs::create_dir_all(&paths.dest)?;
    let archive = paths.archive_path(format);

    match format {
        ArchiveFormat::Xz => {
            let command = ExternalCommand::new("tar", &paths.home)
                .opt_arg(if verbose { "-v" } else { "" })
                .arg("-cJf")
                .arg(archive.to_string_lossy())
                .arg(paths.release_name.as_str());
            runner.run(&command)?;
        }
        ArchiveFormat::Gz => write_tar_gz(&paths.root, &paths.release_name, &archive)?,
    }

    let checksum = write_checksum_file(&archive)?;
    info!("Archive written to {}", archive.display());
    info!("Checksum written to {}", checksum.display());

    Ok(archive)
}

/// Write `root` as `<prefix>/...` into a gzip-compressed tarball.
pub fn write_tar_gz(root: &Path, prefix: &str, archive: &Path) -> Result<()> {
    let file = File::create(archive)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    builder.append_dir_all(prefix, root)?;
    builder.into_inner()?.finish()?;
    Ok(())
}
