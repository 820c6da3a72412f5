//! The release preparation pipeline.

use crate::archive::create_archive;
use crate::chipcode::plan_chipcode;
use crate::fetch::fetch_sources;
use crate::keeplist::KeepList;
use crate::manifest::read_manifest;
use crate::options::{ReleaseOptions, TreePaths};
use crate::plan::DeletionPlan;
use crate::prune::plan_prune;
use crate::runner::CommandRunner;
use crate::strip::{
    edit_docker_config, plan_proprietary_dirs, plan_scripts, plan_sensitive_docs,
    plan_vcs_metadata,
};
use gplrel_common::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a run did, or would do in a dry run.
#[derive(Debug, Serialize)]
pub struct ReleaseOutcome {
    pub release_name: String,
    pub root: PathBuf,
    pub keep: KeepList,
    pub plan: DeletionPlan,
    /// Entries actually removed; zero in a dry run.
    pub removed: usize,
    pub dns_lines_rewritten: usize,
    pub archive: Option<PathBuf>,
}

/// Build the full deletion plan for a populated tree.
pub fn plan_release(options: &ReleaseOptions, paths: &TreePaths, cwd: &Path) -> Result<(KeepList, DeletionPlan)> {
    let layout = &options.layout;

    // The manifest is read before anything is planned so that a manifest
    // failure leaves the tree untouched.
    let manifest = if options.manifest.is_absolute() {
        options.manifest.clone()
    } else {
        cwd.join(&options.manifest)
    };
    let entries = read_manifest(&manifest)?;
    debug!("Read {} manifest entries from {}", entries.len(), manifest.display());

    let mut plan = DeletionPlan::new();

    let n = plan_scripts(&paths.scripts, layout, &mut plan)?;
    debug!("scripts: {} entries", n);

    let n = plan_proprietary_dirs(&paths.root, layout, &mut plan)?;
    debug!("proprietary: {} entries", n);

    let n = plan_vcs_metadata(&paths.root, &layout.vcs_prefix, &mut plan)?;
    debug!("vcs: {} entries", n);

    let n = plan_sensitive_docs(&paths.root, layout, &mut plan)?;
    debug!("docs: {} entries", n);

    info!("Removing files from {}", paths.chipcode.display());
    let n = plan_chipcode(&paths.root, &paths.chipcode, layout, &mut plan)?;
    debug!("chipcode: {} entries", n);

    info!("Removing files from {}", paths.tarballs.display());
    let keep = KeepList::for_tree(&entries, &paths.root, &paths.tarballs, layout)?;
    let n = plan_prune(&paths.tarballs, |name| keep.contains(name), "tarball", &mut plan)?;
    debug!("tarballs: {} entries, {} kept", n, keep.len());

    Ok((keep, plan))
}

/// Run the pipeline: fetch, plan, and unless dry-running, apply and archive.
pub fn run_release(
    options: &ReleaseOptions,
    cwd: &Path,
    runner: &dyn CommandRunner,
) -> Result<ReleaseOutcome> {
    let paths = options.tree_paths(cwd)?;
    info!("Preparing release {}", paths.release_name);

    if options.fetch {
        fetch_sources(options, &paths, cwd, runner)?;
    }

    let (keep, plan) = plan_release(options, &paths, cwd)?;

    let mut outcome = ReleaseOutcome {
        release_name: paths.release_name.clone(),
        root: paths.root.clone(),
        keep,
        plan,
        removed: 0,
        dns_lines_rewritten: 0,
        archive: None,
    };

    if options.dry_run {
        info!("Dry run: {} entries would be removed", outcome.plan.len());
        return Ok(outcome);
    }

    outcome.removed = outcome.plan.verify_and_apply()?;
    info!("Removed {} entries", outcome.removed);

    outcome.dns_lines_rewritten = edit_docker_config(&paths.scripts, &options.layout)?;

    let archive = create_archive(&paths, options.archive_format, options.verbose, runner)?;
    outcome.archive = Some(archive);

    if options.removes_tree() {
        info!("Removing {}", paths.root.display());
        std::fs::remove_dir_all(&paths.root)?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ReleaseLayout;
    use crate::options::{ArchiveFormat, Mode};
    use crate::runner::ExternalCommand;
    use gplrel_common::Error;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl CommandRunner for Recorder {
        fn run(&self, command: &ExternalCommand) -> Result<()> {
            self.0.borrow_mut().push(command.to_string());
            Ok(())
        }
    }

    fn touch(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn populate(root: &Path) {
        touch(&root.join(".git/HEAD"), "");
        touch(&root.join("xxxprop/blob.bin"), "");
        touch(&root.join("buildap/README.md"), "");
        touch(
            &root.join("buildap/target/wx/xxx_config.py"),
            "xxx_chipcode_ver='v2'\ntoolchain_pack='gcc-arm'\n",
        );
        touch(&root.join("xxx/chipcode/v1/codexxxxx/a.c"), "");
        touch(&root.join("xxx/chipcode/v2/codexxxxx/b.c"), "");
        touch(&root.join("xxx/chipcode/v2/private/c.c"), "");
        touch(&root.join("xxx_scripts/buildap.py"), "");
        touch(&root.join("xxx_scripts/release_notes.txt"), "");
        touch(&root.join("xxx_scripts/docker_config.py"), "dns=['10.1.1.1']\n");
        touch(&root.join("tarballs/busybox-1.36.1.tar.bz2"), "");
        touch(&root.join("tarballs/gcc-arm-10.3.tar.xz"), "");
        touch(&root.join("tarballs/agent-2.0.tar.gz"), "");
        touch(&root.join("tarballs/stale-0.1.tar.gz"), "");
    }

    fn local_options(base: &Path, dry_run: bool) -> ReleaseOptions {
        ReleaseOptions {
            mode: Mode::Local {
                src: base.join("fw-tree"),
            },
            dest: base.join("out"),
            manifest: base.join("package-full-list"),
            verbose: false,
            dry_run,
            fetch: true,
            archive_format: ArchiveFormat::Gz,
            layout: ReleaseLayout::default(),
        }
    }

    #[test]
    fn test_local_release_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("fw-tree");
        populate(&root);
        std::fs::write(
            dir.path().join("package-full-list"),
            "\nbusybox\n1.36.1\n0\n\nagent\n2.0\n1\n",
        )
        .unwrap();

        let runner = Recorder::default();
        let outcome = run_release(&local_options(dir.path(), false), dir.path(), &runner).unwrap();

        assert_eq!(runner.0.borrow().len(), 2, "scripts clone and rsync");
        assert_eq!(outcome.dns_lines_rewritten, 1);
        assert_eq!(
            outcome.archive.as_deref(),
            Some(dir.path().join("out/fw-tree.tar.gz").as_path())
        );

        assert!(!root.join(".git").exists());
        assert!(!root.join("xxxprop").exists());
        assert!(!root.join("buildap/README.md").exists());
        assert!(!root.join("xxx/chipcode/v1").exists());
        assert!(!root.join("xxx/chipcode/v2/private").exists());
        assert!(root.join("xxx/chipcode/v2/codexxxxx/b.c").exists());
        assert!(!root.join("xxx_scripts/release_notes.txt").exists());
        assert!(root.join("tarballs/busybox-1.36.1.tar.bz2").exists());
        assert!(root.join("tarballs/gcc-arm-10.3.tar.xz").exists());
        assert!(!root.join("tarballs/agent-2.0.tar.gz").exists());
        assert!(!root.join("tarballs/stale-0.1.tar.gz").exists());
        assert!(root.exists(), "local mode keeps the tree");
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("fw-tree");
        populate(&root);
        std::fs::write(dir.path().join("package-full-list"), "\nbusybox\n1.36.1\n0\n").unwrap();

        let mut options = local_options(dir.path(), true);
        options.fetch = false;
        let runner = Recorder::default();
        let outcome = run_release(&options, dir.path(), &runner).unwrap();

        assert!(runner.0.borrow().is_empty());
        assert!(outcome.plan.len() >= 7);
        assert_eq!(outcome.removed, 0);
        assert!(outcome.archive.is_none());
        assert!(root.join(".git/HEAD").exists());
        assert!(root.join("tarballs/stale-0.1.tar.gz").exists());
        assert_eq!(
            std::fs::read_to_string(root.join("xxx_scripts/docker_config.py")).unwrap(),
            "dns=['10.1.1.1']\n"
        );
    }

    #[test]
    fn test_missing_manifest_aborts_before_pruning() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("fw-tree");
        populate(&root);

        let runner = Recorder::default();
        let err = run_release(&local_options(dir.path(), false), dir.path(), &runner).unwrap_err();

        assert!(matches!(err, Error::Manifest { .. }));
        assert!(root.join(".git/HEAD").exists());
        assert!(root.join("tarballs/stale-0.1.tar.gz").exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_download_release_removes_tree_after_archiving() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("xxx-gpl-release-m-t");
        populate(&root);
        std::fs::write(dir.path().join("package-full-list"), "\nbusybox\n1.36.1\n0\n").unwrap();

        let options = ReleaseOptions {
            mode: Mode::Download {
                model: "m".to_string(),
                tag: "t".to_string(),
            },
            ..local_options(dir.path(), false)
        };
        let runner = Recorder::default();
        let outcome = run_release(&options, dir.path(), &runner).unwrap();

        let commands = runner.0.borrow();
        assert_eq!(commands.len(), 3);
        assert!(commands[0].starts_with("git clone --quiet -b t --recursive "));

        let archive = dir.path().join("out/xxx-gpl-release-m-t.tar.gz");
        assert_eq!(outcome.archive.as_deref(), Some(archive.as_path()));
        assert!(archive.is_file());
        assert!(dir.path().join("out/xxx-gpl-release-m-t.tar.gz.sha256").is_file());
        assert!(!root.exists(), "download mode removes the cloned tree");
    }
}
