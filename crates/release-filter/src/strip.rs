//! Removal of proprietary and sensitive material from the tree.

use crate::layout::ReleaseLayout;
use crate::plan::{DeletionPlan, EntryKind};
use crate::prune::plan_prune;
use gplrel_common::Result;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Plan removal of the scripts checkout's non-allow-listed entries.
pub fn plan_scripts(scripts_dir: &Path, layout: &ReleaseLayout, plan: &mut DeletionPlan) -> Result<usize> {
    if !scripts_dir.is_dir() {
        warn!("Scripts checkout {:?} not found, skipping", scripts_dir);
        return Ok(0);
    }
    plan_prune(
        scripts_dir,
        |name| layout.scripts_keep.iter().any(|k| k == name),
        "scripts",
        plan,
    )
}

/// Plan removal of the top-level proprietary directories.
pub fn plan_proprietary_dirs(root: &Path, layout: &ReleaseLayout, plan: &mut DeletionPlan) -> Result<usize> {
    let mut planned = 0;
    for name in &layout.proprietary_dirs {
        let path = root.join(name);
        let Ok(meta) = std::fs::symlink_metadata(&path) else {
            continue;
        };
        let kind = if meta.is_dir() { EntryKind::Dir } else { EntryKind::File };
        if plan.push(path, kind, "proprietary") {
            planned += 1;
        }
    }
    Ok(planned)
}

/// Plan removal of version-control metadata anywhere below `root`.
///
/// Any entry whose name starts with `prefix` (`.git`, `.gitignore`,
/// `.gitmodules`, ...) is removed; matched directories are not descended.
pub fn plan_vcs_metadata(root: &Path, prefix: &str, plan: &mut DeletionPlan) -> Result<usize> {
    let mut planned = 0;
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let is_dir = entry.file_type().is_dir();

        if plan.covers(entry.path()) {
            if is_dir {
                walker.skip_current_dir();
            }
            continue;
        }

        if entry.file_name().to_string_lossy().starts_with(prefix) {
            let kind = if is_dir { EntryKind::Dir } else { EntryKind::File };
            if plan.push(entry.path().to_path_buf(), kind, "vcs") {
                planned += 1;
            }
            if is_dir {
                walker.skip_current_dir();
            }
        }
    }

    Ok(planned)
}

/// Plan removal of documentation files from the documented directories.
pub fn plan_sensitive_docs(root: &Path, layout: &ReleaseLayout, plan: &mut DeletionPlan) -> Result<usize> {
    let mut planned = 0;
    for dir in &layout.doc_dirs {
        for file in &layout.doc_files {
            let path = root.join(dir).join(file);
            if path.is_file() && plan.push(path, EntryKind::File, "docs") {
                planned += 1;
            }
        }
    }
    Ok(planned)
}

/// Replace every line mentioning `dns` with `dns_line`.
///
/// Returns the rewritten text and the number of replaced lines.
pub fn rewrite_dns(content: &str, dns_line: &str) -> (String, usize) {
    let mut out = String::with_capacity(content.len());
    let mut replaced = 0;

    for line in content.split_inclusive('\n') {
        if line.contains("dns") {
            out.push_str(dns_line);
            out.push('\n');
            replaced += 1;
        } else {
            out.push_str(line);
        }
    }

    (out, replaced)
}

/// Rewrite the DNS settings of the container configuration in place.
///
/// Returns the number of replaced lines; a missing file is a warning.
pub fn edit_docker_config(scripts_dir: &Path, layout: &ReleaseLayout) -> Result<usize> {
    let path = scripts_dir.join(&layout.docker_config);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{:?} not found, DNS settings left untouched", path);
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let (rewritten, replaced) = rewrite_dns(&content, &layout.dns_line);
    if replaced > 0 {
        std::fs::write(&path, rewritten)?;
        info!("Rewrote {} DNS line(s) in {}", replaced, path.display());
    }
    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_rewrite_dns_lines() {
        let content = "name='build'\ndns=['10.0.0.1']\n# dns servers below\nuser='x'";
        let (out, replaced) = rewrite_dns(content, "dns=['8.8.8.8','8.8.4.4']");
        assert_eq!(replaced, 2);
        assert_eq!(
            out,
            "name='build'\ndns=['8.8.8.8','8.8.4.4']\ndns=['8.8.8.8','8.8.4.4']\nuser='x'"
        );
    }

    #[test]
    fn test_edit_docker_config_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ReleaseLayout::default();
        let path = dir.path().join(&layout.docker_config);
        std::fs::write(&path, "image='fw'\ndns=['192.168.1.1']\n").unwrap();

        assert_eq!(edit_docker_config(dir.path(), &layout).unwrap(), 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "image='fw'\ndns=['8.8.8.8','8.8.4.4']\n"
        );
        assert_eq!(edit_docker_config(&dir.path().join("none"), &layout).unwrap(), 0);
    }

    #[test]
    fn test_vcs_metadata_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join(".git/HEAD"));
        touch(&root.join(".gitmodules"));
        touch(&root.join("pkg/.gitignore"));
        touch(&root.join("pkg/src/.git/config"));
        touch(&root.join("pkg/src/main.c"));
        touch(&root.join("pkg/digit.c"));

        let mut plan = DeletionPlan::new();
        let planned = plan_vcs_metadata(root, ".git", &mut plan).unwrap();
        assert_eq!(planned, 4);

        plan.verify_and_apply().unwrap();
        assert!(!root.join(".git").exists());
        assert!(!root.join(".gitmodules").exists());
        assert!(!root.join("pkg/.gitignore").exists());
        assert!(!root.join("pkg/src/.git").exists());
        assert!(root.join("pkg/src/main.c").exists());
        assert!(root.join("pkg/digit.c").exists());
    }

    #[test]
    fn test_vcs_walk_skips_planned_directories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ReleaseLayout::default();
        touch(&dir.path().join("xxxprop/.git/HEAD"));

        let mut plan = DeletionPlan::new();
        plan_proprietary_dirs(dir.path(), &layout, &mut plan).unwrap();
        let planned = plan_vcs_metadata(dir.path(), ".git", &mut plan).unwrap();

        assert_eq!(planned, 0);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_sensitive_docs_and_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let layout = ReleaseLayout::default();
        touch(&root.join("buildap/README.md"));
        touch(&root.join("docker/Readme.txt"));
        touch(&root.join("docs/README.md"));
        touch(&root.join("xxx_scripts/buildap.py"));
        touch(&root.join("xxx_scripts/internal_deploy.sh"));

        let mut plan = DeletionPlan::new();
        assert_eq!(plan_sensitive_docs(root, &layout, &mut plan).unwrap(), 2);
        assert_eq!(
            plan_scripts(&root.join("xxx_scripts"), &layout, &mut plan).unwrap(),
            1
        );
        plan.verify_and_apply().unwrap();

        assert!(!root.join("buildap/README.md").exists());
        assert!(!root.join("docker/Readme.txt").exists());
        assert!(root.join("docs/README.md").exists());
        assert!(root.join("xxx_scripts/buildap.py").exists());
        assert!(!root.join("xxx_scripts/internal_deploy.sh").exists());
    }
}
