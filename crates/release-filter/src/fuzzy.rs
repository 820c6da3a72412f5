//! Fuzzy tarball lookup.
//!
//! A package is matched to its tarball by name and version, tolerating any
//! single non-word character (or `_`) between the two: `busybox-1.36.1.tar.bz2`,
//! `busybox_1.36.1.tgz` and `busybox.1.36.1.zip` all match `busybox` `1.36.1`.

use gplrel_common::Result;
use regex::Regex;
use std::path::Path;

/// Build the anchored filename pattern for `name` and `version`.
///
/// Both parts are escaped, so names such as `c++` or `1.0+` match literally.
pub fn tarball_pattern(name: &str, version: &str) -> Regex {
    let pattern = format!(
        r"^{}(?:_|\W){}",
        regex::escape(name),
        regex::escape(version)
    );
    // Both parts are escaped; the surrounding syntax is fixed.
    Regex::new(&pattern).expect("escaped tarball pattern is valid")
}

/// Find the first file (or link to one) in `dir` (by file name) matching the pattern.
pub fn find_tarball(dir: &Path, name: &str, version: &str) -> Result<Option<String>> {
    let pattern = tarball_pattern(name, version);

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        // Mirrored tarballs may be symlinks.
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();

    Ok(names.into_iter().find(|file| pattern.is_match(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_variants() {
        let pattern = tarball_pattern("busybox", "1.36.1");
        assert!(pattern.is_match("busybox-1.36.1.tar.bz2"));
        assert!(pattern.is_match("busybox_1.36.1.tgz"));
        assert!(pattern.is_match("busybox.1.36.1.zip"));
        assert!(!pattern.is_match("busybox1.36.1.tar.bz2"));
        assert!(!pattern.is_match("mybusybox-1.36.1.tar.bz2"));
        assert!(!pattern.is_match("busybox-1.35.0.tar.bz2"));
    }

    #[test]
    fn test_metacharacters_match_literally() {
        let pattern = tarball_pattern("c++", "1.0+");
        assert!(pattern.is_match("c++-1.0+.tar.gz"));
        assert!(!pattern.is_match("cc-1.0.tar.gz"));
        assert!(!pattern.is_match("c+-1.00.tar.gz"));

        let pattern = tarball_pattern("lib.x", "2.0");
        assert!(pattern.is_match("lib.x-2.0.tar.gz"));
        assert!(!pattern.is_match("libzx-2.0.tar.gz"));
        assert!(!pattern.is_match("lib.x-2a0.tar.gz"));
    }

    #[test]
    fn test_empty_version_matches_name_and_separator() {
        let pattern = tarball_pattern("gcc-arm", "");
        assert!(pattern.is_match("gcc-arm-10.3.tar.xz"));
        assert!(!pattern.is_match("gcc-armhf.tar.xz"));
    }

    #[test]
    fn test_find_tarball_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("zlib-1.3")).unwrap();
        std::fs::write(dir.path().join("zlib-1.3.tar.gz"), "").unwrap();
        std::fs::write(dir.path().join("zlib_1.3.tar.xz"), "").unwrap();
        std::fs::write(dir.path().join("openssl-3.0.tar.gz"), "").unwrap();

        let found = find_tarball(dir.path(), "zlib", "1.3").unwrap();
        assert_eq!(found.as_deref(), Some("zlib-1.3.tar.gz"));
        assert_eq!(find_tarball(dir.path(), "zlib", "1.2").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_tarball_follows_symlinks() {
        let mirror = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = mirror.path().join("zlib-1.3.tar.gz");
        std::fs::write(&target, "").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("zlib-1.3.tar.gz")).unwrap();
        std::os::unix::fs::symlink(
            mirror.path().join("gone-1.0.tar.gz"),
            dir.path().join("gone-1.0.tar.gz"),
        )
        .unwrap();

        let found = find_tarball(dir.path(), "zlib", "1.3").unwrap();
        assert_eq!(found.as_deref(), Some("zlib-1.3.tar.gz"));
        assert_eq!(find_tarball(dir.path(), "gone", "1.0").unwrap(), None);
    }
}
