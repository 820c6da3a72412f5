//! Values read from the per-target build configuration files.

use crate::layout::ReleaseLayout;
use gplrel_common::Result;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Extract the value of `key` from a configuration file body.
///
/// The first line containing `key` wins. The value is the text after the
/// first `=`, with whitespace and quote characters trimmed.
pub fn config_value(content: &str, key: &str) -> Option<String> {
    let line = content.lines().find(|line| line.contains(key))?;
    let (_, value) = line.split_once('=')?;
    let value = value.split('=').next().unwrap_or_default();
    let value = value
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Collect the distinct values of `key` across every build target.
///
/// Targets without a configuration file, or whose file lacks the key, are
/// skipped with a warning.
pub fn target_values(root: &Path, layout: &ReleaseLayout, key: &str) -> Result<BTreeSet<String>> {
    let target_dir = root.join(&layout.target_dir);
    let mut values = BTreeSet::new();

    if !target_dir.is_dir() {
        warn!("No build targets found under {:?}", target_dir);
        return Ok(values);
    }

    let mut targets: Vec<_> = std::fs::read_dir(&target_dir)?.collect::<std::io::Result<_>>()?;
    targets.sort_by_key(|entry| entry.file_name());

    for target in targets {
        if !target.path().is_dir() {
            continue;
        }
        let config_path = target.path().join(&layout.target_config);
        let content = match std::fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping target {:?}: {}", target.file_name(), e);
                continue;
            }
        };
        match config_value(&content, key) {
            Some(value) => {
                debug!("Target {:?}: {} = {}", target.file_name(), key, value);
                values.insert(value);
            }
            None => warn!("{} not set in {:?}", key, config_path),
        }
    }

    Ok(values)
}
