//! Makefile tokenizer for the license metadata.
//!
//! Only three markers matter: `PKG_PROPRIETARY`, `PKG_LICENSE:=` and
//! `PKG_LICENSE_FILES:=`. Each logical line (backslash continuations joined)
//! is turned into zero or more [`Directive`]s, and directives from every
//! Makefile of a package are folded into one [`LicenseMetadata`], later
//! assignments replacing earlier ones.

use crate::locate::MAKEFILE;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

const PROPRIETARY_MARKER: &str = "PKG_PROPRIETARY";
const LICENSE_MARKER: &str = "PKG_LICENSE:=";
const LICENSE_FILES_MARKER: &str = "PKG_LICENSE_FILES:=";

/// A license value whose first token names a GPL or LGPL license.
static GPL_VALUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*L?GPL").unwrap());

/// One recognised statement of a Makefile line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Proprietary,
    License { tokens: Vec<String>, mentions_gpl: bool },
    LicenseFiles { tokens: Vec<String> },
}

/// Join backslash-continued lines.
pub fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();

    for line in content.lines() {
        match line.trim_end().strip_suffix('\\') {
            Some(head) => {
                pending.push_str(head);
                pending.push(' ');
            }
            None => {
                pending.push_str(line);
                lines.push(std::mem::take(&mut pending));
            }
        }
    }
    if !pending.is_empty() {
        lines.push(pending);
    }

    lines
}

/// Tokenize one logical line.
pub fn scan_line(line: &str) -> Vec<Directive> {
    let mut directives = Vec::new();

    if line.contains(PROPRIETARY_MARKER) {
        directives.push(Directive::Proprietary);
    }
    if let Some(value) = assigned_value(line, LICENSE_MARKER) {
        directives.push(Directive::License {
            mentions_gpl: GPL_VALUE_PATTERN.is_match(value),
            tokens: split_tokens(value),
        });
    }
    if let Some(value) = assigned_value(line, LICENSE_FILES_MARKER) {
        directives.push(Directive::LicenseFiles {
            tokens: split_tokens(value),
        });
    }

    directives
}

/// Text after `marker`, up to a following `:=` if there is one.
fn assigned_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let start = line.find(marker)? + marker.len();
    let rest = &line[start..];
    Some(rest.split(":=").next().unwrap_or(rest))
}

fn split_tokens(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// License metadata gathered from a package's Makefiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseMetadata {
    /// Makefiles read, in order.
    pub makefiles: Vec<PathBuf>,
    pub has_root_makefile: bool,
    pub proprietary: bool,
    pub license_identifiers: Vec<String>,
    pub license_file_names: Vec<String>,
    pub contains_gpl: bool,
}

impl LicenseMetadata {
    pub fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Proprietary => self.proprietary = true,
            Directive::License {
                tokens,
                mentions_gpl,
            } => {
                self.contains_gpl |= mentions_gpl;
                self.license_identifiers = tokens;
            }
            Directive::LicenseFiles { tokens } => self.license_file_names = tokens,
        }
    }

    /// Fold in the body of one Makefile.
    pub fn apply_content(&mut self, content: &str) {
        for line in logical_lines(content) {
            for directive in scan_line(&line) {
                self.apply(directive);
            }
        }
    }

    /// Read every Makefile in order. Unreadable files are skipped with a warning.
    pub fn from_makefiles(root: &Path, makefiles: &[PathBuf]) -> Self {
        let root_makefile = root.join(MAKEFILE);
        let mut metadata = LicenseMetadata::default();

        for path in makefiles {
            debug!("Reading {}", path.display());
            if *path == root_makefile {
                metadata.has_root_makefile = true;
            }
            match std::fs::read(path) {
                Ok(bytes) => metadata.apply_content(&String::from_utf8_lossy(&bytes)),
                Err(e) => {
                    warn!("Cannot read {}: {}", path.display(), e);
                    continue;
                }
            }
            metadata.makefiles.push(path.clone());
        }

        metadata
    }
}
