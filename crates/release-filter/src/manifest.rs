//! Package manifest ("package-full-list") reader.
//!
//! The manifest is a flat text file of 4-line records:
//!
//! ```text
//! <source archive name, may be empty>
//! <package name>
//! <version>
//! <proprietary flag, "1" when proprietary>
//! ```
//!
//! Reading stops at the first record whose package name line is empty.

use gplrel_common::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::error;

/// One manifest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub source_name: Option<String>,
    pub package_name: String,
    pub version: String,
    pub proprietary: bool,
}

/// Parse manifest records from a reader.
pub fn parse_manifest<R: BufRead>(mut reader: R) -> std::io::Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();

    loop {
        let source_name = read_field(&mut reader)?;
        let package_name = read_field(&mut reader)?;
        let version = read_field(&mut reader)?;
        let proprietary = read_field(&mut reader)?;

        if package_name.is_empty() {
            break;
        }

        entries.push(ManifestEntry {
            source_name: Some(source_name).filter(|s| !s.is_empty()),
            package_name,
            version,
            proprietary: proprietary == "1",
        });
    }

    Ok(entries)
}

/// Read the manifest at `path`.
///
/// I/O failures are logged with errno and description before propagating.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let result = File::open(path).and_then(|file| parse_manifest(BufReader::new(file)));
    result.map_err(|e| {
        let err = Error::manifest(path, &e);
        if let Error::Manifest { errno, reason, .. } = &err {
            error!("I/O error({}): {}", errno, reason);
        }
        err
    })
}

/// Read one line without its terminator; empty at end of input.
fn read_field<R: BufRead>(reader: &mut R) -> std::io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}
