//! Per-package license checks and their report.

use crate::config::{CheckerConfig, OutputFormat};
use crate::grammar::{validate, Finding, LicenseFacts, GPL_FORMAT_HINT};
use crate::locate::{find_makefiles, find_package_dir, MAKEFILE};
use crate::makefile::LicenseMetadata;
use gplrel_common::Result;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Separator between package name and status in report lines.
const LEADER: &str = "........";

/// Everything known about one package after checking it.
#[derive(Debug, Clone, Serialize)]
pub struct PackageLicenseRecord {
    pub package_name: String,
    pub root_directory: PathBuf,
    pub makefiles: Vec<PathBuf>,
    pub has_root_metadata_file: bool,
    pub is_proprietary: bool,
    pub license_identifiers: Vec<String>,
    pub license_file_names: Vec<String>,
    pub contains_gpl_marker: bool,
    pub passed: bool,
    /// Rule outcomes, in evaluation order.
    pub messages: Vec<String>,
    #[serde(skip)]
    pub findings: Vec<Finding>,
}

impl PackageLicenseRecord {
    /// Report lines for this package in text mode.
    pub fn text_lines(&self, verbose: bool) -> Vec<String> {
        let pkg = &self.package_name;
        let mut lines = Vec::new();

        if verbose {
            lines.push(format!("Reading Makefile information: {}", pkg));
            lines.extend(self.makefiles.iter().map(|p| p.display().to_string()));
        }

        for finding in &self.findings {
            match finding {
                Finding::LicenseFormat { .. } => {
                    lines.push(format!("{}{}{}", pkg, LEADER, finding));
                    lines.push(format!("\n{}\n", GPL_FORMAT_HINT));
                }
                f if f.is_failure() => lines.push(format!("{}{}{}", pkg, LEADER, f)),
                f if verbose => lines.push(format!("{}{}{}", pkg, LEADER, f)),
                _ => {}
            }
        }

        if self.passed {
            lines.push(format!("{}{}PASS", pkg, LEADER));
            if verbose {
                lines.push(String::new());
            }
        } else if verbose {
            lines.push(format!("{}{}FAILED", pkg, LEADER));
            lines.push(String::new());
        }

        lines
    }
}

/// Checks packages found below a start directory.
pub struct LicenseChecker {
    config: CheckerConfig,
    start_dir: PathBuf,
}

impl LicenseChecker {
    pub fn new(config: CheckerConfig, start_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            start_dir: start_dir.into(),
        }
    }

    /// Locate, parse and validate one package.
    ///
    /// Fails only when the package directory cannot be found.
    pub fn check_package(&self, name: &str) -> Result<PackageLicenseRecord> {
        let root = find_package_dir(&self.start_dir, name, &self.config)?;
        let makefiles = find_makefiles(&root);
        debug!("{}: {} Makefile(s) under {}", name, makefiles.len(), root.display());

        let metadata = LicenseMetadata::from_makefiles(&root, &makefiles);
        let facts = LicenseFacts {
            has_root_makefile: metadata.has_root_makefile,
            proprietary: metadata.proprietary,
            license_identifiers: &metadata.license_identifiers,
            license_file_names: &metadata.license_file_names,
        };
        let validation = validate(&facts, root.join(MAKEFILE), self.config.strict);

        Ok(PackageLicenseRecord {
            package_name: name.to_string(),
            root_directory: root,
            makefiles: metadata.makefiles,
            has_root_metadata_file: metadata.has_root_makefile,
            is_proprietary: metadata.proprietary,
            license_identifiers: metadata.license_identifiers,
            license_file_names: metadata.license_file_names,
            contains_gpl_marker: metadata.contains_gpl,
            passed: validation.passed,
            messages: validation.findings.iter().map(|f| f.to_string()).collect(),
            findings: validation.findings,
        })
    }

    /// Check every package in order.
    ///
    /// In text mode each package's lines are written to `out` as soon as it
    /// is checked, so an unknown package stops the run after the report of
    /// the packages before it.
    pub fn run<W: Write>(&self, names: &[String], out: &mut W) -> Result<Vec<PackageLicenseRecord>> {
        let mut records = Vec::with_capacity(names.len());

        for name in names {
            let record = self.check_package(name)?;
            if self.config.format == OutputFormat::Text {
                for line in record.text_lines(self.config.verbose) {
                    writeln!(out, "{}", line)?;
                }
                out.flush()?;
            }
            records.push(record);
        }

        Ok(records)
    }
}
