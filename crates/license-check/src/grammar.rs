//! License declaration rules.

use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Any identifier that names a GPL or LGPL license, however written.
static GPL_FAMILY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^L?GPL.*$").unwrap());

/// The accepted spelling: `<GPL|LGPL>-<major>.<minor>` with an optional `+`.
static GPL_IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^L?GPL-[0-9]\.[0-9]\+?$").unwrap());

/// Hint printed after a malformed GPL identifier.
pub const GPL_FORMAT_HINT: &str =
    "Correct format: <GPL type> - <version> ex: LGPL-2.1+ , GPL-3.0 , GPL-2.0+";

pub fn is_gpl_family(identifier: &str) -> bool {
    GPL_FAMILY_PATTERN.is_match(identifier)
}

pub fn is_valid_gpl_identifier(identifier: &str) -> bool {
    GPL_IDENTIFIER_PATTERN.is_match(identifier)
}

/// The license facts the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct LicenseFacts<'a> {
    pub has_root_makefile: bool,
    pub proprietary: bool,
    pub license_identifiers: &'a [String],
    pub license_file_names: &'a [String],
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    MissingRootMakefile { path: PathBuf },
    Proprietary,
    LicenseOk,
    LicenseFormat { identifier: String },
    LicenseMissing,
    LicenseFilesOk,
    LicenseFilesMissing,
}

impl Finding {
    /// Whether the finding reports a problem.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Finding::MissingRootMakefile { .. }
                | Finding::LicenseFormat { .. }
                | Finding::LicenseMissing
                | Finding::LicenseFilesMissing
        )
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingRootMakefile { path } => {
                write!(f, "FAILED {} does not exist:", path.display())
            }
            Finding::Proprietary => write!(f, "PROPRIETARY"),
            Finding::LicenseOk => write!(f, "PKG_LICENSE OK"),
            Finding::LicenseFormat { identifier } => {
                write!(f, "FAILED PKG_LICENSE:={} format is incorrect", identifier)
            }
            Finding::LicenseMissing => write!(f, "FAILED PKG_LICENSE is missing or empty"),
            Finding::LicenseFilesOk => write!(f, "PKG_LICENSE_FILES OK"),
            Finding::LicenseFilesMissing => {
                write!(f, "FAILED PKG_LICENSE_FILES is missing or empty")
            }
        }
    }
}

/// Findings and verdict for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub findings: Vec<Finding>,
    pub passed: bool,
}

/// Apply the license rules in order.
///
/// A missing root Makefile is always reported but only affects the verdict
/// when `strict` is set. Proprietary packages always pass.
pub fn validate(facts: &LicenseFacts<'_>, root_makefile: PathBuf, strict: bool) -> Validation {
    let mut findings = Vec::new();
    let mut passed = true;

    if !facts.has_root_makefile {
        findings.push(Finding::MissingRootMakefile {
            path: root_makefile,
        });
        if strict && !facts.proprietary {
            passed = false;
        }
    }

    if facts.proprietary {
        findings.push(Finding::Proprietary);
        return Validation {
            findings,
            passed: true,
        };
    }

    match facts.license_identifiers.first() {
        Some(first) if is_gpl_family(first) && !is_valid_gpl_identifier(first) => {
            findings.push(Finding::LicenseFormat {
                identifier: first.clone(),
            });
            passed = false;
        }
        Some(_) => findings.push(Finding::LicenseOk),
        None => {
            findings.push(Finding::LicenseMissing);
            passed = false;
        }
    }

    if facts.license_file_names.is_empty() {
        findings.push(Finding::LicenseFilesMissing);
        passed = false;
    } else {
        findings.push(Finding::LicenseFilesOk);
    }

    Validation { findings, passed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn check(
        root: bool,
        proprietary: bool,
        licenses: &[&str],
        files: &[&str],
        strict: bool,
    ) -> Validation {
        let licenses = strings(licenses);
        let files = strings(files);
        let facts = LicenseFacts {
            has_root_makefile: root,
            proprietary,
            license_identifiers: &licenses,
            license_file_names: &files,
        };
        validate(&facts, PathBuf::from("/pkg/Makefile"), strict)
    }

    #[test]
    fn test_strict_gpl_pattern() {
        for ok in ["GPL-2.0", "LGPL-2.1+", "GPL-3.0"] {
            assert!(is_valid_gpl_identifier(ok), "{ok} should be accepted");
        }
        for bad in ["GPL2.0", "GPL-2", "gpl-2.0.1", "GPL-2.0-only", "LGPL-10.1"] {
            assert!(!is_valid_gpl_identifier(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_gpl_family_detection() {
        assert!(is_gpl_family("GPL2.0"));
        assert!(is_gpl_family("lgpl"));
        assert!(!is_gpl_family("MIT"));
        assert!(!is_gpl_family("AGPL-3.0"));
    }

    #[test]
    fn test_non_gpl_license_passes() {
        let result = check(true, false, &["MIT"], &["LICENSE"], false);
        assert_eq!(
            result,
            Validation {
                findings: vec![Finding::LicenseOk, Finding::LicenseFilesOk],
                passed: true,
            }
        );
    }

    #[test]
    fn test_malformed_gpl_fails_and_files_still_checked() {
        let result = check(true, false, &["GPL2.0"], &[], false);
        assert_eq!(
            result.findings,
            vec![
                Finding::LicenseFormat {
                    identifier: "GPL2.0".to_string()
                },
                Finding::LicenseFilesMissing,
            ]
        );
        assert!(!result.passed);
    }

    #[test]
    fn test_only_first_identifier_is_checked() {
        let result = check(true, false, &["MIT", "GPL2"], &["LICENSE"], false);
        assert!(result.passed);
    }

    #[test]
    fn test_missing_license() {
        let result = check(true, false, &[], &["COPYING"], false);
        assert_eq!(
            result.findings,
            vec![Finding::LicenseMissing, Finding::LicenseFilesOk]
        );
        assert!(!result.passed);
    }

    #[test]
    fn test_proprietary_short_circuits() {
        let result = check(true, true, &[], &[], true);
        assert_eq!(result.findings, vec![Finding::Proprietary]);
        assert!(result.passed);

        let result = check(false, true, &[], &[], true);
        assert!(result.passed);
    }

    #[test]
    fn test_missing_root_makefile_only_fails_when_strict() {
        let lenient = check(false, false, &["MIT"], &["LICENSE"], false);
        assert!(lenient.findings[0].is_failure());
        assert!(lenient.passed);

        let strict = check(false, false, &["MIT"], &["LICENSE"], true);
        assert!(!strict.passed);
    }
}
