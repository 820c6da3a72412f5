//! License metadata checks for firmware packages.
//!
//! During the build a license page is generated for every installed
//! non-proprietary package, from the `PKG_LICENSE` and `PKG_LICENSE_FILES`
//! variables of its Makefile. The first identifier in `PKG_LICENSE` is the
//! main license and must correspond to the first file in
//! `PKG_LICENSE_FILES`. GPL-family identifiers must be written
//! `<GPL|LGPL>-<major>.<minor>[+]`, e.g. `GPL-2.0`, `LGPL-2.1+`.

pub mod check;
pub mod config;
pub mod grammar;
pub mod locate;
pub mod makefile;

pub use check::{LicenseChecker, PackageLicenseRecord};
pub use config::{CheckerConfig, OutputFormat};
