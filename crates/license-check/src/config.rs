//! Checker configuration.

use gplrel_common::Error;
use std::str::FromStr;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(Error::Other(format!("unsupported output format: {}", s))),
        }
    }
}

/// Options for one checker run.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Echo OK lines, Makefile paths and banners.
    pub verbose: bool,
    /// Fail non-proprietary packages that have no root Makefile.
    pub strict: bool,
    /// Build-artifact directories not descended while locating packages.
    pub exclude_dirs: Vec<String>,
    /// Subtree searched without pruning; it nests packages under `feeds`.
    pub unpruned_subtree: String,
    pub format: OutputFormat,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            strict: false,
            exclude_dirs: [
                "feeds",
                "build_dir",
                "staging_dir",
                "tmp",
                "buildap",
                "script",
                "docker",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            unpruned_subtree: "xxx".to_string(),
            format: OutputFormat::Text,
        }
    }
}
