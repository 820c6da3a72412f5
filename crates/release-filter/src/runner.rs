//! External command execution.

use gplrel_common::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// A blocking external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory of the command.
    pub cwd: PathBuf,
}

impl ExternalCommand {
    pub fn new(program: &str, cwd: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append `arg` only when it is non-empty.
    pub fn opt_arg(self, arg: &str) -> Self {
        if arg.is_empty() {
            self
        } else {
            self.arg(arg)
        }
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Trait for running external commands.
pub trait CommandRunner {
    /// Run `command` to completion; a non-zero exit status is an error.
    fn run(&self, command: &ExternalCommand) -> Result<()>;
}

/// Runs commands on the local system, inheriting stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ExternalCommand) -> Result<()> {
        debug!("Exec in {}: {}", command.cwd.display(), command);

        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .status()
            .map_err(|e| Error::CommandFailed {
                cmd: command.to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                cmd: command.to_string(),
                reason: match status.code() {
                    Some(code) => format!("exit status {}", code),
                    None => "terminated by signal".to_string(),
                },
            })
        }
    }
}
