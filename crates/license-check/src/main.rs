//! chk-licenses-info - check the license information of package Makefiles.

use anyhow::Context;
use clap::Parser;
use gplrel_common::Error;
use gplrel_licenses::{CheckerConfig, LicenseChecker, OutputFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "chk-licenses-info")]
#[command(
    author,
    version,
    about = "Check the license info in the Makefile of packages under the current directory",
    long_about = "Check the license info in the Makefile of packages under the current \
                  directory. Proprietary packages need neither PKG_LICENSE nor \
                  PKG_LICENSE_FILES. For packages under the xxx directory, run the \
                  check from the package's directory."
)]
struct Cli {
    /// Display all information
    #[arg(short, long)]
    verbose: bool,

    /// Fail packages that have no Makefile at their root
    #[arg(long)]
    strict: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,

    /// Packages to check
    #[arg(required = true, value_name = "PACKAGE")]
    packages: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let format: OutputFormat = cli.format.parse()?;
    let config = CheckerConfig {
        verbose: cli.verbose,
        strict: cli.strict,
        format,
        ..Default::default()
    };
    let text = format == OutputFormat::Text;

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let checker = LicenseChecker::new(config, cwd);

    if text {
        println!();
        if cli.verbose {
            println!("\t........Starting Check........\n");
        }
    }

    let result = checker.run(&cli.packages, &mut std::io::stdout().lock());
    let records = match result {
        Ok(records) => records,
        Err(err @ Error::PackageNotFound { .. }) => {
            println!("{}", err);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    if text {
        if cli.verbose {
            println!("\t........End Of Check........\n");
        } else {
            println!();
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    Ok(())
}
