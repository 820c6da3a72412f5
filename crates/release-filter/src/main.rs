//! prepare-gpl-release - prepare a publicly releasable firmware source archive.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gplrel_release::{run_release, ArchiveFormat, Mode, ReleaseLayout, ReleaseOptions, SystemRunner};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "prepare-gpl-release")]
#[command(
    author,
    version,
    about = "Prepare a publicly releasable version of the firmware repository"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone the repository at a tag, filter it and archive it
    Download {
        /// Make the release for this target model
        #[arg(long, short)]
        model: String,

        /// Tag or branch to clone
        #[arg(long, short)]
        tag: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Filter and archive an existing checkout
    Local {
        /// Path to the checkout to prepare
        #[arg(long, short)]
        src: PathBuf,

        /// Do not clone the scripts repository or sync the tarball mirror
        #[arg(long)]
        no_fetch: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Print every removal and command
    #[arg(long, short)]
    verbose: bool,

    /// Directory the archive is written to
    #[arg(long, short, default_value = ".")]
    dest: PathBuf,

    /// Only report what would be removed
    #[arg(long)]
    dry_run: bool,

    /// Format of the dry-run report
    #[arg(long, value_enum, default_value = "text")]
    plan_format: PlanFormat,

    /// Archive compression (xz, gz)
    #[arg(long, default_value = "xz")]
    archive_format: String,

    /// JSON file overriding repository locations and tree layout
    #[arg(long)]
    layout: Option<PathBuf>,

    /// The "package-full-list" manifest from the build output directory
    package_list: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mode, fetch, common) = match cli.command {
        Commands::Download { model, tag, common } => {
            (Mode::Download { model, tag }, true, common)
        }
        Commands::Local {
            src,
            no_fetch,
            common,
        } => (Mode::Local { src }, !no_fetch, common),
    };

    // Initialize logging
    let level = if common.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let layout = match &common.layout {
        Some(path) => ReleaseLayout::from_file(path)
            .with_context(|| format!("Failed to load layout {}", path.display()))?,
        None => ReleaseLayout::default(),
    };

    let archive_format: ArchiveFormat = common.archive_format.parse()?;

    match &mode {
        Mode::Download { tag, .. } => info!("tag/branch: {}", tag),
        Mode::Local { src } => info!("source repository: {}", src.display()),
    }

    let options = ReleaseOptions {
        mode,
        dest: common.dest,
        manifest: common.package_list,
        verbose: common.verbose,
        dry_run: common.dry_run,
        fetch,
        archive_format,
        layout,
    };

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let outcome = run_release(&options, &cwd, &SystemRunner::new())?;

    if options.dry_run {
        match common.plan_format {
            PlanFormat::Text => {
                print!("{}", outcome.plan.render_text(&outcome.root));
                for missing in &outcome.keep.missing {
                    println!(
                        "missing      {} {}",
                        missing.package_name, missing.version
                    );
                }
            }
            PlanFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        }
        return Ok(());
    }

    info!("done");
    Ok(())
}
