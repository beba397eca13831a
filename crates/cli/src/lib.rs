//! CLI for the uxprobe regression harness.
//!
//! Two run modes, mirroring the baseline-update discipline: `check`
//! compares against stored baselines in parallel-safe read-mostly fashion,
//! while `baseline` is the serialized update mode that overwrites records.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod runner;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uxprobe_core::types::Tolerance;
use uxprobe_store::BaselineStore;

use runner::{Mode, RunOptions};

/// uxprobe: UX/performance regression checks against a live web app.
#[derive(Parser, Debug)]
#[command(name = "uxprobe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose diagnostic output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Shared arguments of the two run modes.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the TOML check suite.
    #[arg(long)]
    pub suite: PathBuf,

    /// Base URL of the application under test.
    #[arg(long, env = "UXPROBE_BASE_URL", default_value = "http://localhost:3000")]
    pub base_url: String,

    /// Path of the baseline store file.
    #[arg(long, default_value = "baselines.json")]
    pub baselines: PathBuf,

    /// Run-wide tolerance multiplier (1.1 = 10% slack).
    #[arg(long, default_value_t = 1.1)]
    pub tolerance: f64,

    /// Directory for the JSON/HTML report artifacts; omitted = console only.
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub no_headless: bool,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run all checks against the stored baselines.
    ///
    /// Checks without a baseline establish one; any tolerance failure or
    /// probe error yields a non-zero exit code.
    Check {
        /// Run arguments.
        #[command(flatten)]
        run: RunArgs,
    },

    /// Re-measure every check and overwrite its baseline record.
    ///
    /// The serialized update mode: never run concurrently with itself.
    Baseline {
        /// Run arguments.
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the stored baselines.
    Show {
        /// Path of the baseline store file.
        #[arg(long, default_value = "baselines.json")]
        baselines: PathBuf,
    },
}

impl RunArgs {
    fn into_options(self, mode: Mode) -> anyhow::Result<RunOptions> {
        let tolerance = Tolerance::new(self.tolerance)
            .with_context(|| format!("invalid --tolerance {}", self.tolerance))?;
        Ok(RunOptions {
            suite: self.suite,
            base_url: self.base_url,
            baselines: self.baselines,
            tolerance,
            report_dir: self.report_dir,
            headless: !self.no_headless,
            mode,
        })
    }
}

/// Execute the parsed CLI, returning the process exit code.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Check { run } => {
            let summary = runner::execute(run.into_options(Mode::Check)?).await?;
            Ok(summary.exit_code())
        }
        Commands::Baseline { run } => {
            let summary = runner::execute(run.into_options(Mode::UpdateBaselines)?).await?;
            Ok(summary.exit_code())
        }
        Commands::Show { baselines } => {
            let store = BaselineStore::load(&baselines)
                .with_context(|| format!("cannot read {}", baselines.display()))?;
            if store.is_empty() {
                println!("no baselines recorded in {}", baselines.display());
            } else {
                for (check, metric, record) in store.iter() {
                    println!(
                        "{check}.{metric} = {} (updated {})",
                        record.value,
                        record.updated_at.to_rfc3339()
                    );
                }
            }
            Ok(0)
        }
    }
}
