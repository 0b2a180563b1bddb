//! `muonmet` – muon correction of calorimeter missing transverse energy.
//!
//! This binary runs the corrector over batches of dumped events:
//!
//! 1. Loads `~/.muonmet/config.toml` (or `--config`), then applies
//!    `MUONMET_*` environment overrides, and installs logging with optional
//!    OTLP trace export.
//! 2. `correct` reads a JSON event batch, corrects every event and writes a
//!    JSON report to `--output` or stdout. Failed events are reported and
//!    make the process exit with status 1.
//! 3. `schema` prints the JSON schema of the batch format.
//! 4. `config` prints the effective configuration, optionally saving it.

mod batch;
mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use muonmet_corrector::{MuonMetCorrector, RecordedAssociation};

#[derive(Parser, Debug)]
#[command(name = "muonmet", version, about = "Muon correction of calorimeter MET")]
struct Cli {
    /// Config file (default: ~/.muonmet/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Correct a batch of events
    Correct {
        /// JSON event batch
        input: PathBuf,
        /// Report file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the JSON schema of the event batch format
    Schema,
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    let _telemetry = telemetry::init_tracing("muonmet", cfg.otlp_endpoint.as_deref());

    match cli.command {
        Command::Correct { input, output } => correct(&cfg, &input, output),
        Command::Schema => {
            let schema = schemars::schema_for!(batch::EventBatch);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { write } => {
            print!("{}", toml::to_string_pretty(&cfg).context("failed to serialize config")?);
            if write {
                let path = config::save(&cfg, cli.config.as_deref())?;
                eprintln!("{} {}", "✓ Config saved to".green(), path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn correct(cfg: &config::Config, input: &std::path::Path, output: Option<PathBuf>) -> Result<ExitCode> {
    let events = batch::read_batch(input)?;
    info!(
        events = events.events.len(),
        field_tesla = cfg.field_tesla,
        "correcting batch"
    );

    let corrector = MuonMetCorrector::new(
        cfg.correction,
        cfg.magnetic_field(),
        Box::new(RecordedAssociation),
    );
    let report = batch::run_batch(&corrector, cfg.field_tesla, &events);
    batch::write_report(&report, output.as_deref())?;

    for outcome in &report.events {
        match (&outcome.met, &outcome.error) {
            (Some(met), _) => eprintln!("  {} {}  {}", "✓".green(), outcome.id, batch::describe(met)),
            (None, Some(e)) => eprintln!("  {} {}  {}", "✗".red(), outcome.id, e.to_string().red()),
            (None, None) => {}
        }
    }

    let failed = report.failed();
    if failed == 0 {
        eprintln!(
            "{}",
            format!("✓ {} event(s) corrected.", report.succeeded()).green().bold()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{}",
            format!("⚠ {} corrected, {} failed.", report.succeeded(), failed)
                .yellow()
                .bold()
        );
        Ok(ExitCode::FAILURE)
    }
}
