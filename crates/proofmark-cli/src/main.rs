// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Proofmark: print-ready PDF preflight and overlay composition.
//
// Entry point. Initialises logging, loads configuration and dispatches the
// subcommand.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use proofmark_core::human_errors::humanize_error;
use proofmark_core::{Outcome, PaperSize, PreflightConfig, ProofmarkError, load_overlay_plan};
use proofmark_document::marking::MARKED_DIR;
use proofmark_document::{Preflight, StampLine, StampWriter};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "proofmark",
    about = "Preflight and overlay composition for print-ready PDFs",
    version
)]
struct Cli {
    /// Preflight configuration (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw overlays onto a document according to a plan
    Compose {
        /// Overlay plan (JSON)
        #[arg(short, long)]
        plan: PathBuf,

        /// Source PDF
        source: PathBuf,

        /// Where to write the composed PDF
        dest: PathBuf,
    },

    /// Highlight marks that overlap printed content
    Mark {
        /// PDF to scan for overlaps
        input: PathBuf,

        /// Session directory holding overlay/<file>
        #[arg(short, long)]
        session: PathBuf,

        /// File name inside the session directory
        #[arg(short, long)]
        file: String,
    },

    /// Run every validator and print a JSON report
    Validate {
        /// Directory holding the file
        dir: PathBuf,

        /// File name inside the directory
        file: String,
    },

    /// Create a single-page text stamp for use as an overlay
    Stamp {
        /// Text to place
        #[arg(short, long)]
        text: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Distance from the left edge, in points
        #[arg(long, default_value = "40")]
        x: f32,

        /// Baseline distance from the bottom edge, in points
        #[arg(long, default_value = "800")]
        y: f32,

        /// Font size in points
        #[arg(long, default_value = "9")]
        size: f32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => PreflightConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PreflightConfig::default(),
    };
    info!(paper = ?config.paper, overlay_dir = %config.overlay_dir.display(), "configuration ready");
    let preflight = Preflight::new(config);

    match cli.command {
        Commands::Compose { plan, source, dest } => {
            let plan = load_overlay_plan(&plan)
                .with_context(|| format!("loading overlay plan from {}", plan.display()))?;
            let outcome = preflight.apply_overlays(&source, &dest, &plan)?;
            Ok(finish(outcome, |bytes| {
                println!("Composed {} ({} bytes)", dest.display(), bytes.len())
            }))
        }

        Commands::Mark {
            input,
            session,
            file,
        } => {
            let outcome = preflight.apply_overlap_marking(&input, &session, &file)?;
            let marked = session.join(MARKED_DIR).join(&file);
            Ok(finish(outcome, |bytes| {
                println!("Marked copy {} ({} bytes)", marked.display(), bytes.len())
            }))
        }

        Commands::Validate { dir, file } => {
            let report = preflight.validate_all(&dir, &file)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }

        Commands::Stamp {
            text,
            output,
            x,
            y,
            size,
        } => {
            write_stamp(preflight.config().paper, StampLine { text, x, y, size }, &output)?;
            println!("Stamp written to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn write_stamp(paper: PaperSize, line: StampLine, output: &Path) -> Result<()> {
    let mut writer = StampWriter::new(paper);
    writer.set_title(line.text.clone());
    writer.write_stamp_to_file(&[line], output)?;
    Ok(())
}

/// Print a completed outcome, or explain the degradation and fail.
fn finish(outcome: Outcome<Vec<u8>>, on_success: impl FnOnce(&[u8])) -> ExitCode {
    match outcome {
        Outcome::Completed(bytes) => {
            on_success(&bytes);
            ExitCode::SUCCESS
        }
        Outcome::Degraded { fallback, error } => {
            report_proofmark(&error);
            eprintln!("Fell back to {} bytes of output.", fallback.len());
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ProofmarkError>() {
        Some(proofmark_err) => report_proofmark(proofmark_err),
        None => eprintln!("error: {:#}", err),
    }
}

fn report_proofmark(err: &ProofmarkError) {
    let human = humanize_error(err);
    eprintln!("error: {}", human.message);
    eprintln!("  hint: {}", human.suggestion);
    eprintln!("  detail: {}", err);
}
