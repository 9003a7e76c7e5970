//! tp7-util - convert between TP-7 multitrack WAV files and stereo tracks.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use tp7kit::{export_multitrack, import_to_multitrack};
use tracing::error;
use tracing::level_filters::LevelFilter;

/// Convert between TP-7 multitrack format and individual WAV files.
#[derive(Parser, Debug)]
#[command(name = "tp7-util")]
#[command(
    about = "TP-7 Utility - Convert between TP-7 multitrack format and individual WAV files",
    after_help = "Examples:
  tp7-util export recording.WAV
  tp7-util export recording.WAV -o ./tracks/
  tp7-util import track1.wav -o multitrack.WAV
  tp7-util import track1.wav track2.wav track3.wav -o multitrack.WAV"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Only log warnings and errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log decoder details
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Print a JSON report of the conversion to stdout
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export multitrack to individual stereo files
    Export {
        /// TP-7 multitrack WAV file
        input: PathBuf,

        /// Output directory (default: <input>_tracks/)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Import stereo files to TP-7 multitrack format
    Import {
        /// Stereo WAV files to import (max 6)
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output TP-7 multitrack WAV file
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        LevelFilter::WARN
    } else if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report<T: Serialize>(report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    println!("{}", json);
    Ok(())
}

fn run(args: &Args, command: &Command) -> Result<()> {
    match command {
        Command::Export { input, output } => {
            let report = export_multitrack(input, output.as_deref())
                .with_context(|| format!("export of '{}' failed", input.display()))?;
            if args.json {
                print_report(&report)?;
            }
        }
        Command::Import { inputs, output } => {
            let report = import_to_multitrack(inputs.as_slice(), output)
                .with_context(|| format!("import into '{}' failed", output.display()))?;
            if args.json {
                print_report(&report)?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(command) = args.command.as_ref() else {
        eprintln!("{}", Args::command().render_help());
        return ExitCode::FAILURE;
    };

    init_logging(&args);

    match run(&args, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
