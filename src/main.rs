//! # roadscan CLI
//!
//! Ingests road-survey archives and exposes the merged dataset as a
//! per-survey summary, a GeoJSON map export, tables, or single frame
//! images.
//!
//! ## Usage
//!
//! ```bash
//! roadscan --config ./config/roadscan.toml <command> [ARCHIVES...]
//! ```
//!
//! Archives may be zip files or directories containing them. With no
//! archive arguments, `[ingest].assets_dir` is scanned.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `roadscan surveys` | List surveys with record and image counts |
//! | `roadscan export` | Write visible markers and the map view as GeoJSON |
//! | `roadscan table <detections\|roughness>` | Print a record table |
//! | `roadscan image --survey S --frame N -o FILE` | Extract a frame image |

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use roadscan::config;
use roadscan::export::{self, SelectionArgs, TableKind};
use roadscan::progress::ProgressMode;
use roadscan::surveys;

/// roadscan: merge road-survey archives into one geotagged dataset.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Built-in defaults apply when the file does not exist.
#[derive(Parser)]
#[command(
    name = "roadscan",
    about = "Merge road-survey archives into a single geotagged dataset",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/roadscan.toml")]
    config: PathBuf,

    /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

/// Archive arguments shared by every command.
#[derive(Args)]
struct ArchiveArgs {
    /// Survey archives (.zip) or directories containing them.
    archives: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List surveys with their detection, roughness and image counts.
    ///
    /// Archives that fail to load are listed as FAILED; the others are
    /// still ingested.
    Surveys {
        #[command(flatten)]
        archives: ArchiveArgs,
    },

    /// Export visible markers and the initial map view as GeoJSON.
    ///
    /// Detection popups embed their frame image as a base64 data URI.
    Export {
        #[command(flatten)]
        archives: ArchiveArgs,

        /// Only include these surveys (repeatable). Default: all.
        #[arg(long = "survey")]
        surveys: Vec<String>,

        /// Hide the detections layer.
        #[arg(long)]
        no_detections: bool,

        /// Hide the roughness layer.
        #[arg(long)]
        no_roughness: bool,

        /// Output file. Writes to stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the detections or roughness table.
    Table {
        /// Which table to print.
        #[arg(value_enum)]
        kind: TableKind,

        #[command(flatten)]
        archives: ArchiveArgs,

        /// Only include these surveys (repeatable). Default: all.
        #[arg(long = "survey")]
        surveys: Vec<String>,
    },

    /// Extract the image matched to a detection frame.
    Image {
        #[command(flatten)]
        archives: ArchiveArgs,

        /// Survey identifier (archive name without `.zip`).
        #[arg(long)]
        survey: String,

        /// Frame number.
        #[arg(long)]
        frame: u64,

        /// Where to write the image.
        #[arg(long, short)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;
    let reporter = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Surveys { archives } => {
            surveys::run_surveys(&cfg, &archives.archives, reporter.as_ref())?;
        }
        Commands::Export {
            archives,
            surveys,
            no_detections,
            no_roughness,
            output,
        } => {
            let selection = SelectionArgs {
                surveys,
                hide_detections: no_detections,
                hide_roughness: no_roughness,
            };
            export::run_export(
                &cfg,
                &archives.archives,
                &selection,
                output.as_deref(),
                reporter.as_ref(),
            )?;
        }
        Commands::Table {
            kind,
            archives,
            surveys,
        } => {
            export::run_table(&cfg, &archives.archives, kind, &surveys, reporter.as_ref())?;
        }
        Commands::Image {
            archives,
            survey,
            frame,
            output,
        } => {
            export::run_image(
                &cfg,
                &archives.archives,
                &survey,
                frame,
                &output,
                reporter.as_ref(),
            )?;
        }
    }

    Ok(())
}
