//! guidegrid CLI
//!
//! Usage:
//!   guidegrid [OPTIONS] <COMMAND>
//!
//! Commands:
//!   export    Export the semantic layout model as JSON
//!   validate  Report items that are off the grid
//!   snap      Move off-grid items onto the grid
//!
//! Options:
//!   -r, --rules <FILE>  Naming and grid rules (TOML format)
//!   -v, --verbose       More log output on stderr (repeat for trace)
//!   -h, --help          Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guidegrid::document::{snapshot, Document};
use guidegrid::{CheckScope, Error, Rules};

#[derive(Parser)]
#[command(name = "guidegrid")]
#[command(about = "Semantic layout export and grid alignment for drawing snapshots")]
struct Cli {
    /// Rules file (TOML format); built-in defaults when omitted
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    /// More log output on stderr (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the semantic layout model as JSON
    Export {
        /// Document snapshot (JSON)
        snapshot: PathBuf,

        /// Output file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report items that are off the grid
    Validate {
        /// Document snapshot (JSON)
        snapshot: PathBuf,

        /// Report file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave guide-named items out of the check
        #[arg(long)]
        semantic_only: bool,

        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Move off-grid items onto the grid
    Snap {
        /// Document snapshot (JSON)
        snapshot: PathBuf,

        /// Report file (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave guide-named items where they are
        #[arg(long)]
        semantic_only: bool,

        /// Write the corrected snapshot here
        #[arg(short, long)]
        write: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), Error> {
    let rules = match &cli.rules {
        Some(path) => Rules::from_file(path)?,
        None => Rules::default(),
    };
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    match cli.command {
        Command::Export { snapshot, output } => {
            let doc = load(&snapshot)?;
            let model = guidegrid::export(&doc, &rules, &generated_at);
            emit(output.as_deref(), &model.to_json_pretty()?)?;
            info!(signature = %model.signature, "export complete");
        }
        Command::Validate {
            snapshot,
            output,
            semantic_only,
            json,
        } => {
            let doc = load(&snapshot)?;
            let report = guidegrid::validate(&doc, &rules, scope(semantic_only));
            let text = if json {
                serde_json::to_string_pretty(&report)?
            } else {
                report.render(&generated_at).join("\n")
            };
            emit(output.as_deref(), &text)?;
            info!(off_grid = report.counts.off_grid, "validation complete");
        }
        Command::Snap {
            snapshot: input,
            output,
            semantic_only,
            write,
        } => {
            let mut doc = load(&input)?;
            let outcome = guidegrid::snap(&mut doc, &rules, scope(semantic_only));
            if let Some(path) = &write {
                snapshot::save(&doc, path)?;
            }
            emit(output.as_deref(), &outcome.render(&generated_at).join("\n"))?;
            info!(
                moved = outcome.moved.len(),
                failed = outcome.failed.len(),
                "snap complete"
            );
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<Document, Error> {
    Ok(snapshot::load(path)?)
}

fn scope(semantic_only: bool) -> CheckScope {
    if semantic_only {
        CheckScope::SemanticOnly
    } else {
        CheckScope::WithGuides
    }
}

fn emit(output: Option<&Path>, text: &str) -> Result<(), Error> {
    match output {
        Some(path) => fs::write(path, text).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}
