use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use courier::transform::{self, FieldMapDocument, MappingDocument};
use courier::{codec, AppResult};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace};

/// Reshape JSON records with declarative mappings
#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Courier - declarative record transformation", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a mapping document to a JSON record
    Transform {
        /// Mapping document (.json, .yaml or .yml)
        #[arg(short, long)]
        mapping: PathBuf,

        /// Input record (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// How the mapping document is interpreted
        #[arg(long, value_enum, default_value_t = Mode::Full)]
        mode: Mode,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Check that a mapping document parses
    Validate {
        /// Mapping document (.json, .yaml or .yml)
        #[arg(short, long)]
        mapping: PathBuf,

        /// How the mapping document is interpreted
        #[arg(long, value_enum, default_value_t = Mode::Full)]
        mode: Mode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Full mapping tree
    Full,
    /// Field map; unresolvable paths are errors
    Subset,
    /// Field map; unresolvable paths are dropped
    Exclusive,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_line_number(cli.verbose >= 2)
        .init();

    debug!("courier started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command {
        Commands::Transform {
            mapping,
            input,
            mode,
            pretty,
        } => run_transform(&mapping, input.as_deref(), mode, pretty),
        Commands::Validate { mapping, mode } => run_validate(&mapping, mode),
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_transform(mapping: &Path, input: Option<&Path>, mode: Mode, pretty: bool) -> AppResult<()> {
    let item = read_input(input)?;

    let output = match mode {
        Mode::Full => {
            let spec = load_mapping(mapping)?;
            transform::transform(&item, &spec)?
        }
        Mode::Subset => {
            let fields = load_field_map(mapping)?;
            Value::Object(transform::project(&item, &fields)?)
        }
        Mode::Exclusive => {
            let fields = load_field_map(mapping)?;
            Value::Object(transform::exclusive_project(&item, &fields)?)
        }
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        codec::serialize(&output)?
    };
    println!("{}", rendered);
    Ok(())
}

fn run_validate(mapping: &Path, mode: Mode) -> AppResult<()> {
    match mode {
        Mode::Full => {
            let spec = load_mapping(mapping)?;
            println!("Valid mapping: {} at root", spec.kind());
        }
        Mode::Subset | Mode::Exclusive => {
            let fields = load_field_map(mapping)?;
            println!(
                "Valid field map: {} keys ({})",
                fields.len(),
                fields.keys().collect::<Vec<_>>().join(", ")
            );
        }
    }
    Ok(())
}

fn load_mapping(path: &Path) -> AppResult<transform::Mapping> {
    MappingDocument::from_path(path)
        .with_context(|| format!("Failed to load mapping from {}", path.display()))
}

fn load_field_map(path: &Path) -> AppResult<transform::FieldMap> {
    FieldMapDocument::from_path(path)
        .with_context(|| format!("Failed to load field map from {}", path.display()))
}

fn read_input(input: Option<&Path>) -> AppResult<Value> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read input from stdin")?;
            buffer
        }
    };
    codec::deserialize(&raw).context("Input is not valid JSON")
}
