//! modorder CLI - initialization-order resolution for declarative entity
//! modules.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use modorder::{emit, resolve, CycleConfig, ResolveOptions, ScanConfig};

/// Deterministic initialization-order resolver.
///
/// Scans a directory of declarative source units, builds the entity
/// dependency graph, reports circular dependencies in full, and prints a
/// safe initialization order ranked by external reference priority.
#[derive(Parser)]
#[command(
    name = "modorder",
    version,
    about = "Initialization-order resolution for declarative entity modules"
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the initialization order of a source directory
    Resolve {
        /// Directory holding the declarative source units
        #[arg(long)]
        source_dir: PathBuf,

        /// Unit ids to force to the front, comma separated, applied literally
        #[arg(long, value_delimiter = ',')]
        pin: Vec<String>,

        /// Extra corpus paths for reference priority, comma separated
        #[arg(long, value_delimiter = ',')]
        corpus: Vec<PathBuf>,

        /// Exit 1 when any dependency cycle is found
        #[arg(long)]
        strict: bool,

        /// Print detected cycles instead of the order (diagnostic only)
        #[arg(long)]
        print_cycles: bool,

        /// Extension of declarative source files
        #[arg(long, default_value = "py")]
        ext: String,

        /// Cycle enumeration cap
        #[arg(long, default_value_t = 500)]
        max_cycles: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve {
            source_dir,
            pin,
            corpus,
            strict,
            print_cycles,
            ext,
            max_cycles,
            format,
        } => {
            let options = ResolveOptions {
                source_dir: source_dir.clone(),
                corpus,
                pins: pin,
                scan: ScanConfig {
                    extension: ext,
                    ..ScanConfig::default()
                },
                cycles: CycleConfig { max_cycles },
            };

            let resolution = resolve(&options)
                .with_context(|| format!("resolving {}", source_dir.display()))?;

            for warning in &resolution.warnings {
                eprintln!("warning: {}: {}", warning.path.display(), warning.message);
            }

            if print_cycles {
                // Diagnostic-only mode: always exits 0.
                print!(
                    "{}",
                    emit::format_cycles(&resolution.result.cycles, resolution.result.truncated)
                );
                return Ok(ExitCode::SUCCESS);
            }

            match format {
                OutputFormat::Text => {
                    for cycle in &resolution.result.cycles {
                        eprintln!("warning: dependency cycle: {}", cycle.join(" -> "));
                    }
                    print!("{}", emit::format_order(&resolution.result));
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&resolution.result)?);
                }
            }

            if strict && !resolution.result.cycles.is_empty() {
                eprintln!(
                    "error: {} unresolved dependency cycles (strict mode)",
                    resolution.result.cycles.len()
                );
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
