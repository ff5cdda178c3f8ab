//! `ctor` CLI Binary
//!
//! Decides whether object constructors are trivial initializers and, if so,
//! which parameter feeds which field.
//!
//! # Usage
//!
//! ```bash
//! # Analyze every constructor in a file
//! ctor analyze bodies.json
//!
//! # Machine-readable output
//! ctor analyze bodies.ctor --format json
//!
//! # Print a disassembly
//! ctor disasm bodies.ctor
//!
//! # Convert JSON bodies into the binary container
//! ctor convert bodies.json --output bodies.ctor
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use ctor_cli::{
    commands::{self, analyze::AnalyzeArgs, convert::ConvertArgs, disasm::DisasmArgs},
    config::CliConfig,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "ctor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Constructor analysis: recover field-to-parameter mappings of trivial constructors"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level (overrides --verbose/--quiet)
    #[arg(long, global = true, value_enum)]
    log: Option<LogLevel>,

    /// Set log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze constructor bodies and print their field mappings
    Analyze(AnalyzeArgs),

    /// Print a disassembly of constructor bodies
    Disasm(DisasmArgs),

    /// Convert bodies between JSON and the binary container
    Convert(ConvertArgs),
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format)?;

    let config = CliConfig::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze_command(args, &config),
        Commands::Disasm(args) => commands::disasm_command(args, &config),
        Commands::Convert(args) => commands::convert_command(args, &config),
    };

    match result {
        Ok(()) => {
            if cli.verbose > 0 {
                info!("Command completed successfully");
            }
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            if cli.verbose > 0 {
                error!(?e, "detailed error context");
            }
            std::process::exit(1);
        }
    }
}

/// `--log` wins, then `-q`, then `RUST_LOG`, then the `-v` count.
fn log_filter(verbose: u8, quiet: bool, log_level: Option<LogLevel>) -> EnvFilter {
    let directive = match (log_level, quiet, verbose) {
        (Some(LogLevel::Error), _, _) | (None, true, _) => "error",
        (Some(LogLevel::Warn), _, _) => "warn",
        (Some(LogLevel::Info), _, _) => "info",
        (Some(LogLevel::Debug), _, _) => "debug",
        (Some(LogLevel::Trace), _, _) => "trace",
        (None, false, 0) => {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return filter;
            }
            "warn"
        }
        (None, false, 1) => "info",
        (None, false, 2) => "debug",
        (None, false, _) => "trace",
    };
    EnvFilter::new(directive)
}

/// Logs go to stderr so `analyze --format json` output stays parseable.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_level: Option<LogLevel>,
    log_format: LogFormat,
) -> eyre::Result<()> {
    let filter = log_filter(verbose, quiet, log_level);
    let formatter = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    let registry = tracing_subscriber::registry().with(filter);
    match log_format {
        LogFormat::Pretty => registry.with(formatter).try_init()?,
        LogFormat::Json => registry.with(formatter.json()).try_init()?,
    }
    Ok(())
}
