//! Conversion between the JSON and binary body formats

use crate::config::CliConfig;
use clap::Args;
use eyre::{ensure, Result};
use std::path::PathBuf;
use tracing::info;

use super::common::{read_bodies, write_bodies, BodyFormat};

/// Arguments for the convert command
#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Body file to read
    pub input: PathBuf,
    /// Destination; `.json` writes JSON, any other extension the binary container
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Execute the convert command
pub fn convert_command(args: ConvertArgs, _config: &CliConfig) -> Result<()> {
    ensure!(
        args.input != args.output,
        "refusing to convert {} onto itself",
        args.input.display()
    );
    let bodies = read_bodies(&args.input)?;
    write_bodies(&args.output, &bodies)?;
    info!(
        from = ?BodyFormat::of(&args.input),
        to = ?BodyFormat::of(&args.output),
        bodies = bodies.len(),
        "converted {}",
        args.output.display()
    );
    Ok(())
}
