//! Disassembly command implementation

use crate::config::CliConfig;
use clap::Args;
use ctor_bytecode::{format_body, ConstructorBody};
use eyre::Result;
use itertools::Itertools;
use std::path::PathBuf;

use super::common::read_bodies;

/// Arguments for the disasm command
#[derive(Debug, Clone, Args)]
pub struct DisasmArgs {
    /// Body file to print (`.json` or binary container)
    pub file: PathBuf,
}

/// Execute the disasm command
pub fn disasm_command(args: DisasmArgs, _config: &CliConfig) -> Result<()> {
    let bodies = read_bodies(&args.file)?;
    println!("{}", disassemble(&bodies));
    Ok(())
}

/// Every body's listing, separated by a blank line.
pub fn disassemble(bodies: &[ConstructorBody]) -> String {
    bodies.iter().map(format_body).join("\n")
}
