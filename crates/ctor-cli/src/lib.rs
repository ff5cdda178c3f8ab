//! Constructor analysis CLI library
//!
//! The library half of the `ctor` binary: configuration loading and the
//! subcommand implementations, kept here so they can be tested without
//! spawning a process.

pub mod commands;
pub mod config;

// CLI-specific error handling
pub mod error {
    use std::path::PathBuf;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CliError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Configuration error in {path}: {message}")]
        Config { path: PathBuf, message: String },
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};
