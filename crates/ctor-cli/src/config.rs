use std::path::{Path, PathBuf};

use ctor_analysis::AnalyzerOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CliError, Result};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ctor.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Settings passed to every constructor analysis
    pub analyzer: AnalyzerOptions,
}

impl CliConfig {
    /// Load configuration from file, falling back to defaults.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load_from_file(local);
        }
        debug!("no {} found, using default configuration", DEFAULT_CONFIG_FILE);
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| config_error(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| config_error(path, e))?;
        if config.analyzer.max_instructions == 0 {
            return Err(config_error(path, "analyzer.max_instructions must be positive"));
        }
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| config_error(path, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn config_error(path: &Path, message: impl ToString) -> CliError {
    CliError::Config {
        path: PathBuf::from(path),
        message: message.to_string(),
    }
}
