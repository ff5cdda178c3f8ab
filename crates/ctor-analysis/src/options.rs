use ctor_bytecode::INITIALIZER_NAME;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const DEFAULT_MAX_INSTRUCTIONS: usize = 4096;
pub const MAX_INSTRUCTIONS_ENV: &str = "CTOR_MAX_INSTRUCTIONS";

fn max_instructions_from_env() -> Option<usize> {
    static MAX: OnceLock<Option<usize>> = OnceLock::new();
    *MAX.get_or_init(|| {
        std::env::var(MAX_INSTRUCTIONS_ENV)
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .filter(|max| *max > 0)
    })
}

/// Knobs of a single constructor analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// Method name identifying constructor delegation calls
    pub initializer_name: String,
    /// Bodies longer than this are rejected outright
    pub max_instructions: usize,
}

impl AnalyzerOptions {
    pub fn with_max_instructions(mut self, max_instructions: usize) -> Self {
        self.max_instructions = max_instructions;
        self
    }
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            initializer_name: INITIALIZER_NAME.to_string(),
            max_instructions: max_instructions_from_env().unwrap_or(DEFAULT_MAX_INSTRUCTIONS),
        }
    }
}
