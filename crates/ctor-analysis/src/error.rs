use itertools::Itertools;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Why a constructor is not a trivial initializer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Anything outside the accepted dialect. The message stays opaque;
    /// `reason` is kept for logs.
    #[error("illegal constructor")]
    UnsupportedConstruct { reason: String },
    #[error("field {field} is assigned more than once")]
    DuplicateFieldAssignment { field: String },
    #[error("constructor passes arguments to the superclass constructor")]
    IllegalSuperDelegationWithArguments,
    #[error("constructor delegates to another constructor of its own class")]
    IllegalSelfDelegation,
    #[error("non-idempotent expression {rendered} assigned to field {field}")]
    NonIdempotentFieldAssignment { rendered: String, field: String },
}

impl AnalysisError {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        AnalysisError::UnsupportedConstruct {
            reason: reason.into(),
        }
    }

    /// Stable short code, used by the CLI's machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::UnsupportedConstruct { .. } => "unsupported-construct",
            AnalysisError::DuplicateFieldAssignment { .. } => "duplicate-field-assignment",
            AnalysisError::IllegalSuperDelegationWithArguments => "illegal-super-delegation",
            AnalysisError::IllegalSelfDelegation => "illegal-self-delegation",
            AnalysisError::NonIdempotentFieldAssignment { .. } => "non-idempotent-assignment",
        }
    }
}

/// A failed analysis, attributed to the type whose constructor it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFailure {
    pub declaring_class: String,
    pub error: AnalysisError,
}

impl Display for TypeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.declaring_class, self.error)
    }
}

/// Every failure of a batch, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatedErrors {
    pub failures: Vec<TypeFailure>,
}

impl Display for AccumulatedErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} constructor(s) failed analysis:\n{}",
            self.failures.len(),
            self.failures.iter().map(|failure| format!("  {}", failure)).join("\n")
        )
    }
}

impl std::error::Error for AccumulatedErrors {}
