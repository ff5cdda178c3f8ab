//! Constructor analysis
//!
//! Symbolically executes the body of a single object initializer to decide
//! whether it is *trivial*: it may call the no-argument superclass
//! constructor and then stores each field from at most one parameter,
//! optionally through a primitive boxing or unboxing call. For trivial
//! constructors the analysis recovers which parameter feeds which field.
//!
//! ```text
//! instructions -> Interpreter -> ExecutionState -> validator -> AnalysisResult
//! ```

pub mod batch;
pub mod boxing;
pub mod error;
pub mod interpreter;
pub mod options;
pub mod state;
pub mod validator;
pub mod value;

use std::collections::BTreeMap;

use ctor_bytecode::{ConstructorBody, TypeKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use batch::{analyze_all, AnalysisReport};
pub use error::{AccumulatedErrors, AnalysisError, TypeFailure};
pub use interpreter::Interpreter;
pub use options::AnalyzerOptions;
pub use state::ExecutionState;
pub use value::{Cells, SymbolicValue};

/// The parameter that supplies a field, and its declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBinding {
    pub parameter: usize,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub fields: BTreeMap<String, FieldBinding>,
    pub parameter_names: Option<Vec<String>>,
}

impl AnalysisResult {
    pub fn parameter_of(&self, field: &str) -> Option<usize> {
        self.fields.get(field).map(|binding| binding.parameter)
    }
}

pub fn analyze_constructor(body: &ConstructorBody) -> Result<AnalysisResult, AnalysisError> {
    analyze_with(body, &AnalyzerOptions::default())
}

pub fn analyze_with(
    body: &ConstructorBody,
    options: &AnalyzerOptions,
) -> Result<AnalysisResult, AnalysisError> {
    let state = Interpreter::new(body, options).run()?;
    let fields = validator::validate(&state)?;
    debug!(
        class = %body.declaring_class,
        descriptor = %body.descriptor(),
        fields = fields.len(),
        "trivial constructor"
    );
    Ok(AnalysisResult {
        fields,
        parameter_names: state.parameter_names(),
    })
}
