use std::collections::BTreeMap;

use ctor_bytecode::ConstructorBody;
use tracing::{debug, info};

use crate::error::{AccumulatedErrors, AnalysisError, TypeFailure};
use crate::options::AnalyzerOptions;
use crate::{analyze_with, AnalysisResult};

/// Outcome of analyzing many constructors, keyed by declaring class.
#[derive(Debug, Default, Clone)]
pub struct AnalysisReport {
    pub results: BTreeMap<String, AnalysisResult>,
    pub failures: Vec<TypeFailure>,
}

impl AnalysisReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<BTreeMap<String, AnalysisResult>, AccumulatedErrors> {
        if self.failures.is_empty() {
            Ok(self.results)
        } else {
            Err(AccumulatedErrors {
                failures: self.failures,
            })
        }
    }
}

/// Analyzes each body on its own; a failure is recorded against its class
/// and never stops the rest of the batch.
///
/// A class may contribute only one constructor.
pub fn analyze_all(bodies: &[ConstructorBody], options: &AnalyzerOptions) -> AnalysisReport {
    let mut report = AnalysisReport::default();
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for body in bodies {
        *seen.entry(body.declaring_class.as_str()).or_default() += 1;
    }

    for body in bodies {
        let class = &body.declaring_class;
        if seen.get(class.as_str()).copied().unwrap_or_default() > 1 {
            if !report.failures.iter().any(|f| &f.declaring_class == class) {
                report.failures.push(TypeFailure {
                    declaring_class: class.clone(),
                    error: AnalysisError::unsupported(
                        "class has more than one constructor to analyze",
                    ),
                });
            }
            continue;
        }
        match analyze_with(body, options) {
            Ok(result) => {
                report.results.insert(class.clone(), result);
            }
            Err(error) => {
                debug!(class = %class, code = error.code(), "constructor rejected");
                report.failures.push(TypeFailure {
                    declaring_class: class.clone(),
                    error,
                });
            }
        }
    }
    info!(
        analyzed = bodies.len(),
        accepted = report.results.len(),
        rejected = report.failures.len(),
        "batch analysis finished"
    );
    report
}
