use std::collections::BTreeMap;

use tracing::debug;

use crate::boxing::{is_boxing_call, is_unboxing_call};
use crate::error::AnalysisError;
use crate::state::ExecutionState;
use crate::value::{Cells, SymbolicValue};
use crate::FieldBinding;

/// Decides, per assigned field, whether its value is an unchanged parameter.
///
/// Fields whose value mentions no parameter at all are left out of the
/// mapping; anything else that is not a plain or boxed/unboxed parameter is
/// rejected.
pub fn validate(state: &ExecutionState) -> Result<BTreeMap<String, FieldBinding>, AnalysisError> {
    let cells = state.cells();
    let mut fields = BTreeMap::new();
    for (field, value) in state.assignments() {
        let value = cells.resolve(value);
        if let Some(binding) = trivial_parameter(cells, value) {
            fields.insert(field.clone(), binding);
        } else if !cells.contains_parameter(value) {
            debug!(field = %field, value = %cells.render(value), "field does not depend on parameters");
        } else {
            return Err(AnalysisError::NonIdempotentFieldAssignment {
                rendered: cells.render(value).to_string(),
                field: field.clone(),
            });
        }
    }
    Ok(fields)
}

fn trivial_parameter(cells: &Cells, value: &SymbolicValue) -> Option<FieldBinding> {
    match value {
        SymbolicValue::Parameter { index, kind } => Some(FieldBinding {
            parameter: *index,
            kind: kind.clone(),
        }),
        SymbolicValue::StaticCall { owner, name, args } if is_boxing_call(owner, name) => {
            match args.as_slice() {
                [arg] => match cells.resolve(arg) {
                    SymbolicValue::Parameter { index, kind } => Some(FieldBinding {
                        parameter: *index,
                        kind: kind.clone(),
                    }),
                    _ => None,
                },
                _ => None,
            }
        }
        SymbolicValue::MethodCall {
            receiver,
            name,
            args,
        } if args.is_empty() => match cells.resolve(receiver) {
            SymbolicValue::Parameter { index, kind } if is_unboxing_call(kind, name) => {
                Some(FieldBinding {
                    parameter: *index,
                    kind: kind.clone(),
                })
            }
            _ => None,
        },
        _ => None,
    }
}
