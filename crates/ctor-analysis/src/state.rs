use ctor_bytecode::TypeKind;

use crate::error::AnalysisError;
use crate::value::{CellId, Cells, SymbolicValue};

/// Mutable machine state of one constructor analysis.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    cells: Cells,
    parameters: Vec<TypeKind>,
    locals: Vec<SymbolicValue>,
    stack: Vec<SymbolicValue>,
    assignments: Vec<(String, SymbolicValue)>,
    parameter_names: Option<Vec<Option<String>>>,
}

impl ExecutionState {
    /// Slot 0 holds `this`; parameters follow, wide ones taking two slots
    /// bound to the same value.
    pub fn new(parameters: &[TypeKind]) -> Self {
        let mut cells = Cells::new();
        let mut locals = vec![SymbolicValue::This];
        for (index, kind) in parameters.iter().enumerate() {
            let param = SymbolicValue::Parameter {
                index,
                kind: kind.clone(),
            };
            let value = if kind.is_reference() {
                SymbolicValue::Ref(cells.alloc(param))
            } else {
                param
            };
            for _ in 0..kind.slot_width() {
                locals.push(value.clone());
            }
        }
        Self {
            cells,
            parameters: parameters.to_vec(),
            locals,
            stack: Vec::new(),
            assignments: Vec::new(),
            parameter_names: None,
        }
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn parameters(&self) -> &[TypeKind] {
        &self.parameters
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push_literal(&mut self, value: SymbolicValue) {
        self.stack.push(value);
    }

    /// Reference-typed values always sit on the stack behind a cell, so any
    /// of them can later be rebound by a method call.
    pub fn push(&mut self, is_reference: bool, value: SymbolicValue) {
        let value = if is_reference && !value.is_ref() {
            SymbolicValue::Ref(self.cells.alloc(value))
        } else {
            value
        };
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<SymbolicValue, AnalysisError> {
        self.stack
            .pop()
            .ok_or_else(|| AnalysisError::unsupported("operand stack underflow"))
    }

    pub fn peek(&self) -> Result<&SymbolicValue, AnalysisError> {
        self.stack
            .last()
            .ok_or_else(|| AnalysisError::unsupported("operand stack underflow"))
    }

    /// Pops `count` values, returning them in push order.
    pub fn pop_n(&mut self, count: usize) -> Result<Vec<SymbolicValue>, AnalysisError> {
        if count > self.stack.len() {
            return Err(AnalysisError::unsupported(format!(
                "call needs {} arguments but the stack holds {}",
                count,
                self.stack.len()
            )));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    /// A copy of a local slot. Reference locals are copied into a fresh cell
    /// so that rebinding the copy leaves the local untouched.
    pub fn load_local(&mut self, slot: usize) -> Result<SymbolicValue, AnalysisError> {
        let value = self.locals.get(slot).cloned().ok_or_else(|| {
            AnalysisError::unsupported(format!(
                "load of local slot {} outside the {} parameter slots",
                slot,
                self.locals.len()
            ))
        })?;
        Ok(match value {
            SymbolicValue::Ref(id) => SymbolicValue::Ref(self.cells.alloc(SymbolicValue::Ref(id))),
            other => other,
        })
    }

    pub fn alloc(&mut self, value: SymbolicValue) -> CellId {
        self.cells.alloc(value)
    }

    pub fn rebind(&mut self, id: CellId, value: SymbolicValue) {
        self.cells.set(id, value);
    }

    pub fn assign(&mut self, field: &str, value: SymbolicValue) -> Result<(), AnalysisError> {
        if self.assignments.iter().any(|(name, _)| name == field) {
            return Err(AnalysisError::DuplicateFieldAssignment {
                field: field.to_string(),
            });
        }
        self.assignments.push((field.to_string(), value));
        Ok(())
    }

    /// Field assignments in the order the body performed them.
    pub fn assignments(&self) -> &[(String, SymbolicValue)] {
        &self.assignments
    }

    /// Maps a debug-named local slot back to its parameter. Slot 0, the upper
    /// half of a wide parameter, and slots past the parameters are ignored.
    pub fn record_parameter_name(&mut self, slot: usize, name: &str) {
        if slot == 0 {
            return;
        }
        let Some(index) = self.parameter_at_slot(slot) else {
            return;
        };
        let count = self.parameters.len();
        let names = self.parameter_names.get_or_insert_with(|| vec![None; count]);
        names[index] = Some(name.to_string());
    }

    fn parameter_at_slot(&self, slot: usize) -> Option<usize> {
        let mut next = 1;
        for (index, kind) in self.parameters.iter().enumerate() {
            if next == slot {
                return Some(index);
            }
            next += kind.slot_width();
            if next > slot {
                return None;
            }
        }
        None
    }

    /// Names of all parameters, present only if every one was recorded.
    pub fn parameter_names(&self) -> Option<Vec<String>> {
        self.parameter_names
            .as_ref()
            .and_then(|names| names.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state() -> ExecutionState {
        ExecutionState::new(&[
            TypeKind::Int,
            TypeKind::Double,
            TypeKind::reference("java.lang.String"),
        ])
    }

    #[test]
    fn locals_follow_slot_layout() {
        let mut state = state();
        assert_eq!(state.load_local(0).unwrap(), SymbolicValue::This);
        assert_eq!(
            state.load_local(1).unwrap(),
            SymbolicValue::Parameter {
                index: 0,
                kind: TypeKind::Int
            }
        );
        assert_eq!(state.load_local(2).unwrap(), state.load_local(3).unwrap());
        let string = state.load_local(4).unwrap();
        assert!(string.is_ref());
        assert_eq!(
            state.cells().resolve(&string),
            &SymbolicValue::Parameter {
                index: 2,
                kind: TypeKind::reference("java.lang.String")
            }
        );
        assert!(state.load_local(5).is_err());
    }

    #[test]
    fn push_wraps_only_unwrapped_references() {
        let mut state = state();
        state.push(true, SymbolicValue::New("Foo".to_string()));
        assert!(state.peek().unwrap().is_ref());
        let wrapped = state.pop().unwrap();
        let cells_before = state.cells().len();
        state.push(true, wrapped.clone());
        assert_eq!(state.cells().len(), cells_before);
        assert_eq!(state.pop().unwrap(), wrapped);

        state.push(false, SymbolicValue::Int(1));
        assert_eq!(state.pop().unwrap(), SymbolicValue::Int(1));
        assert!(state.pop().is_err());
    }

    #[test]
    fn assign_rejects_second_write() {
        let mut state = state();
        state.assign("a", SymbolicValue::Int(1)).unwrap();
        let err = state.assign("a", SymbolicValue::Int(2)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DuplicateFieldAssignment {
                field: "a".to_string()
            }
        );
    }

    #[test]
    fn parameter_names_map_back_through_wide_slots() {
        let mut state = state();
        state.record_parameter_name(0, "this");
        state.record_parameter_name(1, "count");
        state.record_parameter_name(3, "ignored");
        state.record_parameter_name(9, "local");
        assert_eq!(state.parameter_names(), None);
        state.record_parameter_name(2, "ratio");
        state.record_parameter_name(4, "label");
        assert_eq!(
            state.parameter_names(),
            Some(vec![
                "count".to_string(),
                "ratio".to_string(),
                "label".to_string()
            ])
        );
    }

    #[test]
    fn pop_n_keeps_push_order() {
        let mut state = state();
        state.push_literal(SymbolicValue::Int(1));
        state.push_literal(SymbolicValue::Int(2));
        state.push_literal(SymbolicValue::Int(3));
        assert_eq!(
            state.pop_n(2).unwrap(),
            vec![SymbolicValue::Int(2), SymbolicValue::Int(3)]
        );
        assert_eq!(state.stack_depth(), 1);
        assert!(state.pop_n(2).is_err());
    }
}
