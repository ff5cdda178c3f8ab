//! Symbolic values produced while interpreting a constructor body.
//!
//! Reference-typed slots hold a [`SymbolicValue::Ref`] pointing into a
//! per-analysis [`Cells`] arena. Calling an instance method through such a
//! slot rebinds the cell to the call expression, so every copy that shares
//! the cell observes the call result.
//!
//! Compound values hold their operands behind `Rc`, so copying a stack entry
//! never copies the expression beneath it. Repeated `dup`s build a DAG, and
//! the traversals below visit each shared node once.

use ctor_bytecode::{BinOp, Constant, TypeKind};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// Nodes printed by [`Cells::render`] before the rest is elided as `...`.
pub const RENDER_NODE_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicValue {
    This,
    Parameter {
        index: usize,
        kind: TypeKind,
    },
    Constant(Constant),
    Int(i64),
    Ref(CellId),
    New(String),
    MethodCall {
        receiver: Rc<SymbolicValue>,
        name: String,
        args: Vec<SymbolicValue>,
    },
    StaticCall {
        owner: String,
        name: String,
        args: Vec<SymbolicValue>,
    },
    FieldRead {
        receiver: Rc<SymbolicValue>,
        name: String,
    },
    StaticField {
        owner: String,
        name: String,
    },
    BinaryOp {
        op: BinOp,
        lhs: Rc<SymbolicValue>,
        rhs: Rc<SymbolicValue>,
    },
}

impl SymbolicValue {
    pub fn is_ref(&self) -> bool {
        matches!(self, SymbolicValue::Ref(_))
    }

    pub fn null() -> Self {
        SymbolicValue::Constant(Constant::Null)
    }
}

/// Arena backing every [`SymbolicValue::Ref`] of one analysis.
///
/// A cell never holds a bare `Ref`; allocation flattens it to the target's
/// content.
#[derive(Debug, Default, Clone)]
pub struct Cells {
    slots: Vec<SymbolicValue>,
}

impl Cells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn alloc(&mut self, value: SymbolicValue) -> CellId {
        let value = match value {
            SymbolicValue::Ref(id) => self.get(id).clone(),
            other => other,
        };
        let id = CellId(self.slots.len() as u32);
        self.slots.push(value);
        id
    }

    pub fn get(&self, id: CellId) -> &SymbolicValue {
        &self.slots[id.index()]
    }

    pub fn set(&mut self, id: CellId, value: SymbolicValue) {
        let value = match value {
            SymbolicValue::Ref(target) => self.get(target).clone(),
            other => other,
        };
        self.slots[id.index()] = value;
    }

    /// Follows `Ref` indirections down to the underlying value.
    pub fn resolve<'a>(&'a self, value: &'a SymbolicValue) -> &'a SymbolicValue {
        match value {
            SymbolicValue::Ref(id) => self.get(*id),
            other => other,
        }
    }

    /// True if `value` is `this`, or a method call whose receiver is.
    pub fn denotes_this(&self, value: &SymbolicValue) -> bool {
        let mut seen = Vec::new();
        let mut current = value;
        loop {
            match current {
                SymbolicValue::This => return true,
                SymbolicValue::Ref(id) => {
                    if seen.contains(id) {
                        return false;
                    }
                    seen.push(*id);
                    current = self.get(*id);
                }
                SymbolicValue::MethodCall { receiver, .. } => current = receiver.as_ref(),
                _ => return false,
            }
        }
    }

    /// True if any `Parameter` is reachable from `value`, through cells and
    /// shared operands alike.
    pub fn contains_parameter(&self, value: &SymbolicValue) -> bool {
        ParameterSearch::default().visit(self, value)
    }

    /// Canonical text of `value`, used in diagnostics.
    pub fn render<'a>(&'a self, value: &'a SymbolicValue) -> Rendered<'a> {
        Rendered { cells: self, value }
    }
}

/// Depth-first reachability over cells and shared nodes. A node that was
/// already visited cannot contribute a parameter the first visit missed.
#[derive(Default)]
struct ParameterSearch {
    seen_cells: HashSet<CellId>,
    seen_nodes: HashSet<*const SymbolicValue>,
}

impl ParameterSearch {
    fn visit(&mut self, cells: &Cells, value: &SymbolicValue) -> bool {
        match value {
            SymbolicValue::Parameter { .. } => true,
            SymbolicValue::Ref(id) => self.seen_cells.insert(*id) && self.visit(cells, cells.get(*id)),
            SymbolicValue::MethodCall { receiver, args, .. } => {
                self.visit_shared(cells, receiver)
                    || args.iter().any(|arg| self.visit(cells, arg))
            }
            SymbolicValue::StaticCall { args, .. } => {
                args.iter().any(|arg| self.visit(cells, arg))
            }
            SymbolicValue::FieldRead { receiver, .. } => self.visit_shared(cells, receiver),
            SymbolicValue::BinaryOp { lhs, rhs, .. } => {
                self.visit_shared(cells, lhs) || self.visit_shared(cells, rhs)
            }
            SymbolicValue::This
            | SymbolicValue::Constant(_)
            | SymbolicValue::Int(_)
            | SymbolicValue::New(_)
            | SymbolicValue::StaticField { .. } => false,
        }
    }

    fn visit_shared(&mut self, cells: &Cells, value: &Rc<SymbolicValue>) -> bool {
        self.seen_nodes.insert(Rc::as_ptr(value)) && self.visit(cells, value)
    }
}

pub struct Rendered<'a> {
    cells: &'a Cells,
    value: &'a SymbolicValue,
}

impl Rendered<'_> {
    fn write_value(
        &self,
        f: &mut Formatter<'_>,
        value: &SymbolicValue,
        path: &mut Vec<CellId>,
        budget: &mut usize,
    ) -> fmt::Result {
        if *budget == 0 {
            return write!(f, "...");
        }
        *budget -= 1;
        match value {
            SymbolicValue::This => write!(f, "this"),
            SymbolicValue::Parameter { index, .. } => write!(f, "p{}", index),
            SymbolicValue::Constant(constant) => write!(f, "{}", constant),
            SymbolicValue::Int(value) => write!(f, "{}", value),
            SymbolicValue::Ref(id) => {
                if path.contains(id) {
                    return write!(f, "<cycle>");
                }
                path.push(*id);
                let result = self.write_value(f, self.cells.get(*id), path, budget);
                path.pop();
                result
            }
            SymbolicValue::New(type_name) => write!(f, "new {}", type_name),
            SymbolicValue::MethodCall {
                receiver,
                name,
                args,
            } => {
                self.write_value(f, receiver, path, budget)?;
                write!(f, ".{}(", name)?;
                self.write_args(f, args, path, budget)?;
                write!(f, ")")
            }
            SymbolicValue::StaticCall { owner, name, args } => {
                write!(f, "{}.{}(", owner, name)?;
                self.write_args(f, args, path, budget)?;
                write!(f, ")")
            }
            SymbolicValue::FieldRead { receiver, name } => {
                self.write_value(f, receiver, path, budget)?;
                write!(f, ".{}", name)
            }
            SymbolicValue::StaticField { owner, name } => write!(f, "{}#{}", owner, name),
            SymbolicValue::BinaryOp { op, lhs, rhs } => {
                self.write_value(f, lhs, path, budget)?;
                write!(f, " {} ", op.symbol())?;
                self.write_value(f, rhs, path, budget)
            }
        }
    }

    fn write_args(
        &self,
        f: &mut Formatter<'_>,
        args: &[SymbolicValue],
        path: &mut Vec<CellId>,
        budget: &mut usize,
    ) -> fmt::Result {
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            self.write_value(f, arg, path, budget)?;
        }
        Ok(())
    }
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut budget = RENDER_NODE_LIMIT;
        self.write_value(f, self.value, &mut Vec::new(), &mut budget)
    }
}
