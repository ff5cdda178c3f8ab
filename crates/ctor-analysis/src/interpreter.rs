//! Symbolic execution of a constructor body.

use std::rc::Rc;

use ctor_bytecode::{ConstructorBody, Instruction, Invocation};
use tracing::{trace, warn};

use crate::error::AnalysisError;
use crate::options::AnalyzerOptions;
use crate::state::ExecutionState;
use crate::value::SymbolicValue;

enum Flow {
    Continue,
    Return,
}

pub struct Interpreter<'a> {
    body: &'a ConstructorBody,
    options: &'a AnalyzerOptions,
}

impl<'a> Interpreter<'a> {
    pub fn new(body: &'a ConstructorBody, options: &'a AnalyzerOptions) -> Self {
        Self { body, options }
    }

    /// Runs the body to its `return`, yielding the final state.
    pub fn run(&self) -> Result<ExecutionState, AnalysisError> {
        let instructions = &self.body.instructions;
        if instructions.len() > self.options.max_instructions {
            return Err(AnalysisError::unsupported(format!(
                "{} instructions exceed the limit of {}",
                instructions.len(),
                self.options.max_instructions
            )));
        }

        let mut state = ExecutionState::new(&self.body.parameters);
        for (offset, instr) in instructions.iter().enumerate() {
            trace!(offset, %instr, depth = state.stack_depth(), "interpret");
            match self.execute_instr(instr, &mut state)? {
                Flow::Continue => {}
                Flow::Return => {
                    if offset + 1 != instructions.len() {
                        return Err(AnalysisError::unsupported(format!(
                            "instructions follow the return at {}",
                            offset
                        )));
                    }
                    return Ok(state);
                }
            }
        }
        Err(AnalysisError::unsupported("body ends without returning"))
    }

    fn execute_instr(
        &self,
        instr: &Instruction,
        state: &mut ExecutionState,
    ) -> Result<Flow, AnalysisError> {
        match instr {
            Instruction::GetStatic { owner, name, kind } => {
                state.push(
                    kind.is_reference(),
                    SymbolicValue::StaticField {
                        owner: owner.clone(),
                        name: name.clone(),
                    },
                );
            }
            Instruction::GetField { name, kind } => {
                let receiver = state.pop()?;
                let receiver = state.cells().resolve(&receiver).clone();
                state.push(
                    kind.is_reference(),
                    SymbolicValue::FieldRead {
                        receiver: Rc::new(receiver),
                        name: name.clone(),
                    },
                );
            }
            Instruction::PutField { name } => {
                let value = state.pop()?;
                let receiver = state.pop()?;
                if state.cells().denotes_this(&receiver) {
                    state.assign(name, value)?;
                } else {
                    warn!(
                        field = %name,
                        receiver = %state.cells().render(&receiver),
                        "ignoring store to a field of another object"
                    );
                }
            }
            Instruction::ReturnVoid => {
                if state.stack_depth() != 0 {
                    return Err(AnalysisError::unsupported(format!(
                        "return with {} values left on the stack",
                        state.stack_depth()
                    )));
                }
                return Ok(Flow::Return);
            }
            Instruction::PushNull => {
                let null = state.alloc(SymbolicValue::null());
                state.push_literal(SymbolicValue::Ref(null));
            }
            Instruction::PushInt(value) => state.push_literal(SymbolicValue::Int(*value)),
            Instruction::PushConst(constant) => {
                state.push(
                    constant.is_reference(),
                    SymbolicValue::Constant(constant.clone()),
                );
            }
            Instruction::Pop => {
                state.pop()?;
            }
            // Every value is one stack entry whatever its width, so a `long`
            // result discarded with pop2 underflows.
            Instruction::Pop2 => {
                state.pop()?;
                state.pop()?;
            }
            Instruction::Dup => {
                // shallow: operands stay shared, cells stay shared
                let top = state.peek()?.clone();
                state.push_literal(top);
            }
            Instruction::BinaryOp(op) => {
                let rhs = state.pop()?;
                let lhs = state.pop()?;
                state.push_literal(SymbolicValue::BinaryOp {
                    op: *op,
                    lhs: Rc::new(lhs),
                    rhs: Rc::new(rhs),
                });
            }
            Instruction::LoadLocal(slot) => {
                let value = state.load_local(*slot as usize)?;
                state.push_literal(value);
            }
            Instruction::LocalName { slot, name } => {
                state.record_parameter_name(*slot as usize, name);
            }
            Instruction::Invoke(call) => self.invoke(call, state)?,
            Instruction::New(type_name) => {
                let object = state.alloc(SymbolicValue::New(type_name.clone()));
                state.push_literal(SymbolicValue::Ref(object));
            }
            Instruction::Other { mnemonic } => {
                return Err(AnalysisError::unsupported(format!(
                    "instruction {} is outside the accepted dialect",
                    mnemonic
                )));
            }
        }
        Ok(Flow::Continue)
    }

    fn invoke(&self, call: &Invocation, state: &mut ExecutionState) -> Result<(), AnalysisError> {
        let is_initializer = call.name == self.options.initializer_name;
        if is_initializer && call.owner == self.body.superclass {
            if !call.args.is_empty() {
                return Err(AnalysisError::IllegalSuperDelegationWithArguments);
            }
            state.pop()?;
            return Ok(());
        }
        if is_initializer && call.owner == self.body.declaring_class {
            return Err(AnalysisError::IllegalSelfDelegation);
        }

        let args = state.pop_n(call.args.len())?;
        let result = if call.is_static() {
            SymbolicValue::StaticCall {
                owner: call.owner.clone(),
                name: call.name.clone(),
                args,
            }
        } else {
            let receiver = state.pop()?;
            match receiver {
                SymbolicValue::Ref(id) => {
                    let old = state.cells().get(id).clone();
                    state.rebind(
                        id,
                        SymbolicValue::MethodCall {
                            receiver: Rc::new(old),
                            name: call.name.clone(),
                            args,
                        },
                    );
                    SymbolicValue::Ref(id)
                }
                other => SymbolicValue::MethodCall {
                    receiver: Rc::new(other),
                    name: call.name.clone(),
                    args,
                },
            }
        };

        if let Some(returns) = &call.returns {
            state.push(returns.is_reference(), result);
        }
        Ok(())
    }
}
