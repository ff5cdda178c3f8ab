use crate::{
    parse_method_descriptor, BinOp, BytecodeError, Constant, ConstructorBody, Instruction,
    Invocation, InvokeKind, TypeKind, INITIALIZER_NAME,
};

/// Assembles a [`ConstructorBody`] one instruction at a time.
///
/// Method signatures are given as JVM descriptors, so call sites read the
/// way a class-file disassembly does.
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    declaring_class: String,
    superclass: String,
    parameters: Vec<TypeKind>,
    instructions: Vec<Instruction>,
}

impl BodyBuilder {
    pub fn new(declaring_class: impl Into<String>, superclass: impl Into<String>) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            superclass: superclass.into(),
            parameters: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn param(mut self, kind: TypeKind) -> Self {
        self.parameters.push(kind);
        self
    }

    pub fn params(mut self, kinds: impl IntoIterator<Item = TypeKind>) -> Self {
        self.parameters.extend(kinds);
        self
    }

    pub fn push(&mut self, instr: Instruction) -> &mut Self {
        self.instructions.push(instr);
        self
    }

    pub fn aconst_null(&mut self) -> &mut Self {
        self.push(Instruction::PushNull)
    }

    pub fn iconst(&mut self, value: i64) -> &mut Self {
        self.push(Instruction::PushInt(value))
    }

    pub fn ldc(&mut self, constant: Constant) -> &mut Self {
        self.push(Instruction::PushConst(constant))
    }

    pub fn pop(&mut self) -> &mut Self {
        self.push(Instruction::Pop)
    }

    pub fn pop2(&mut self) -> &mut Self {
        self.push(Instruction::Pop2)
    }

    pub fn dup(&mut self) -> &mut Self {
        self.push(Instruction::Dup)
    }

    pub fn binop(&mut self, op: BinOp) -> &mut Self {
        self.push(Instruction::BinaryOp(op))
    }

    pub fn load(&mut self, slot: u16) -> &mut Self {
        self.push(Instruction::LoadLocal(slot))
    }

    /// Loads `this`.
    pub fn load_this(&mut self) -> &mut Self {
        self.load(0)
    }

    pub fn getstatic(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        kind: TypeKind,
    ) -> &mut Self {
        self.push(Instruction::GetStatic {
            owner: owner.into(),
            name: name.into(),
            kind,
        })
    }

    pub fn getfield(&mut self, name: impl Into<String>, kind: TypeKind) -> &mut Self {
        self.push(Instruction::GetField {
            name: name.into(),
            kind,
        })
    }

    pub fn putfield(&mut self, name: impl Into<String>) -> &mut Self {
        self.push(Instruction::PutField { name: name.into() })
    }

    pub fn invoke(
        &mut self,
        kind: InvokeKind,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: &str,
    ) -> Result<&mut Self, BytecodeError> {
        let (args, returns) = parse_method_descriptor(descriptor)?;
        Ok(self.push(Instruction::Invoke(Invocation {
            kind,
            owner: owner.into(),
            name: name.into(),
            args,
            returns,
        })))
    }

    pub fn invokevirtual(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: &str,
    ) -> Result<&mut Self, BytecodeError> {
        self.invoke(InvokeKind::Virtual, owner, name, descriptor)
    }

    pub fn invokestatic(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: &str,
    ) -> Result<&mut Self, BytecodeError> {
        self.invoke(InvokeKind::Static, owner, name, descriptor)
    }

    pub fn invokespecial(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: &str,
    ) -> Result<&mut Self, BytecodeError> {
        self.invoke(InvokeKind::Special, owner, name, descriptor)
    }

    /// `aload_0; invokespecial Super.<init>()V`
    pub fn super_init(&mut self) -> &mut Self {
        let owner = self.superclass.clone();
        self.load_this();
        self.push(Instruction::Invoke(Invocation {
            kind: InvokeKind::Special,
            owner,
            name: INITIALIZER_NAME.to_string(),
            args: Vec::new(),
            returns: None,
        }))
    }

    pub fn new_object(&mut self, type_name: impl Into<String>) -> &mut Self {
        self.push(Instruction::New(type_name.into()))
    }

    pub fn local_name(&mut self, slot: u16, name: impl Into<String>) -> &mut Self {
        self.push(Instruction::LocalName {
            slot,
            name: name.into(),
        })
    }

    pub fn other(&mut self, mnemonic: impl Into<String>) -> &mut Self {
        self.push(Instruction::other(mnemonic))
    }

    pub fn return_void(&mut self) -> &mut Self {
        self.push(Instruction::ReturnVoid)
    }

    /// Slot of the first local belonging to parameter `index`.
    pub fn slot_of(&self, index: usize) -> u16 {
        let offset: usize = self.parameters[..index]
            .iter()
            .map(TypeKind::slot_width)
            .sum();
        (1 + offset) as u16
    }

    pub fn build(&self) -> ConstructorBody {
        ConstructorBody {
            declaring_class: self.declaring_class.clone(),
            superclass: self.superclass.clone(),
            parameters: self.parameters.clone(),
            instructions: self.instructions.clone(),
        }
    }
}
