use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::BytecodeError;

/// Static type of a value as seen by the constructor body.
///
/// `Long` and `Double` occupy two local slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Reference(String),
}

impl TypeKind {
    pub fn reference(class_name: impl Into<String>) -> Self {
        TypeKind::Reference(class_name.into())
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeKind::Reference(_))
    }

    pub fn is_wide(&self) -> bool {
        matches!(self, TypeKind::Long | TypeKind::Double)
    }

    /// Number of local variable slots a value of this kind occupies.
    pub fn slot_width(&self) -> usize {
        if self.is_wide() {
            2
        } else {
            1
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeKind::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Parses a single field descriptor such as `I` or `Ljava/lang/String;`.
    ///
    /// Class names are stored in dotted form. Array descriptors are kept
    /// verbatim as opaque reference types.
    pub fn parse_descriptor(descriptor: &str) -> Result<Self, BytecodeError> {
        let (kind, rest) = parse_field_type(descriptor)?;
        if !rest.is_empty() {
            return Err(BytecodeError::Descriptor {
                descriptor: descriptor.to_string(),
                message: format!("trailing characters {:?}", rest),
            });
        }
        Ok(kind)
    }

    pub fn descriptor(&self) -> String {
        match self {
            TypeKind::Boolean => "Z".to_string(),
            TypeKind::Byte => "B".to_string(),
            TypeKind::Char => "C".to_string(),
            TypeKind::Short => "S".to_string(),
            TypeKind::Int => "I".to_string(),
            TypeKind::Long => "J".to_string(),
            TypeKind::Float => "F".to_string(),
            TypeKind::Double => "D".to_string(),
            TypeKind::Reference(name) if name.starts_with('[') => name.clone(),
            TypeKind::Reference(name) => format!("L{};", name.replace('.', "/")),
        }
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeKind::Boolean => write!(f, "boolean"),
            TypeKind::Byte => write!(f, "byte"),
            TypeKind::Char => write!(f, "char"),
            TypeKind::Short => write!(f, "short"),
            TypeKind::Int => write!(f, "int"),
            TypeKind::Long => write!(f, "long"),
            TypeKind::Float => write!(f, "float"),
            TypeKind::Double => write!(f, "double"),
            TypeKind::Reference(name) => write!(f, "{}", name),
        }
    }
}

/// Parses a method descriptor such as `(ILjava/lang/String;)V` into its
/// argument kinds and optional return kind.
pub fn parse_method_descriptor(
    descriptor: &str,
) -> Result<(Vec<TypeKind>, Option<TypeKind>), BytecodeError> {
    let error = |message: &str| BytecodeError::Descriptor {
        descriptor: descriptor.to_string(),
        message: message.to_string(),
    };
    let body = descriptor
        .strip_prefix('(')
        .ok_or_else(|| error("method descriptor must start with '('"))?;
    let close = body
        .find(')')
        .ok_or_else(|| error("method descriptor is missing ')'"))?;
    let mut params = &body[..close];
    let returns = &body[close + 1..];

    let mut args = Vec::new();
    while !params.is_empty() {
        let (kind, rest) = parse_field_type(params)?;
        args.push(kind);
        params = rest;
    }

    let returns = match returns {
        "V" => None,
        other => Some(TypeKind::parse_descriptor(other)?),
    };
    Ok((args, returns))
}

fn parse_field_type(input: &str) -> Result<(TypeKind, &str), BytecodeError> {
    let error = |message: String| BytecodeError::Descriptor {
        descriptor: input.to_string(),
        message,
    };
    let mut chars = input.chars();
    let head = chars.next().ok_or_else(|| error("empty descriptor".to_string()))?;
    let rest = chars.as_str();
    let kind = match head {
        'Z' => TypeKind::Boolean,
        'B' => TypeKind::Byte,
        'C' => TypeKind::Char,
        'S' => TypeKind::Short,
        'I' => TypeKind::Int,
        'J' => TypeKind::Long,
        'F' => TypeKind::Float,
        'D' => TypeKind::Double,
        'L' => {
            let end = rest
                .find(';')
                .ok_or_else(|| error("class descriptor is missing ';'".to_string()))?;
            let name = rest[..end].replace('/', ".");
            return Ok((TypeKind::Reference(name), &rest[end + 1..]));
        }
        '[' => {
            let (_, after) = parse_field_type(rest)?;
            let consumed = input.len() - after.len();
            return Ok((TypeKind::Reference(input[..consumed].to_string()), after));
        }
        other => return Err(error(format!("unknown descriptor character {:?}", other))),
    };
    Ok((kind, rest))
}

/// Literal operand of a constant-pool load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(String),
}

impl Constant {
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Constant::Null | Constant::String(_) | Constant::Class(_)
        )
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Null => write!(f, "null"),
            Constant::Int(value) => write!(f, "{}", value),
            Constant::Long(value) => write!(f, "{}L", value),
            Constant::Float(value) => write!(f, "{}f", value),
            Constant::Double(value) => write!(f, "{}", value),
            Constant::String(value) => write!(f, "{:?}", value),
            Constant::Class(name) => write!(f, "{}.class", name),
        }
    }
}

/// Arithmetic and bitwise operators, independent of operand width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Ushr,
    And,
    Or,
    Xor,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Ushr => ">>>",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Rem => "rem",
            BinOp::Shl => "shl",
            BinOp::Shr => "shr",
            BinOp::Ushr => "ushr",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

impl InvokeKind {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            InvokeKind::Virtual => "invokevirtual",
            InvokeKind::Special => "invokespecial",
            InvokeKind::Static => "invokestatic",
            InvokeKind::Interface => "invokeinterface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub kind: InvokeKind,
    pub owner: String,
    pub name: String,
    pub args: Vec<TypeKind>,
    /// `None` for methods returning `void`.
    pub returns: Option<TypeKind>,
}

impl Invocation {
    pub fn is_static(&self) -> bool {
        self.kind == InvokeKind::Static
    }

    pub fn has_return(&self) -> bool {
        self.returns.is_some()
    }

    pub fn descriptor(&self) -> String {
        let args: String = self.args.iter().map(TypeKind::descriptor).collect();
        let returns = self
            .returns
            .as_ref()
            .map(TypeKind::descriptor)
            .unwrap_or_else(|| "V".to_string());
        format!("({}){}", args, returns)
    }
}

/// A decoded constructor instruction.
///
/// Anything the decoder met that has no dedicated shape here is carried as
/// [`Instruction::Other`] with its mnemonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    PushNull,
    PushInt(i64),
    PushConst(Constant),
    Pop,
    Pop2,
    Dup,
    BinaryOp(BinOp),
    LoadLocal(u16),
    GetStatic {
        owner: String,
        name: String,
        kind: TypeKind,
    },
    GetField {
        name: String,
        kind: TypeKind,
    },
    PutField {
        name: String,
    },
    Invoke(Invocation),
    New(String),
    LocalName {
        slot: u16,
        name: String,
    },
    ReturnVoid,
    Other {
        mnemonic: String,
    },
}

impl Instruction {
    pub fn other(mnemonic: impl Into<String>) -> Self {
        Instruction::Other {
            mnemonic: mnemonic.into(),
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::PushNull => write!(f, "aconst_null"),
            Instruction::PushInt(value) => write!(f, "push {}", value),
            Instruction::PushConst(constant) => write!(f, "ldc {}", constant),
            Instruction::Pop => write!(f, "pop"),
            Instruction::Pop2 => write!(f, "pop2"),
            Instruction::Dup => write!(f, "dup"),
            Instruction::BinaryOp(op) => write!(f, "{}", op.mnemonic()),
            Instruction::LoadLocal(slot) => write!(f, "load {}", slot),
            Instruction::GetStatic { owner, name, kind } => {
                write!(f, "getstatic {}#{} : {}", owner, name, kind)
            }
            Instruction::GetField { name, kind } => write!(f, "getfield {} : {}", name, kind),
            Instruction::PutField { name } => write!(f, "putfield {}", name),
            Instruction::Invoke(call) => write!(
                f,
                "{} {}.{}{}",
                call.kind.mnemonic(),
                call.owner,
                call.name,
                call.descriptor()
            ),
            Instruction::New(type_name) => write!(f, "new {}", type_name),
            Instruction::LocalName { slot, name } => write!(f, "local {} {}", slot, name),
            Instruction::ReturnVoid => write!(f, "return"),
            Instruction::Other { mnemonic } => write!(f, "{}", mnemonic),
        }
    }
}
