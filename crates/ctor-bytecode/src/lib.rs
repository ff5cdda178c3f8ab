mod builder;
mod instr;

pub use builder::BodyBuilder;
pub use instr::{
    parse_method_descriptor, BinOp, Constant, Instruction, Invocation, InvokeKind, TypeKind,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BODY_FILE_MAGIC: [u8; 4] = *b"CTOR";
pub const BODY_FILE_VERSION: u32 = 1;

/// Name the class-file format gives every instance initializer.
pub const INITIALIZER_NAME: &str = "<init>";

/// One decoded constructor, ready for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorBody {
    pub declaring_class: String,
    pub superclass: String,
    pub parameters: Vec<TypeKind>,
    pub instructions: Vec<Instruction>,
}

impl ConstructorBody {
    /// Local slots used by `this` plus every parameter.
    pub fn parameter_slots(&self) -> usize {
        1 + self
            .parameters
            .iter()
            .map(TypeKind::slot_width)
            .sum::<usize>()
    }

    pub fn descriptor(&self) -> String {
        let args: String = self.parameters.iter().map(TypeKind::descriptor).collect();
        format!("({})V", args)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyFile {
    pub version: u32,
    pub bodies: Vec<ConstructorBody>,
}

#[derive(Debug, Error)]
pub enum BytecodeError {
    #[error("body encode failed: {0}")]
    Encode(#[from] bincode::Error),
    #[error("body decode failed: {0}")]
    Decode(bincode::Error),
    #[error("body json failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("body format error: {message}")]
    Format { message: String },
    #[error("invalid descriptor {descriptor:?}: {message}")]
    Descriptor { descriptor: String, message: String },
}

const HEADER_LEN: usize = BODY_FILE_MAGIC.len() + 4;

/// Writes `bodies` as a `CTOR` container: magic, little-endian version, then
/// the bincode payload.
pub fn encode_file(bodies: &[ConstructorBody]) -> Result<Vec<u8>, BytecodeError> {
    let payload = bincode::serialize(&BodyFile {
        version: BODY_FILE_VERSION,
        bodies: bodies.to_vec(),
    })?;
    let mut encoded = Vec::with_capacity(HEADER_LEN + payload.len());
    encoded.extend_from_slice(&BODY_FILE_MAGIC);
    encoded.extend_from_slice(&BODY_FILE_VERSION.to_le_bytes());
    encoded.extend_from_slice(&payload);
    Ok(encoded)
}

/// Splits a container into its header version and payload.
fn split_header(bytes: &[u8]) -> Result<(u32, &[u8]), BytecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(format_error(format!(
            "{} bytes is too short for a body file",
            bytes.len()
        )));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    let (magic, version) = header.split_at(BODY_FILE_MAGIC.len());
    if magic != BODY_FILE_MAGIC {
        return Err(format_error("not a constructor body file (missing CTOR magic)"));
    }
    let version = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
    Ok((version, payload))
}

/// Reads a `CTOR` container and checks every body in it.
pub fn decode_file(bytes: &[u8]) -> Result<BodyFile, BytecodeError> {
    let (version, payload) = split_header(bytes)?;
    if version != BODY_FILE_VERSION {
        return Err(format_error(format!(
            "body file version {} cannot be read, this build reads version {}",
            version, BODY_FILE_VERSION
        )));
    }
    let file: BodyFile = bincode::deserialize(payload).map_err(BytecodeError::Decode)?;
    if file.version != version {
        return Err(format_error(format!(
            "header says version {} but the payload says {}",
            version, file.version
        )));
    }
    file.bodies.iter().try_for_each(validate_body)?;
    Ok(file)
}

fn format_error(message: impl Into<String>) -> BytecodeError {
    BytecodeError::Format {
        message: message.into(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonBodies {
    Many(Vec<ConstructorBody>),
    One(ConstructorBody),
}

/// Reads either a single body or a list of bodies.
pub fn bodies_from_json(text: &str) -> Result<Vec<ConstructorBody>, BytecodeError> {
    let bodies = match serde_json::from_str(text)? {
        JsonBodies::Many(bodies) => bodies,
        JsonBodies::One(body) => vec![body],
    };
    for body in &bodies {
        validate_body(body)?;
    }
    Ok(bodies)
}

pub fn bodies_to_json(bodies: &[ConstructorBody]) -> Result<String, BytecodeError> {
    Ok(serde_json::to_string_pretty(bodies)?)
}

/// Structural checks that do not depend on the analysis dialect.
pub fn validate_body(body: &ConstructorBody) -> Result<(), BytecodeError> {
    if body.declaring_class.trim().is_empty() {
        return Err(format_error("constructor has no declaring class"));
    }
    if body.superclass.trim().is_empty() {
        return Err(format_error(format!(
            "constructor of {} has no superclass",
            body.declaring_class
        )));
    }
    if body.parameter_slots() > u16::MAX as usize {
        return Err(format_error(format!(
            "constructor of {} declares {} parameter slots, more than a method can address",
            body.declaring_class,
            body.parameter_slots()
        )));
    }
    Ok(())
}

pub fn format_body(body: &ConstructorBody) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{}.<init>{} extends {}\n",
        body.declaring_class,
        body.descriptor(),
        body.superclass
    ));
    let mut slot = 1;
    for (index, param) in body.parameters.iter().enumerate() {
        output.push_str(&format!("  p{} : {} @ slot {}\n", index, param, slot));
        slot += param.slot_width();
    }
    for (offset, instr) in body.instructions.iter().enumerate() {
        output.push_str(&format!("  {:>4}: {}\n", offset, instr));
    }
    output
}
