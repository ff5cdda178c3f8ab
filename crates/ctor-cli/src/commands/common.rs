//! Reading and writing constructor body files

use std::path::Path;

use ctor_bytecode::{bodies_from_json, bodies_to_json, decode_file, encode_file, ConstructorBody};
use eyre::{Result, WrapErr};
use tracing::debug;

/// On-disk representation, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Binary,
}

impl BodyFormat {
    /// `.json` files are JSON; anything else is the binary container.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => BodyFormat::Json,
            _ => BodyFormat::Binary,
        }
    }
}

pub fn read_bodies(path: &Path) -> Result<Vec<ConstructorBody>> {
    let format = BodyFormat::of(path);
    let bodies = match format {
        BodyFormat::Json => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            bodies_from_json(&text)
                .wrap_err_with(|| format!("failed to parse {}", path.display()))?
        }
        BodyFormat::Binary => {
            let bytes = std::fs::read(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            decode_file(&bytes)
                .wrap_err_with(|| format!("failed to decode {}", path.display()))?
                .bodies
        }
    };
    debug!(path = %path.display(), ?format, bodies = bodies.len(), "loaded bodies");
    Ok(bodies)
}

pub fn write_bodies(path: &Path, bodies: &[ConstructorBody]) -> Result<()> {
    let bytes = match BodyFormat::of(path) {
        BodyFormat::Json => bodies_to_json(bodies)?.into_bytes(),
        BodyFormat::Binary => encode_file(bodies)?,
    };
    std::fs::write(path, bytes).wrap_err_with(|| format!("failed to write {}", path.display()))
}
