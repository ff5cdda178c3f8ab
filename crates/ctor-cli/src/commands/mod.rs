//! Command implementations for the `ctor` CLI

pub mod analyze;
pub mod common;
pub mod convert;
pub mod disasm;

// Re-export command functions
pub use analyze::analyze_command;
pub use convert::convert_command;
pub use disasm::disasm_command;
