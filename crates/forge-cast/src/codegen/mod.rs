//! Code generation
//!
//! - `writer`: indentation-aware line buffer and the Black-style wrapping
//!   helpers
//! - `python`: the Python target (modules, types, members, docstrings)

pub mod python;
pub mod writer;

pub use python::{GeneratedModule, PythonGenerator};
pub use writer::CodeWriter;
