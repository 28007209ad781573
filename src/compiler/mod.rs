//! Compiler Module
//!
//! The pieces the `Compiler` session is built from.
//!
//! ## Architecture
//! - `symbols`: name-to-slot bindings for the stack frame
//! - `temps`: recycled slots for intermediate results
//! - `values`: registers, instruction records and operand descriptors
//! - `generators`: statement and expression code generation
//! - `runtime`: the fixed program prologue and epilogue

pub mod generators;
pub mod runtime;
pub mod symbols;
pub mod temps;
pub mod values;
