//! Compiles a tiny integer language (declarations, assignments, returns and
//! `+ - * /` arithmetic) into MIPS assembly for SPIM/MARS.
//!
//! - `parser` classifies each source line into a statement.
//! - `lowering` turns expression text into postfix order.
//! - `compiler` holds the symbol table, temporaries and code generators.
//! - `codegen` is the whole-program session that strings them together.
//! - `error` renders diagnostics.

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod lowering;
pub mod parser;

pub use codegen::{CodeGenError, Compilation, Compiler, CompilerOptions, Strategy};
pub use error::{CompileError, Diagnostic};

/// Compiles a whole source file into an assembly listing plus diagnostics.
pub fn compile_source(source: &str, options: CompilerOptions) -> Compilation {
    let program = parser::parse_program(source);
    Compiler::new(options).compile_program(&program)
}
