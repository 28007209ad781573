//! Statement Compilation Module
//!
//! Routes a classified statement to the symbol table and, for expression
//! assignments, to the expression pipeline. Each helper returns the complete
//! instruction list for its statement or an error; nothing is emitted for a
//! statement that fails.
//!
//! ## Architecture
//! - **Declarations** bind a new slot and initialise it.
//! - **Assignments** resolve the target first, then store a literal or the
//!   value of an expression.
//! - **Returns** load the returned value into `$v0`.

use crate::ast::{ClassifiedStatement, ExprText, Ident, Literal};
use crate::codegen::{CodeGenError, Compiler};
use crate::compiler::generators::expression::compile_expression;
use crate::compiler::values::{parse_literal, Instruction, LiteralValue, Register, ACCUMULATOR};
use log::trace;

pub fn compile_statement(
    compiler: &mut Compiler,
    stmt: &ClassifiedStatement,
) -> Result<Vec<Instruction>, CodeGenError> {
    trace!("compiling {stmt:?}");
    match stmt {
        ClassifiedStatement::Declaration { name, init } => {
            compile_declaration(compiler, name, init.as_ref())
        }
        ClassifiedStatement::LiteralAssignment { name, value } => {
            compile_literal_assign(compiler, name, value)
        }
        ClassifiedStatement::ExpressionAssignment { name, expr } => {
            compile_expr_assign(compiler, name, expr)
        }
        ClassifiedStatement::Return { name } => compile_return(compiler, name.as_ref()),
    }
}

/// The classifier only hands over digit runs, so the one way this can fail
/// is a value too large for a word.
fn word(literal: &Literal) -> Result<i32, CodeGenError> {
    match parse_literal(&literal.text) {
        LiteralValue::Word(value) => Ok(value),
        LiteralValue::OutOfRange | LiteralValue::NotALiteral => {
            Err(CodeGenError::LiteralOutOfRange {
                text: literal.text.clone(),
                span: literal.span.clone(),
            })
        }
    }
}

/// Compiles `int name;` or `int name = value;`.
///
/// An explicit initializer is always stored, `= 0` included; only a missing
/// one falls back to storing `$zero`.
pub fn compile_declaration(
    compiler: &mut Compiler,
    name: &Ident,
    init: Option<&Literal>,
) -> Result<Vec<Instruction>, CodeGenError> {
    let value = init.map(word).transpose()?;
    let location = compiler
        .symbols
        .declare(&name.name)
        .map_err(|err| CodeGenError::from_symbol(err, name.span.clone()))?;

    Ok(match value {
        Some(value) => vec![
            Instruction::li(ACCUMULATOR, value)
                .with_comment(format!("Declaration: {} = {value}", name.name)),
            Instruction::sw(ACCUMULATOR, location),
        ],
        None => vec![Instruction::sw(Register::Zero, location)
            .with_comment(format!("Declaration: {} (int)", name.name))],
    })
}

/// Compiles `name = value;` where `value` is a literal.
pub fn compile_literal_assign(
    compiler: &mut Compiler,
    name: &Ident,
    value: &Literal,
) -> Result<Vec<Instruction>, CodeGenError> {
    let location = compiler
        .symbols
        .lookup(&name.name)
        .map_err(|err| CodeGenError::from_symbol(err, name.span.clone()))?;
    let value = word(value)?;
    Ok(vec![
        Instruction::li(ACCUMULATOR, value)
            .with_comment(format!("Assignment: {} = {value}", name.name)),
        Instruction::sw(ACCUMULATOR, location),
    ])
}

/// Compiles `name = <expression>;`.
pub fn compile_expr_assign(
    compiler: &mut Compiler,
    name: &Ident,
    expr: &ExprText,
) -> Result<Vec<Instruction>, CodeGenError> {
    let location = compiler
        .symbols
        .lookup(&name.name)
        .map_err(|err| CodeGenError::from_symbol(err, name.span.clone()))?;
    let (mut instructions, result) = compile_expression(compiler, expr)?;
    instructions.push(
        Instruction::sw(result, location).with_comment(format!("Store result in {}", name.name)),
    );
    Ok(instructions)
}

/// Compiles `return name;` or `return;`.
pub fn compile_return(
    compiler: &mut Compiler,
    name: Option<&Ident>,
) -> Result<Vec<Instruction>, CodeGenError> {
    match name {
        Some(name) => {
            let location = compiler
                .symbols
                .lookup(&name.name)
                .map_err(|err| CodeGenError::from_symbol(err, name.span.clone()))?;
            Ok(vec![Instruction::lw(Register::V0, location)
                .with_comment(format!("Return: {}", name.name))])
        }
        None => Ok(vec![
            Instruction::mov(Register::V0, Register::Zero).with_comment("Return: void")
        ]),
    }
}
