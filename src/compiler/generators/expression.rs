//! Expression Compilation Module
//!
//! Walks a postfix sequence with an operand stack and emits MIPS arithmetic.
//!
//! ## Register discipline
//! - The left operand of every operation is loaded into `$t0`, the right one
//!   into `$t1`, and the result is left in `$t0`.
//! - Under [`Strategy::Accumulator`] the result stays in `$t0` until it is
//!   consumed. If another operation must run first (`a * b + c * d`), the
//!   pending value is spilled to a pooled temporary before `$t0` is reused.
//! - Under [`Strategy::Materialize`] every result is stored to a pooled
//!   temporary straight away.
//!
//! A temporary returns to the pool only after the instruction reading it has
//! been emitted. Temporaries still pending when an error aborts the
//! expression are returned as well, so the pool is balanced after every call.

use crate::ast::{BinOp, ExprText, Postfix, PostfixToken, Span};
use crate::codegen::{CodeGenError, Compiler, ExprProblem, Strategy};
use crate::compiler::symbols::SymbolTable;
use crate::compiler::temps::TempPool;
use crate::compiler::values::{
    parse_literal, Instruction, LiteralValue, Operand, Register, ACCUMULATOR, SCRATCH,
};
use crate::lowering::lower_expression;
use log::trace;

/// Compiles `expr` so that its value ends up in the returned register.
pub fn compile_expression(
    compiler: &mut Compiler,
    expr: &ExprText,
) -> Result<(Vec<Instruction>, Register), CodeGenError> {
    let postfix = lower_expression(expr)?;
    let span = expr.offset..expr.offset + expr.text.len();
    generate_postfix(
        &mut compiler.symbols,
        &mut compiler.temps,
        compiler.options.strategy,
        &postfix,
        span,
    )
}

/// Emits code for an already lowered expression. `span` covers the whole
/// expression and is used for errors that have no better anchor.
pub fn generate_postfix(
    symbols: &mut SymbolTable,
    temps: &mut TempPool,
    strategy: Strategy,
    postfix: &Postfix,
    span: Span,
) -> Result<(Vec<Instruction>, Register), CodeGenError> {
    let mut generator = PostfixGenerator {
        symbols,
        temps,
        strategy,
        stack: Vec::new(),
        out: Vec::new(),
    };
    let result = generator.run(postfix, span);
    if result.is_err() {
        generator.release_pending();
    }
    result.map(|register| (generator.out, register))
}

struct PostfixGenerator<'a> {
    symbols: &'a mut SymbolTable,
    temps: &'a mut TempPool,
    strategy: Strategy,
    stack: Vec<Operand>,
    out: Vec<Instruction>,
}

impl PostfixGenerator<'_> {
    fn run(&mut self, postfix: &Postfix, span: Span) -> Result<Register, CodeGenError> {
        for token in postfix.tokens() {
            match token {
                PostfixToken::Operand { text, span } => self.push_operand(text, span)?,
                PostfixToken::Operator { op, span } => self.apply(*op, span)?,
            }
        }
        self.finish(span)
    }

    /// Resolves an operand: a declared name first, then a literal.
    fn push_operand(&mut self, text: &str, span: &Span) -> Result<(), CodeGenError> {
        let operand = match self.symbols.get(text) {
            Some(location) => Operand::Variable {
                name: text.to_string(),
                location,
            },
            None => match parse_literal(text) {
                LiteralValue::Word(value) => Operand::Immediate(value),
                LiteralValue::OutOfRange => {
                    return Err(CodeGenError::LiteralOutOfRange {
                        text: text.to_string(),
                        span: span.clone(),
                    })
                }
                LiteralValue::NotALiteral => {
                    return Err(CodeGenError::UndeclaredVariable {
                        name: text.to_string(),
                        span: span.clone(),
                    })
                }
            },
        };
        trace!("push {operand}");
        self.stack.push(operand);
        Ok(())
    }

    fn apply(&mut self, op: BinOp, span: &Span) -> Result<(), CodeGenError> {
        if self.stack.len() < 2 {
            return Err(CodeGenError::InvalidExpression {
                problem: ExprProblem::MissingOperand(op),
                span: span.clone(),
            });
        }
        // First pop is the right operand.
        let (Some(right), Some(left)) = (self.stack.pop(), self.stack.pop()) else {
            return Err(CodeGenError::InvalidExpression {
                problem: ExprProblem::MissingOperand(op),
                span: span.clone(),
            });
        };

        self.spill_accumulator(span)?;

        if right == Operand::Accumulator {
            right.load_into(SCRATCH, &mut self.out);
            left.load_into(ACCUMULATOR, &mut self.out);
        } else {
            left.load_into(ACCUMULATOR, &mut self.out);
            right.load_into(SCRATCH, &mut self.out);
        }
        self.emit_operation(op, &left, &right);

        for operand in [&left, &right] {
            if let Operand::Temporary(location) = operand {
                self.temps.release(*location);
            }
        }

        let result = match self.strategy {
            Strategy::Accumulator => Operand::Accumulator,
            Strategy::Materialize => {
                let location = self
                    .temps
                    .acquire(self.symbols)
                    .map_err(|err| CodeGenError::from_symbol(err, span.clone()))?;
                self.out.push(Instruction::sw(ACCUMULATOR, location));
                Operand::Temporary(location)
            }
        };
        self.stack.push(result);
        Ok(())
    }

    /// Moves a result still waiting in `$t0` into a temporary so the next
    /// operation can overwrite the register.
    fn spill_accumulator(&mut self, span: &Span) -> Result<(), CodeGenError> {
        let Some(pos) = self.stack.iter().position(|o| *o == Operand::Accumulator) else {
            return Ok(());
        };
        let location = self
            .temps
            .acquire(self.symbols)
            .map_err(|err| CodeGenError::from_symbol(err, span.clone()))?;
        trace!("spill {ACCUMULATOR} to {location}");
        self.out
            .push(Instruction::sw(ACCUMULATOR, location).with_comment("Spill"));
        self.stack[pos] = Operand::Temporary(location);
        Ok(())
    }

    fn emit_operation(&mut self, op: BinOp, left: &Operand, right: &Operand) {
        let comment = format!("Compute: {ACCUMULATOR} = {left} {op} {right}");
        let operands = vec![ACCUMULATOR.into(), ACCUMULATOR.into(), SCRATCH.into()];
        match op {
            BinOp::Add => self.out.push(Instruction::new("add", operands).with_comment(comment)),
            BinOp::Sub => self.out.push(Instruction::new("sub", operands).with_comment(comment)),
            BinOp::Mul => self.out.push(Instruction::new("mul", operands).with_comment(comment)),
            BinOp::Div => {
                self.out.push(
                    Instruction::new("div", vec![ACCUMULATOR.into(), SCRATCH.into()])
                        .with_comment(comment),
                );
                self.out.push(Instruction::new("mflo", vec![ACCUMULATOR.into()]));
            }
        }
    }

    /// Checks that exactly one value is left and brings it into `$t0`.
    fn finish(&mut self, span: Span) -> Result<Register, CodeGenError> {
        let problem = match self.stack.len() {
            0 => ExprProblem::Empty,
            1 => {
                if let Some(result) = self.stack.pop() {
                    result.load_into(ACCUMULATOR, &mut self.out);
                    if let Operand::Temporary(location) = result {
                        self.temps.release(location);
                    }
                }
                return Ok(ACCUMULATOR);
            }
            _ => ExprProblem::MissingOperator,
        };
        Err(CodeGenError::InvalidExpression { problem, span })
    }

    fn release_pending(&mut self) {
        for operand in self.stack.drain(..) {
            if let Operand::Temporary(location) = operand {
                self.temps.release(location);
            }
        }
    }
}
