use crate::ast::{BinOp, ClassifiedStatement, Span};
use crate::compiler::generators::statement;
use crate::compiler::runtime;
use crate::compiler::symbols::{SymbolError, SymbolTable};
use crate::compiler::temps::TempPool;
use crate::compiler::values::{AsmLine, Instruction};
use crate::error::{CompileError, Diagnostic};
use crate::lowering::{LoweringError, ParenMismatch};
use crate::parser::SourceLine;
use log::{debug, warn};
use std::fmt;
use thiserror::Error;

/// Default frame reserved by the prologue, in bytes.
pub const DEFAULT_FRAME_SIZE: u32 = 0x100;

/// Largest frame whose size and slot offsets still fit a signed 16-bit
/// immediate.
pub const MAX_FRAME_SIZE: u16 = 0x8000;

/// Clamps a requested frame size to [`MAX_FRAME_SIZE`] and rounds it down to
/// whole words.
pub fn fit_frame_size(requested: u32) -> u16 {
    const WORD: u16 = 4;
    let size = u16::try_from(requested).map_or(MAX_FRAME_SIZE, |size| size.min(MAX_FRAME_SIZE));
    size - size % WORD
}

/// What went wrong in a structurally invalid expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprProblem {
    /// An operator was reached with fewer than two operands available.
    MissingOperand(BinOp),
    /// More than one value was left once every operator was applied.
    MissingOperator,
    Empty,
    UnexpectedCharacter(char),
}

impl fmt::Display for ExprProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprProblem::MissingOperand(op) => write!(f, "operator '{op}' needs two operands"),
            ExprProblem::MissingOperator => f.write_str("operands left over without an operator"),
            ExprProblem::Empty => f.write_str("expression is empty"),
            ExprProblem::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeGenError {
    #[error("Variable '{name}' already declared")]
    RedeclaredVariable { name: String, span: Span },
    #[error("Variable '{name}' not declared")]
    UndeclaredVariable { name: String, span: Span },
    #[error("Mismatched parenthesis: {kind}")]
    MismatchedParenthesis { kind: ParenMismatch, span: Span },
    #[error("Invalid expression: {problem}")]
    InvalidExpression { problem: ExprProblem, span: Span },
    #[error("Literal {text} does not fit in a 32-bit word")]
    LiteralOutOfRange { text: String, span: Span },
    #[error("Stack frame of {frame_size} bytes is full")]
    FrameExhausted { frame_size: u32, span: Span },
}

impl CodeGenError {
    /// Attaches a source span to a symbol table failure.
    pub fn from_symbol(err: SymbolError, span: Span) -> Self {
        match err {
            SymbolError::Redeclared(name) => CodeGenError::RedeclaredVariable { name, span },
            SymbolError::Undeclared(name) => CodeGenError::UndeclaredVariable { name, span },
            SymbolError::FrameExhausted { frame_size } => {
                CodeGenError::FrameExhausted { frame_size, span }
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CodeGenError::RedeclaredVariable { span, .. }
            | CodeGenError::UndeclaredVariable { span, .. }
            | CodeGenError::MismatchedParenthesis { span, .. }
            | CodeGenError::InvalidExpression { span, .. }
            | CodeGenError::LiteralOutOfRange { span, .. }
            | CodeGenError::FrameExhausted { span, .. } => span.clone(),
        }
    }
}

impl From<LoweringError> for CodeGenError {
    fn from(err: LoweringError) -> Self {
        match err {
            LoweringError::MismatchedParenthesis { kind, span } => {
                CodeGenError::MismatchedParenthesis { kind, span }
            }
            LoweringError::UnexpectedCharacter { found, span } => CodeGenError::InvalidExpression {
                problem: ExprProblem::UnexpectedCharacter(found),
                span,
            },
        }
    }
}

/// How intermediate results are kept while an expression is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Strategy {
    /// Chain results through `$t0`, spilling only when two are live at once.
    #[default]
    Accumulator,
    /// Write every intermediate result to a pooled frame slot.
    Materialize,
}

/// Knobs for one compilation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Bytes reserved by the prologue; every slot must fit inside.
    pub frame_size: u32,
    pub strategy: Strategy,
    /// Attach explanatory comments to the generated instructions.
    pub annotate: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            strategy: Strategy::default(),
            annotate: true,
        }
    }
}

/// A whole-program compilation session.
///
/// Owns the symbol table and the temporary pool; every statement is compiled
/// against the same instance, in source order.
pub struct Compiler {
    pub(crate) options: CompilerOptions,
    frame_size: u16,
    pub(crate) symbols: SymbolTable,
    pub(crate) temps: TempPool,
}

impl Compiler {
    /// Starts a session. A frame size that cannot be encoded is adjusted with
    /// [`fit_frame_size`].
    pub fn new(mut options: CompilerOptions) -> Self {
        let frame_size = fit_frame_size(options.frame_size);
        if u32::from(frame_size) != options.frame_size {
            warn!(
                "frame size {} adjusted to {frame_size} bytes",
                options.frame_size
            );
            options.frame_size = u32::from(frame_size);
        }
        let symbols = SymbolTable::new(options.frame_size);
        Self {
            options,
            frame_size,
            symbols,
            temps: TempPool::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn temps(&self) -> &TempPool {
        &self.temps
    }

    /// Compiles one statement. On failure nothing is returned for it, but any
    /// declaration that already succeeded stays in the table.
    pub fn compile_statement(
        &mut self,
        stmt: &ClassifiedStatement,
    ) -> Result<Vec<Instruction>, CodeGenError> {
        let mut instructions = statement::compile_statement(self, stmt)?;
        if !self.options.annotate {
            for instruction in &mut instructions {
                instruction.comment = None;
            }
        }
        Ok(instructions)
    }

    /// Compiles every line between the fixed prologue and epilogue.
    ///
    /// A failing line is replaced by an `# Error:` comment and recorded as a
    /// diagnostic; compilation carries on with the next line.
    pub fn compile_program(mut self, program: &[SourceLine]) -> Compilation {
        let annotate = self.options.annotate;
        let mut listing = runtime::prologue(self.frame_size);
        let mut diagnostics = Vec::new();

        for line in program {
            let result = match &line.statement {
                Ok(stmt) => self.compile_statement(stmt).map_err(CompileError::from),
                Err(err) => Err(CompileError::from(err.clone())),
            };
            match result {
                Ok(instructions) => {
                    listing.extend(instructions.into_iter().map(AsmLine::Instruction))
                }
                Err(error) => {
                    debug!("line {}: {error}", line.number);
                    listing.push(AsmLine::Comment(format!("Error: {error}")));
                    diagnostics.push(Diagnostic {
                        line: line.number,
                        error,
                    });
                }
            }
        }

        listing.extend(runtime::epilogue(annotate));
        Compilation {
            listing,
            diagnostics,
            symbols: self.symbols,
        }
    }
}

/// Everything a session produced: the assembly listing and the problems
/// found along the way.
#[derive(Debug)]
pub struct Compilation {
    pub listing: Vec<AsmLine>,
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
}

impl Compilation {
    /// Renders the listing as assembly source text.
    pub fn assembly(&self) -> String {
        let mut text = String::new();
        for line in &self.listing {
            text.push_str(&line.to_string());
            text.push('\n');
        }
        text
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
