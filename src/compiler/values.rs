//! Values and Instruction Records
//!
//! This module defines everything the code generators hand back to the
//! session: registers, typed instruction arguments, instruction records and
//! the descriptors the postfix generator keeps on its operand stack.
//!
//! ## Frame layout
//! Every variable and temporary lives in a 4-byte slot addressed relative to
//! `$fp`. Slots grow downward: the first one is `-4($fp)`.

use num_traits::ToPrimitive;
use std::fmt;

/// Size in bytes of one frame slot.
pub const SLOT_SIZE: i32 = 4;

/// The MIPS registers the compiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Zero,
    V0,
    A0,
    T0,
    T1,
    Sp,
    Fp,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::Zero => "$zero",
            Register::V0 => "$v0",
            Register::A0 => "$a0",
            Register::T0 => "$t0",
            Register::T1 => "$t1",
            Register::Sp => "$sp",
            Register::Fp => "$fp",
        };
        f.write_str(name)
    }
}

/// The accumulator every arithmetic result lands in.
pub const ACCUMULATOR: Register = Register::T0;
/// Scratch register for the right-hand operand.
pub const SCRATCH: Register = Register::T1;

/// A frame slot, as a byte offset from `$fp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location(pub i32);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.0, Register::Fp)
    }
}

/// One operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Reg(Register),
    Imm(i32),
    /// `offset(base)` memory reference.
    Mem(i32, Register),
}

impl From<Register> for Arg {
    fn from(reg: Register) -> Self {
        Arg::Reg(reg)
    }
}

impl From<Location> for Arg {
    fn from(location: Location) -> Self {
        Arg::Mem(location.0, Register::Fp)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Reg(reg) => write!(f, "{reg}"),
            Arg::Imm(value) => write!(f, "{value}"),
            Arg::Mem(offset, base) => write!(f, "{offset}({base})"),
        }
    }
}

/// A single target instruction: mnemonic, operands and an optional comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: &'static str,
    pub operands: Vec<Arg>,
    pub comment: Option<String>,
}

impl Instruction {
    pub fn new(mnemonic: &'static str, operands: Vec<Arg>) -> Self {
        Self {
            mnemonic,
            operands,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn li(dst: Register, value: i32) -> Self {
        Self::new("li", vec![dst.into(), Arg::Imm(value)])
    }

    pub fn lw(dst: Register, src: Location) -> Self {
        Self::new("lw", vec![dst.into(), src.into()])
    }

    pub fn sw(src: Register, dst: Location) -> Self {
        Self::new("sw", vec![src.into(), dst.into()])
    }

    pub fn mov(dst: Register, src: Register) -> Self {
        Self::new("move", vec![dst.into(), src.into()])
    }

    pub fn syscall() -> Self {
        Self::new("syscall", Vec::new())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic)?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{operand}")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, "  # {comment}")?;
        }
        Ok(())
    }
}

/// One line of the rendered assembly file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Directive(String),
    Label(String),
    Comment(String),
    Instruction(Instruction),
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::Directive(text) => f.write_str(text),
            AsmLine::Label(name) => write!(f, "{name}:"),
            AsmLine::Comment(text) => write!(f, "# {text}"),
            AsmLine::Instruction(instruction) => write!(f, "{instruction}"),
        }
    }
}

/// Where an operand on the generator's stack currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A declared variable's slot.
    Variable { name: String, location: Location },
    /// A literal small enough for `li`.
    Immediate(i32),
    /// The result of the most recent operation, still in `$t0`.
    Accumulator,
    /// An intermediate result spilled to a pooled slot.
    Temporary(Location),
}

impl Operand {
    /// Emits whatever is needed to get this operand into `dst`.
    /// The accumulator is assumed to already be in `$t0`.
    pub fn load_into(&self, dst: Register, out: &mut Vec<Instruction>) {
        match self {
            Operand::Variable { location, .. } | Operand::Temporary(location) => {
                out.push(Instruction::lw(dst, *location))
            }
            Operand::Immediate(value) => out.push(Instruction::li(dst, *value)),
            Operand::Accumulator => {
                if dst != ACCUMULATOR {
                    out.push(Instruction::mov(dst, ACCUMULATOR));
                }
            }
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable { name, .. } => f.write_str(name),
            Operand::Immediate(value) => write!(f, "{value}"),
            Operand::Accumulator => write!(f, "{ACCUMULATOR}"),
            Operand::Temporary(location) => write!(f, "{location}"),
        }
    }
}

/// Outcome of reading a token as an integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Word(i32),
    /// Digits only, but too large for a 32-bit word.
    OutOfRange,
    /// Not a decimal literal at all.
    NotALiteral,
}

/// Reads `text` as an unsigned decimal literal.
pub fn parse_literal(text: &str) -> LiteralValue {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return LiteralValue::NotALiteral;
    }
    match text.parse::<u64>().ok().and_then(|v| v.to_i32()) {
        Some(value) => LiteralValue::Word(value),
        None => LiteralValue::OutOfRange,
    }
}
