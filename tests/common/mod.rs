//! A small MIPS interpreter for the instructions the compiler emits, used to
//! check that generated code computes what the source says.

#![allow(dead_code)]

use mips_compiler::compiler::values::{Arg, AsmLine, Instruction, Register};
use std::collections::HashMap;

const STACK_TOP: i32 = 0x7fff_effc;

#[derive(Debug, Default)]
pub struct Machine {
    regs: HashMap<Register, i32>,
    memory: HashMap<i32, i32>,
    lo: i32,
    pub printed: Vec<i32>,
    pub exited: bool,
}

impl Machine {
    pub fn new() -> Self {
        let mut machine = Machine::default();
        machine.regs.insert(Register::Sp, STACK_TOP);
        machine.regs.insert(Register::Fp, STACK_TOP);
        machine
    }

    pub fn reg(&self, reg: Register) -> i32 {
        match reg {
            Register::Zero => 0,
            _ => self.regs.get(&reg).copied().unwrap_or(0),
        }
    }

    fn set(&mut self, reg: Register, value: i32) {
        if reg != Register::Zero {
            self.regs.insert(reg, value);
        }
    }

    /// Value of the slot at `offset($fp)`. Panics if nothing was stored there.
    pub fn slot(&self, offset: i32) -> i32 {
        let addr = self.reg(Register::Fp).wrapping_add(offset);
        match self.memory.get(&addr) {
            Some(value) => *value,
            None => panic!("read of uninitialised slot {offset}($fp)"),
        }
    }

    pub fn step(&mut self, instruction: &Instruction) {
        use Arg::{Imm, Mem, Reg};
        match (instruction.mnemonic, instruction.operands.as_slice()) {
            ("li", [Reg(dst), Imm(value)]) => self.set(*dst, *value),
            ("lw", [Reg(dst), Mem(offset, base)]) => {
                let addr = self.reg(*base).wrapping_add(*offset);
                let value = match self.memory.get(&addr) {
                    Some(value) => *value,
                    None => panic!("read of uninitialised slot {offset}({base})"),
                };
                self.set(*dst, value);
            }
            ("sw", [Reg(src), Mem(offset, base)]) => {
                let addr = self.reg(*base).wrapping_add(*offset);
                let value = self.reg(*src);
                self.memory.insert(addr, value);
            }
            ("move", [Reg(dst), Reg(src)]) => {
                let value = self.reg(*src);
                self.set(*dst, value);
            }
            ("addiu", [Reg(dst), Reg(src), Imm(value)]) => {
                self.set(*dst, self.reg(*src).wrapping_add(*value))
            }
            ("add", [Reg(dst), Reg(a), Reg(b)]) => {
                self.set(*dst, self.reg(*a).wrapping_add(self.reg(*b)))
            }
            ("sub", [Reg(dst), Reg(a), Reg(b)]) => {
                self.set(*dst, self.reg(*a).wrapping_sub(self.reg(*b)))
            }
            ("mul", [Reg(dst), Reg(a), Reg(b)]) => {
                self.set(*dst, self.reg(*a).wrapping_mul(self.reg(*b)))
            }
            ("div", [Reg(a), Reg(b)]) => {
                let divisor = self.reg(*b);
                assert_ne!(divisor, 0, "division by zero in generated code");
                self.lo = self.reg(*a).wrapping_div(divisor);
            }
            ("mflo", [Reg(dst)]) => self.set(*dst, self.lo),
            ("syscall", []) => match self.reg(Register::V0) {
                1 => {
                    let value = self.reg(Register::A0);
                    self.printed.push(value);
                }
                10 => self.exited = true,
                other => panic!("unsupported syscall {other}"),
            },
            _ => panic!("unsupported instruction: {instruction}"),
        }
    }

    pub fn run(&mut self, instructions: &[Instruction]) {
        for instruction in instructions {
            self.step(instruction);
        }
    }

    /// Runs a full listing until the exit syscall.
    pub fn run_listing(&mut self, listing: &[AsmLine]) {
        for line in listing {
            if self.exited {
                break;
            }
            if let AsmLine::Instruction(instruction) = line {
                self.step(instruction);
            }
        }
    }
}

/// Deterministic pseudo-random numbers for generated test cases.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

/// An arithmetic expression with its expected value.
#[derive(Debug, Clone)]
pub enum Expr {
    Leaf(String, i32),
    Bin(Box<Expr>, char, Box<Expr>),
}

fn precedence(op: char) -> u8 {
    match op {
        '+' | '-' => 1,
        _ => 2,
    }
}

impl Expr {
    pub fn value(&self) -> i32 {
        match self {
            Expr::Leaf(_, value) => *value,
            Expr::Bin(left, op, right) => {
                let (l, r) = (left.value(), right.value());
                match op {
                    '+' => l.wrapping_add(r),
                    '-' => l.wrapping_sub(r),
                    '*' => l.wrapping_mul(r),
                    _ => l.wrapping_div(r),
                }
            }
        }
    }

    /// Infix text with only the parentheses precedence requires, plus the
    /// occasional redundant pair when `rng` says so.
    pub fn render(&self, rng: &mut Lcg) -> String {
        match self {
            Expr::Leaf(text, _) => {
                if rng.below(8) == 0 {
                    format!("({text})")
                } else {
                    text.clone()
                }
            }
            Expr::Bin(left, op, right) => {
                let mut l = left.render(rng);
                let mut r = right.render(rng);
                if let Expr::Bin(_, child, _) = left.as_ref() {
                    if precedence(*child) < precedence(*op) || rng.below(6) == 0 {
                        l = format!("({l})");
                    }
                }
                if let Expr::Bin(_, child, _) = right.as_ref() {
                    if precedence(*child) <= precedence(*op) || rng.below(6) == 0 {
                        r = format!("({r})");
                    }
                }
                format!("{l} {op} {r}")
            }
        }
    }
}

/// Builds a random expression over `vars` (name, value) and small literals.
/// Divisions never divide by zero.
pub fn random_expr(rng: &mut Lcg, depth: u32, vars: &[(&str, i32)]) -> Expr {
    if depth == 0 || rng.below(4) == 0 {
        if !vars.is_empty() && rng.below(2) == 0 {
            let (name, value) = vars[rng.below(vars.len() as u64) as usize];
            return Expr::Leaf(name.to_string(), value);
        }
        let value = rng.below(50) as i32;
        return Expr::Leaf(value.to_string(), value);
    }
    let left = random_expr(rng, depth - 1, vars);
    let right = random_expr(rng, depth - 1, vars);
    let mut op = ['+', '-', '*', '/'][rng.below(4) as usize];
    if op == '/' && right.value() == 0 {
        op = '-';
    }
    Expr::Bin(Box::new(left), op, Box::new(right))
}
