//! Runtime Frame
//!
//! The fixed text that surrounds every compiled program: the prologue that
//! sets up `main` and its stack frame, and the epilogue that prints the value
//! left in `$v0` and exits through the simulator's syscalls.

use crate::compiler::values::{Arg, AsmLine, Instruction, Register};

/// SPIM syscall number for `print_int`.
const SYSCALL_PRINT_INT: i32 = 1;
/// SPIM syscall number for `exit`.
const SYSCALL_EXIT: i32 = 10;

/// Emits the entry point and reserves `frame_size` bytes below `$fp`.
/// `frame_size` must already fit the `addiu` immediate.
pub fn prologue(frame_size: u16) -> Vec<AsmLine> {
    let frame = i32::from(frame_size);
    vec![
        AsmLine::Directive(".text".to_string()),
        AsmLine::Directive(".globl main".to_string()),
        AsmLine::Label("main".to_string()),
        AsmLine::Instruction(Instruction::mov(Register::Fp, Register::Sp)),
        AsmLine::Instruction(Instruction::new(
            "addiu",
            vec![Register::Sp.into(), Register::Sp.into(), Arg::Imm(-frame)],
        )),
    ]
}

/// Prints the returned value as an integer, then exits.
pub fn epilogue(annotate: bool) -> Vec<AsmLine> {
    let mut lines = Vec::new();
    if annotate {
        lines.push(AsmLine::Comment("Printing Integer".to_string()));
    }
    lines.push(AsmLine::Instruction(Instruction::mov(Register::A0, Register::V0)));
    lines.push(AsmLine::Instruction(Instruction::li(
        Register::V0,
        SYSCALL_PRINT_INT,
    )));
    lines.push(AsmLine::Instruction(Instruction::syscall()));
    if annotate {
        lines.push(AsmLine::Comment("exiting gracefully".to_string()));
    }
    lines.push(AsmLine::Instruction(Instruction::li(Register::V0, SYSCALL_EXIT)));
    lines.push(AsmLine::Instruction(Instruction::syscall()));
    lines
}
