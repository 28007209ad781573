mod common;

use common::Machine;
use mips_compiler::{compile_source, CompilerOptions, Strategy};

const PROGRAM: &str = r#"
int main() {
    int a = 5;
    int b;
    int c = 10;
    a = 20;
    b = (a + c) / 3;
    return b;
}
"#;

#[test]
fn test_full_program_assembly() {
    let compilation = compile_source(PROGRAM, CompilerOptions::default());
    assert!(!compilation.has_errors());
    insta::assert_snapshot!(compilation.assembly().trim_end(), @r"
    .text
    .globl main
    main:
    move $fp, $sp
    addiu $sp, $sp, -256
    li $t0, 5  # Declaration: a = 5
    sw $t0, -4($fp)
    sw $zero, -8($fp)  # Declaration: b (int)
    li $t0, 10  # Declaration: c = 10
    sw $t0, -12($fp)
    li $t0, 20  # Assignment: a = 20
    sw $t0, -4($fp)
    lw $t0, -4($fp)
    lw $t1, -12($fp)
    add $t0, $t0, $t1  # Compute: $t0 = a + c
    li $t1, 3
    div $t0, $t1  # Compute: $t0 = $t0 / 3
    mflo $t0
    sw $t0, -8($fp)  # Store result in b
    lw $v0, -8($fp)  # Return: b
    # Printing Integer
    move $a0, $v0
    li $v0, 1
    syscall
    # exiting gracefully
    li $v0, 10
    syscall
    ");
}

#[test]
fn test_full_program_runs() {
    for strategy in [Strategy::Accumulator, Strategy::Materialize] {
        let options = CompilerOptions {
            strategy,
            ..CompilerOptions::default()
        };
        let compilation = compile_source(PROGRAM, options);
        let mut machine = Machine::new();
        machine.run_listing(&compilation.listing);
        assert_eq!(machine.printed, vec![10]);
        assert!(machine.exited);
    }
}

#[test]
fn test_void_return_prints_zero() {
    let compilation = compile_source("int a = 4;\nreturn;\n", CompilerOptions::default());
    let mut machine = Machine::new();
    machine.run_listing(&compilation.listing);
    assert_eq!(machine.printed, vec![0]);
}

#[test]
fn test_program_with_errors_still_runs() {
    let source = "int a = 2;\nint a = 9;\nint b;\nb = a * (a + 1;\nb = a * a * a;\nreturn b;\n";
    let compilation = compile_source(source, CompilerOptions::default());
    assert_eq!(compilation.diagnostics.len(), 2);
    let lines: Vec<_> = compilation.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![2, 4]);

    let mut machine = Machine::new();
    machine.run_listing(&compilation.listing);
    assert_eq!(machine.printed, vec![8]);
}

#[test]
fn test_no_comments_option() {
    let options = CompilerOptions {
        annotate: false,
        ..CompilerOptions::default()
    };
    let assembly = compile_source(PROGRAM, options).assembly();
    assert!(!assembly.contains('#'), "{assembly}");
}

#[test]
fn test_frame_size_option_sets_prologue() {
    let options = CompilerOptions {
        frame_size: 64,
        ..CompilerOptions::default()
    };
    let compilation = compile_source("int a;\n", options);
    assert!(compilation.assembly().contains("addiu $sp, $sp, -64\n"));
    assert_eq!(compilation.symbols.frame_bytes(), 4);
}

#[test]
fn test_oversized_frame_is_clamped_to_an_encodable_one() {
    let options = CompilerOptions {
        frame_size: 0x20000,
        ..CompilerOptions::default()
    };
    let compilation = compile_source("int a;\n", options);
    assert!(!compilation.has_errors());
    assert!(compilation.assembly().contains("addiu $sp, $sp, -32768\n"));

    let options = CompilerOptions {
        frame_size: 6,
        ..CompilerOptions::default()
    };
    let compilation = compile_source("int a;\nint b;\n", options);
    assert!(compilation.assembly().contains("addiu $sp, $sp, -4\n"));
    assert_eq!(compilation.diagnostics.len(), 1);
    assert_eq!(compilation.diagnostics[0].line, 2);
}
