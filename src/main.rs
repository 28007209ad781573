use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mips_compiler::codegen::{DEFAULT_FRAME_SIZE, MAX_FRAME_SIZE};
use mips_compiler::error::display_diagnostic;
use mips_compiler::{compile_source, CompilerOptions, Strategy};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mipsc")]
#[command(about = "Compile a tiny integer language to MIPS assembly", long_about = None)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Where to write the generated assembly
    #[arg(short, long, default_value = "output.s")]
    output: PathBuf,

    /// How intermediate results are kept
    #[arg(long, value_enum, default_value_t = Strategy::Accumulator)]
    strategy: Strategy,

    /// Bytes reserved for the stack frame
    #[arg(long, default_value_t = DEFAULT_FRAME_SIZE, value_parser = parse_frame_size)]
    frame_size: u32,

    /// Leave explanatory comments out of the output
    #[arg(long)]
    no_comments: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all log output
    #[arg(short, long)]
    quiet: bool,
}

/// A whole number of words, from one word up to [`MAX_FRAME_SIZE`].
fn parse_frame_size(arg: &str) -> Result<u32, String> {
    let size: u32 = arg
        .parse()
        .map_err(|e| format!("'{arg}' is not a byte count: {e}"))?;
    let max = u32::from(MAX_FRAME_SIZE);
    if !(4..=max).contains(&size) {
        return Err(format!("must be between 4 and {max}"));
    }
    if size % 4 != 0 {
        return Err(format!("{size} is not a multiple of 4"));
    }
    Ok(size)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = stderrlog::new()
        .quiet(cli.quiet)
        .verbosity(usize::from(cli.verbose) + 1)
        .init()
    {
        eprintln!("Failed to initialise logging: {}", e);
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Compiles the input and writes the output file. Returns whether every
/// statement compiled cleanly.
fn run(cli: &Cli) -> Result<bool> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("could not read '{}'", cli.input.display()))?;

    let options = CompilerOptions {
        frame_size: cli.frame_size,
        strategy: cli.strategy,
        annotate: !cli.no_comments,
    };
    let compilation = compile_source(&source, options);

    let filename = cli.input.display().to_string();
    for diagnostic in &compilation.diagnostics {
        display_diagnostic(&source, &filename, diagnostic)
            .context("could not print diagnostic")?;
    }

    fs::write(&cli.output, compilation.assembly())
        .with_context(|| format!("could not write '{}'", cli.output.display()))?;
    info!(
        "wrote {} ({} variables, {} bytes of frame in use)",
        cli.output.display(),
        compilation.symbols.len(),
        compilation.symbols.frame_bytes()
    );

    Ok(!compilation.has_errors())
}
