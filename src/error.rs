use crate::ast::Span;
use crate::codegen::CodeGenError;
use crate::parser::ParseError;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::io;
use thiserror::Error;

/// Any problem that stops a single statement from compiling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    CodeGen(#[from] CodeGenError),
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::Parse(err) => err.span(),
            CompileError::CodeGen(err) => err.span(),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            CompileError::Parse(_) => "Parse error",
            CompileError::CodeGen(_) => "Code generation error",
        }
    }
}

/// A statement-level error together with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    pub error: CompileError,
}

/// ariadne counts characters, the compiler counts bytes.
fn char_range(source: &str, span: &Span) -> Span {
    let start = span.start.min(source.len());
    let end = span.end.clamp(start, source.len());
    let start_chars = source[..start].chars().count();
    let len_chars = source[start..end].chars().count().max(1);
    start_chars..start_chars + len_chars
}

fn build_report<'a>(
    filename: &'a str,
    source: &str,
    diagnostic: &Diagnostic,
    color: bool,
) -> Report<'a, (&'a str, Span)> {
    let range = char_range(source, &diagnostic.error.span());
    Report::build(ReportKind::Error, filename, range.start)
        .with_config(Config::default().with_color(color))
        .with_message(format!(
            "{} on line {}",
            diagnostic.error.title(),
            diagnostic.line
        ))
        .with_label(
            Label::new((filename, range))
                .with_message(diagnostic.error.to_string())
                .with_color(Color::Red),
        )
        .finish()
}

/// Display a diagnostic on stderr with ariadne formatting
pub fn display_diagnostic(source: &str, filename: &str, diagnostic: &Diagnostic) -> io::Result<()> {
    build_report(filename, source, diagnostic, true).eprint((filename, Source::from(source)))
}

/// Render a diagnostic without colors, for logs and tests
pub fn render_diagnostic(source: &str, filename: &str, diagnostic: &Diagnostic) -> String {
    let mut buffer = Vec::new();
    let report = build_report(filename, source, diagnostic, false);
    if report
        .write((filename, Source::from(source)), &mut buffer)
        .is_err()
    {
        return format!("line {}: {}", diagnostic.line, diagnostic.error);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
