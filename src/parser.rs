//! Statement classification.
//!
//! Every source line holds at most one statement. A line is matched against
//! the four statement forms and turned into a [`ClassifiedStatement`];
//! structural lines such as `int main() {`, lone braces, blanks and `//`
//! comments carry no code and are skipped.

use crate::ast::{ClassifiedStatement, ExprText, Ident, Literal, Span};
use log::trace;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized statement")]
    UnrecognizedStatement { span: Span },
    #[error("Expected ';' at the end of the statement")]
    MissingSemicolon { span: Span },
    #[error("Declaration initializer must be an integer literal")]
    NonLiteralInitializer { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnrecognizedStatement { span }
            | ParseError::MissingSemicolon { span }
            | ParseError::NonLiteralInitializer { span } => span.clone(),
        }
    }
}

/// One statement-bearing line of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number.
    pub number: usize,
    pub span: Span,
    pub statement: Result<ClassifiedStatement, ParseError>,
}

/// Classifies every line of `source`, dropping the ones without code.
pub fn parse_program(source: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut offset = 0;

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches(['\n', '\r']);
        match classify_line(line, offset) {
            Some(statement) => lines.push(SourceLine {
                number: index + 1,
                span: offset..offset + line.len(),
                statement,
            }),
            None => trace!("skipping line {}: {line:?}", index + 1),
        }
        offset += raw.len();
    }

    lines
}

/// Classifies a single line whose first byte sits at `offset` in the source.
/// Returns `None` for lines that carry no statement.
pub fn classify_line(line: &str, offset: usize) -> Option<Result<ClassifiedStatement, ParseError>> {
    let trimmed = line.trim();
    if trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.chars().all(|c| c == '{' || c == '}' || c.is_whitespace())
    {
        return None;
    }

    let start = offset + (line.len() - line.trim_start().len());
    let end = start + trimmed.len();
    let (body, terminated) = match trimmed.strip_suffix(';') {
        Some(body) => (body, true),
        None => (trimmed, false),
    };

    // `int f(x);` ends like a statement, so only an open line is a header.
    if !terminated && is_function_header(&mut Cursor::new(body, start)) {
        return None;
    }

    let mut cursor = Cursor::new(body, start);
    let statement = match classify_body(&mut cursor) {
        Ok(statement) => statement,
        Err(err) => return Some(Err(err)),
    };
    if !terminated {
        return Some(Err(ParseError::MissingSemicolon { span: end..end }));
    }
    Some(Ok(statement))
}

/// `int main()`, `int main(void) {` and the like.
fn is_function_header(cursor: &mut Cursor) -> bool {
    cursor.skip_ws();
    if !cursor.keyword("int") {
        return false;
    }
    cursor.skip_ws();
    if cursor.ident().is_none() {
        return false;
    }
    cursor.skip_ws();
    cursor.peek() == Some('(')
}

fn classify_body(cursor: &mut Cursor) -> Result<ClassifiedStatement, ParseError> {
    let unrecognized = ParseError::UnrecognizedStatement {
        span: cursor.base..cursor.base + cursor.text.len(),
    };
    cursor.skip_ws();

    if cursor.keyword("int") {
        cursor.skip_ws();
        let name = cursor.ident().ok_or(unrecognized.clone())?;
        cursor.skip_ws();
        if cursor.at_end() {
            return Ok(ClassifiedStatement::Declaration { name, init: None });
        }
        if !cursor.eat('=') {
            return Err(unrecognized);
        }
        cursor.skip_ws();
        let rest = cursor.rest_span();
        let init = cursor.literal();
        cursor.skip_ws();
        return match init {
            Some(init) if cursor.at_end() => Ok(ClassifiedStatement::Declaration {
                name,
                init: Some(init),
            }),
            _ => Err(ParseError::NonLiteralInitializer { span: rest }),
        };
    }

    if cursor.keyword("return") {
        cursor.skip_ws();
        if cursor.at_end() {
            return Ok(ClassifiedStatement::Return { name: None });
        }
        let name = cursor.ident().ok_or(unrecognized.clone())?;
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(unrecognized);
        }
        return Ok(ClassifiedStatement::Return { name: Some(name) });
    }

    let name = cursor.ident().ok_or(unrecognized.clone())?;
    cursor.skip_ws();
    if !cursor.eat('=') {
        return Err(unrecognized);
    }
    cursor.skip_ws();

    let checkpoint = cursor.pos;
    if let Some(value) = cursor.literal() {
        cursor.skip_ws();
        if cursor.at_end() {
            return Ok(ClassifiedStatement::LiteralAssignment { name, value });
        }
        cursor.pos = checkpoint;
    }

    let text = cursor.text[cursor.pos..].trim_end();
    Ok(ClassifiedStatement::ExpressionAssignment {
        name,
        expr: ExprText {
            text: text.to_string(),
            offset: cursor.base + cursor.pos,
        },
    })
}

/// Byte cursor over one statement, reporting absolute spans.
struct Cursor<'a> {
    text: &'a str,
    base: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, base: usize) -> Self {
        Self { text, base, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            return true;
        }
        false
    }

    fn rest_span(&self) -> Span {
        self.base + self.pos..self.base + self.text.len()
    }

    /// Consumes `word` only when it is not the prefix of a longer name.
    fn keyword(&mut self, word: &str) -> bool {
        let Some(after) = self.text[self.pos..].strip_prefix(word) else {
            return false;
        };
        if after.chars().next().is_some_and(is_ident_char) {
            return false;
        }
        self.pos += word.len();
        true
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> Span {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        start..self.pos
    }

    /// A name that is not one of the reserved [`KEYWORDS`]. Consumes nothing
    /// on failure.
    fn ident(&mut self) -> Option<Ident> {
        if !self
            .peek()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            return None;
        }
        let range = self.take_while(is_ident_char);
        if KEYWORDS.contains(&&self.text[range.clone()]) {
            self.pos = range.start;
            return None;
        }
        Some(Ident {
            name: self.text[range.clone()].to_string(),
            span: self.base + range.start..self.base + range.end,
        })
    }

    /// A run of decimal digits that does not run on into a name.
    fn literal(&mut self) -> Option<Literal> {
        let start = self.pos;
        let range = self.take_while(|c| c.is_ascii_digit());
        if range.is_empty() || self.peek().is_some_and(is_ident_char) {
            self.pos = start;
            return None;
        }
        Some(Literal {
            text: self.text[range.clone()].to_string(),
            span: self.base + range.start..self.base + range.end,
        })
    }
}

const KEYWORDS: [&str; 2] = ["int", "return"];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
