use std::fmt;
use std::ops::Range;

/// Byte range into the original source text.
pub type Span = Range<usize>;

/// The set of supported binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(BinOp::Add),
            '-' => Some(BinOp::Sub),
            '*' => Some(BinOp::Mul),
            '/' => Some(BinOp::Div),
            _ => None,
        }
    }

    /// Binding strength; every operator is left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Kinds of tokens recognised inside an arithmetic expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A variable name or an unsigned integer literal.
    Operand(String),
    Operator(BinOp),
    OpenParen,
    CloseParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// One element of a parenthesis-free, precedence-resolved expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostfixToken {
    Operand { text: String, span: Span },
    Operator { op: BinOp, span: Span },
}

/// An expression in reverse Polish order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Postfix(pub Vec<PostfixToken>);

impl Postfix {
    pub fn tokens(&self) -> &[PostfixToken] {
        &self.0
    }
}

impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match token {
                PostfixToken::Operand { text, .. } => f.write_str(text)?,
                PostfixToken::Operator { op, .. } => write!(f, "{op}")?,
            }
        }
        Ok(())
    }
}

/// A variable name together with where it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// An unsigned decimal literal as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub span: Span,
}

/// Raw right-hand side of an expression assignment, without the `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprText {
    pub text: String,
    /// Absolute offset of the first byte of `text`.
    pub offset: usize,
}

/// A source line after statement recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedStatement {
    /// `int a;` or `int a = 5;`
    Declaration {
        name: Ident,
        init: Option<Literal>,
    },
    /// `a = 5;`
    LiteralAssignment { name: Ident, value: Literal },
    /// `a = b + c * 2;`
    ExpressionAssignment { name: Ident, expr: ExprText },
    /// `return a;` or `return;`
    Return { name: Option<Ident> },
}
