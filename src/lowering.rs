//! Expression Lowering
//!
//! Turns the raw text on the right-hand side of an assignment into a postfix
//! sequence. Lowering happens in two steps:
//! - `tokenize` splits the text into operands, operators and parentheses.
//! - `to_postfix` reorders the tokens with an explicit operator stack so that
//!   precedence and grouping are resolved before code generation.
//!
//! Nothing here touches the symbol table; operands stay as plain text until
//! the postfix code generator resolves them.

use crate::ast::{BinOp, ExprText, Postfix, PostfixToken, Span, Token, TokenKind};
use log::debug;
use std::fmt;
use thiserror::Error;

/// Which side of a parenthesis pair is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenMismatch {
    /// A `)` appeared with no open `(` left to close.
    ExcessClose,
    /// A `(` was still open when the expression ended.
    UnclosedOpen,
}

impl fmt::Display for ParenMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParenMismatch::ExcessClose => f.write_str("')' has no matching '('"),
            ParenMismatch::UnclosedOpen => f.write_str("'(' is never closed"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoweringError {
    #[error("Mismatched parenthesis: {kind}")]
    MismatchedParenthesis { kind: ParenMismatch, span: Span },
    #[error("Unexpected character '{found}' in expression")]
    UnexpectedCharacter { found: char, span: Span },
}

impl LoweringError {
    pub fn span(&self) -> Span {
        match self {
            LoweringError::MismatchedParenthesis { span, .. }
            | LoweringError::UnexpectedCharacter { span, .. } => span.clone(),
        }
    }
}

enum StackEntry {
    Operator(BinOp, Span),
    Open(Span),
}

fn is_operand_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lowers an expression's text into postfix order.
pub fn lower_expression(expr: &ExprText) -> Result<Postfix, LoweringError> {
    debug!("Infix: {}", expr.text);
    let tokens = tokenize(&expr.text, expr.offset)?;
    let postfix = to_postfix(tokens)?;
    debug!("Postfix: {postfix}");
    Ok(postfix)
}

/// Splits expression text into tokens. `offset` is the absolute position of
/// `text` in the source and is added to every token span.
pub fn tokenize(text: &str, offset: usize) -> Result<Vec<Token>, LoweringError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        let mut end = start + c.len_utf8();
        let kind = if is_operand_char(c) {
            while let Some(&(i, next)) = chars.peek() {
                if !is_operand_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            TokenKind::Operand(text[start..end].to_string())
        } else if c == '(' {
            TokenKind::OpenParen
        } else if c == ')' {
            TokenKind::CloseParen
        } else if let Some(op) = BinOp::from_char(c) {
            TokenKind::Operator(op)
        } else {
            return Err(LoweringError::UnexpectedCharacter {
                found: c,
                span: offset + start..offset + end,
            });
        };

        tokens.push(Token {
            kind,
            span: offset + start..offset + end,
        });
    }

    Ok(tokens)
}

/// Reorders infix tokens into postfix with the shunting-yard algorithm.
///
/// Operands go straight to the output. An operator first flushes every
/// stacked operator that binds at least as tightly (left associativity), and
/// `)` flushes back to its `(`. Structural problems with operands, such as
/// `a + ;`, are left for the code generator to report.
pub fn to_postfix(tokens: Vec<Token>) -> Result<Postfix, LoweringError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<StackEntry> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Operand(text) => output.push(PostfixToken::Operand {
                text,
                span: token.span,
            }),
            TokenKind::OpenParen => stack.push(StackEntry::Open(token.span)),
            TokenKind::CloseParen => loop {
                match stack.pop() {
                    Some(StackEntry::Operator(op, span)) => {
                        output.push(PostfixToken::Operator { op, span })
                    }
                    Some(StackEntry::Open(_)) => break,
                    None => {
                        return Err(LoweringError::MismatchedParenthesis {
                            kind: ParenMismatch::ExcessClose,
                            span: token.span,
                        })
                    }
                }
            },
            TokenKind::Operator(op) => {
                while matches!(
                    stack.last(),
                    Some(StackEntry::Operator(top, _)) if top.precedence() >= op.precedence()
                ) {
                    if let Some(StackEntry::Operator(top, span)) = stack.pop() {
                        output.push(PostfixToken::Operator { op: top, span });
                    }
                }
                stack.push(StackEntry::Operator(op, token.span));
            }
        }
    }

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Operator(op, span) => output.push(PostfixToken::Operator { op, span }),
            StackEntry::Open(span) => {
                return Err(LoweringError::MismatchedParenthesis {
                    kind: ParenMismatch::UnclosedOpen,
                    span,
                })
            }
        }
    }

    Ok(Postfix(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix_of(text: &str) -> Result<String, LoweringError> {
        let expr = ExprText {
            text: text.to_string(),
            offset: 0,
        };
        lower_expression(&expr).map(|postfix| postfix.to_string())
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(postfix_of("a + b * 2").unwrap(), "a b 2 * +");
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(postfix_of("(a + b) * c").unwrap(), "a b + c *");
    }

    #[test]
    fn test_equal_precedence_is_left_associative() {
        assert_eq!(postfix_of("a - b + c").unwrap(), "a b - c +");
        assert_eq!(postfix_of("a / b * c").unwrap(), "a b / c *");
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(
            postfix_of("((a + b) * (c - 4)) / 2").unwrap(),
            "a b + c 4 - * 2 /"
        );
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(postfix_of("a+b*c").unwrap(), postfix_of(" a +  b*c ").unwrap());
    }

    #[test]
    fn test_multi_character_operands() {
        assert_eq!(postfix_of("count + 120").unwrap(), "count 120 +");
    }

    #[test]
    fn test_excess_close() {
        let err = postfix_of("a + b)").unwrap_err();
        assert_eq!(
            err,
            LoweringError::MismatchedParenthesis {
                kind: ParenMismatch::ExcessClose,
                span: 5..6,
            }
        );
    }

    #[test]
    fn test_unclosed_open() {
        let err = postfix_of("(a + b").unwrap_err();
        assert_eq!(
            err,
            LoweringError::MismatchedParenthesis {
                kind: ParenMismatch::UnclosedOpen,
                span: 0..1,
            }
        );
    }

    #[test]
    fn test_balanced_never_mismatches() {
        for text in ["()", "(a)", "((a))", "(a) + (b)", "a * (b + (c - d))"] {
            assert!(postfix_of(text).is_ok(), "{text} should be balanced");
        }
    }

    #[test]
    fn test_unexpected_character() {
        let err = postfix_of("a % b").unwrap_err();
        assert!(matches!(
            err,
            LoweringError::UnexpectedCharacter { found: '%', .. }
        ));
    }

    #[test]
    fn test_spans_are_absolute() {
        let tokens = tokenize("ab + 7", 10).unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| t.span.clone()).collect();
        assert_eq!(spans, vec![10..12, 13..14, 15..16]);
    }
}
