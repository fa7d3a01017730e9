//! Groups tokens into logical lines.

use std::fmt;

use crate::{span::Span, tokens::Token};

/// A non-empty run of tokens between newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    tokens: Vec<Token>,
}

impl Line {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Span from the first to the last token.
    pub fn span(&self) -> Span {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => first.span().union(last.span()),
            _ => Span::default(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_tokens(&self.tokens))
    }
}

/// Joins token texts with single spaces.
pub(crate) fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a token stream on newline tokens, dropping empty lines.
pub fn split_lines(tokens: Vec<Token>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Vec::new();

    for token in tokens {
        if token.is_newline() {
            if !current.is_empty() {
                lines.push(Line {
                    tokens: std::mem::take(&mut current),
                });
            }
        } else {
            current.push(token);
        }
    }
    if !current.is_empty() {
        lines.push(Line { tokens: current });
    }

    lines
}
