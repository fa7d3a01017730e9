//! Token definitions produced by the lexer.

use std::fmt;

use crate::span::Span;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of characters up to whitespace or one of `:+-<>,`.
    Word,
    /// A single- or double-quoted string with escapes already expanded.
    Quoted,
    /// A maximal run of `+`, `-`, `<` and `>`.
    Operator,
    Comma,
    Colon,
    Newline,
}

/// A lexed token with its text payload and source span.
///
/// Newline tokens carry the payload `"\n"`. Comments are never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// `true` if this is the bare (unquoted) word `keyword`.
    pub fn is_word(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text == keyword
    }

    pub fn is_comma(&self) -> bool {
        self.kind == TokenKind::Comma
    }

    pub fn is_colon(&self) -> bool {
        self.kind == TokenKind::Colon
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Newline
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
