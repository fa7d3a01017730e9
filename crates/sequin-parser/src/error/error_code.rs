//! Error codes for the Sequin diagnostic system.
//!
//! Codes are grouped by pipeline phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Line syntax errors
//! - `E2xx` - Invalid directive values
//! - `E3xx` - Generator (block structure) errors

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    /// A quoted string runs to the end of the input.
    E001,
    /// A character no token rule accepts.
    E002,

    // Line parser
    /// A line matches none of the command grammars.
    E100,
    /// A `note` or `state` line with a missing `:` or a bad agent count.
    E101,

    // Directive values
    /// `terminators` with a style other than none, box, cross or bar.
    E200,

    // Generator
    /// `else` or `elif` outside any block.
    E300,
    /// `end` with no open block.
    E301,
    /// A block still open at the end of the input.
    E302,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
        }
    }

    /// Short description, used as the default label text.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E100 => "unrecognised command",
            ErrorCode::E101 => "invalid note",
            ErrorCode::E200 => "unrecognised terminator",
            ErrorCode::E300 => "section split outside block",
            ErrorCode::E301 => "unmatched block end",
            ErrorCode::E302 => "unterminated block",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
