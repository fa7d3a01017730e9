//! # Sequin Parser
//!
//! Parser for the Sequin sequence diagram language. This crate provides the
//! pipeline from source text to the semantic [`Sequence`] consumed by the
//! renderer.
//!
//! ## Usage
//!
//! ```
//! # use sequin_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         title Login
//!         User -> Server: "POST /login"
//!         Server --> User: ok
//!     "#;
//!
//!     let sequence = parse(source)?;
//!     assert_eq!(sequence.meta().title(), "Login");
//!     Ok(())
//! }
//! ```

pub mod error;
mod generate;
mod lexer;
mod lines;
mod parser;
mod parser_types;
mod span;
mod tokens;

pub use generate::generate;
pub use lexer::tokenise;
pub use lines::{Line, split_lines};
pub use parser::parse_lines;
pub use parser_types::{ParsedSequence, ParsedStage};
pub use span::{Span, Spanned};
pub use tokens::{Token, TokenKind};

use log::info;
use sequin_core::semantic::Sequence;

use error::ParseError;

/// Parse source text into flat, unvalidated stages.
///
/// Runs the lexer, the line assembler and the line parser. Blocks are not yet
/// nested and agents are not yet resolved.
pub fn parse_stages(source: &str) -> Result<ParsedSequence, ParseError> {
    let tokens = lexer::tokenise(source)?;
    let lines = lines::split_lines(tokens);
    parser::parse_lines(&lines)
}

/// Parse source text into a semantic sequence.
///
/// This is the main entry point. It orchestrates the complete pipeline:
///
/// 1. **Tokenise** - Convert source text to tokens
/// 2. **Assemble** - Group tokens into lines
/// 3. **Parse** - Classify each line as a directive or stage
/// 4. **Generate** - Nest blocks, resolve agents and add implicit begin/end stages
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the first diagnostic of the failing
/// phase, with a span into `source`.
pub fn parse(source: &str) -> Result<Sequence, ParseError> {
    let parsed = parse_stages(source)?;
    let sequence = generate::generate(&parsed)?;
    info!(
        agents = sequence.agents().len(),
        stages = sequence.stages().len();
        "Parsed sequence"
    );
    Ok(sequence)
}
