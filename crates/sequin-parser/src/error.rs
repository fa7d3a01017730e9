//! Error and diagnostic system for the Sequin parser.
//!
//! Every failure in the parsing pipeline is described by a [`Diagnostic`]:
//! a message, an [`ErrorCode`], labelled source spans and optional help
//! text. Parsing stops at the first bad line, so a [`ParseError`] normally
//! carries exactly one diagnostic.
//!
//! ```
//! # use sequin_parser::error::{Diagnostic, ErrorCode};
//! # use sequin_parser::Span;
//! let diag = Diagnostic::error("invalid note")
//!     .with_code(ErrorCode::E101)
//!     .with_label(Span::new(0..10), "no agent before `:`")
//!     .with_help("name the agent, e.g. `note left of A: text`");
//! assert_eq!(diag.to_string(), "error[E101]: invalid note");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
