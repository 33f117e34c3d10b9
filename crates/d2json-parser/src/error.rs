//! Diagnostics reported while reading D2 source.
//!
//! Every phase (lexing, parsing, compiling) reports problems as
//! [`Diagnostic`] values carrying an [`ErrorCode`], a message, labelled
//! source spans and optional help. A failed phase returns them wrapped in a
//! [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use d2json_parser::error::{Diagnostic, ErrorCode};
//! # use d2json_parser::Span;
//! let diag = Diagnostic::error("invalid direction `sideways`")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(11..19), "not a direction")
//!     .with_help("use one of `up`, `down`, `left`, `right`");
//!
//! assert_eq!(diag.to_string(), "error[E200]: invalid direction `sideways`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
