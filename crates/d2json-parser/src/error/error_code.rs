//! Error codes, grouped by the phase that emits them:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Compile errors

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    /// A string was opened with a quote but never closed on the same line.
    E001,
    /// A control character appeared outside a string.
    E002,
    /// A backslash escape that D2 strings do not support.
    E003,

    // Parser
    /// The parser met a token it did not expect here.
    E100,
    /// A `{` block reached the end of input without its `}`.
    E101,

    // Compile
    /// `direction` set to something other than `up`, `down`, `left`, `right`.
    E200,
    /// `width`, `height`, `top` or `left` given a value that is not a number.
    E201,
    /// `direction` used inside a shape block instead of at the top level.
    E202,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "unclosed block",
            ErrorCode::E200 => "invalid direction",
            ErrorCode::E201 => "non-numeric geometry attribute",
            ErrorCode::E202 => "direction inside a block",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
