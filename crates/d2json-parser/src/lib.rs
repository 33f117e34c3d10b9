//! # d2json Parser
//!
//! Reads the subset of the D2 diagram language that d2json understands and
//! produces a [`d2json_core::graph::Graph`].
//!
//! ## Usage
//!
//! ```
//! # use d2json_parser::{parse, error::ParseError};
//! use d2json_core::graph::GraphSource;
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         direction: right
//!         client_browser: Browser
//!         api_server: "API Server"
//!         client_browser -> api_server: HTTPS
//!     "#;
//!
//!     let graph = parse(source)?;
//!     assert_eq!(graph.nodes().len(), 2);
//!     assert_eq!(graph.edges().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod ast;
mod compile;
pub mod error;
mod lexer;
mod parser;
mod span;
mod tokens;

pub use error::ParseError;
pub use span::{Span, Spanned};

use log::{debug, trace};

use d2json_core::graph::Graph;

/// Parse D2 source text into a graph.
///
/// Runs the three phases in order, stopping at the first that fails:
///
/// 1. **Tokenize** - every lexical error in the file is reported at once
/// 2. **Parse** - build the syntax tree; stops at the first syntax error
/// 3. **Compile** - resolve keys and attributes into objects and edges,
///    reporting every semantic error
pub fn parse(source: &str) -> Result<Graph, ParseError> {
    let tokens = lexer::tokenize(source)?;
    trace!(tokens = tokens.len(); "Tokenized D2 source");

    let document = parser::build_document(&tokens)?;
    debug!(statements = document.statements.len(); "Parsed D2 document");

    compile::compile(&document, source)
}

