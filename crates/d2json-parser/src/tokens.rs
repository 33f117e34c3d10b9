//! Token definitions for the D2 lexer.

use std::fmt;

use crate::span::Span;

/// A lexical token of the supported D2 subset.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// A run of `[A-Za-z0-9_]` characters: key segments, keywords and numbers.
    Identifier(&'src str),
    /// A double-quoted string with escapes resolved.
    StringLiteral(String),

    /// `->`
    Arrow,
    /// `<-`
    LeftArrow,
    /// `<->`
    DoubleArrow,
    /// `--`
    Line,

    Dot,
    Colon,
    Semicolon,
    LeftBrace,
    RightBrace,

    /// Any other printable character. Only meaningful inside unquoted values.
    Symbol(&'src str),

    Whitespace,
    Newline,
    /// `# ...` up to the end of the line.
    LineComment(&'src str),
}

impl Token<'_> {
    /// Tokens that end a statement.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Token::Newline | Token::Semicolon | Token::LineComment(_)
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(s) | Token::Symbol(s) => write!(f, "{s}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Arrow => write!(f, "->"),
            Token::LeftArrow => write!(f, "<-"),
            Token::DoubleArrow => write!(f, "<->"),
            Token::Line => write!(f, "--"),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => writeln!(f),
            Token::LineComment(s) => write!(f, "#{s}"),
        }
    }
}

/// A token together with its location in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }

    /// Whitespace and newlines carry no meaning for span reporting.
    pub fn is_trivia(&self) -> bool {
        matches!(self.token, Token::Whitespace | Token::Newline)
    }
}
