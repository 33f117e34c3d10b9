//! Syntax tree for the supported D2 subset.
//!
//! The tree keeps spans for everything a diagnostic may point at. Unquoted
//! values are stored as spans only; their text is sliced from the source when
//! the tree is compiled.

use crate::span::{Span, Spanned};

/// A whole D2 file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `key`, `key: value`, `key { ... }`
    Shape(ShapeDecl),
    /// `a -> b -> c: label`
    Connection(ConnectionDecl),
}

/// A dotted key such as `cloud.api` or `"Load Balancer"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    head: Spanned<String>,
    tail: Vec<Spanned<String>>,
}

impl Key {
    pub fn new(head: Spanned<String>) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: Spanned<String>) {
        self.tail.push(segment);
    }

    pub fn head(&self) -> &Spanned<String> {
        &self.head
    }

    pub fn tail(&self) -> &[Spanned<String>] {
        &self.tail
    }

    /// All segments, first to last.
    pub fn segments(&self) -> impl Iterator<Item = &Spanned<String>> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// `true` for an undotted key.
    pub fn is_single(&self) -> bool {
        self.tail.is_empty()
    }

    pub fn span(&self) -> Span {
        self.tail
            .last()
            .map_or(self.head.span(), |last| self.head.span().union(last.span()))
    }
}

/// The value after a `:`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Quoted(Spanned<String>),
    /// Raw text running to the end of the statement.
    Unquoted(Span),
}

impl Value {
    pub fn span(&self) -> Span {
        match self {
            Value::Quoted(s) => s.span(),
            Value::Unquoted(span) => *span,
        }
    }

    /// The value text; unquoted values are trimmed.
    pub fn text<'a>(&'a self, source: &'a str) -> &'a str {
        match self {
            Value::Quoted(s) => s.inner(),
            Value::Unquoted(span) => source.get(span.range()).unwrap_or_default().trim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDecl {
    pub key: Key,
    pub value: Option<Value>,
    pub block: Option<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKind {
    /// `->`
    Forward,
    /// `<-`
    Backward,
    /// `<->`
    Both,
    /// `--`
    Undirected,
}

impl ArrowKind {
    /// Orders a hop's endpoints as (source, target).
    pub fn orient<T>(self, left: T, right: T) -> (T, T) {
        match self {
            ArrowKind::Backward => (right, left),
            ArrowKind::Forward | ArrowKind::Both | ArrowKind::Undirected => (left, right),
        }
    }
}

/// One `-> key` step of a connection chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub arrow: Spanned<ArrowKind>,
    pub target: Key,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDecl {
    pub source: Key,
    pub hops: Vec<Hop>,
    pub value: Option<Value>,
    pub block: Option<Block>,
}
