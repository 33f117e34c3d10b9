//! Lowering of the syntax tree into a [`Graph`].
//!
//! Keys are resolved against the enclosing block, so `x { y }` declares
//! `x.y`. Every object on a dotted path is created, parents first, and an
//! object keeps the position of its first mention however often it is
//! redeclared.

use log::debug;

use d2json_core::{
    graph::{Direction, Edge, Graph, NodeSource},
    identifier::Id,
};

use crate::{
    ast::{Block, ConnectionDecl, Document, Key, ShapeDecl, Statement, Value},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::{Span, Spanned},
};

/// Reserved keys that configure an object rather than declare a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Label,
    Width,
    Height,
    Top,
    Left,
    Direction,
    /// Understood by D2 but irrelevant to the JSON output.
    Ignored,
}

impl Attribute {
    fn from_key(name: &str) -> Option<Self> {
        match name {
            "label" => Some(Self::Label),
            "width" => Some(Self::Width),
            "height" => Some(Self::Height),
            "top" => Some(Self::Top),
            "left" => Some(Self::Left),
            "direction" => Some(Self::Direction),
            "shape" | "icon" | "near" | "tooltip" | "link" | "style" | "class" | "classes"
            | "constraint" | "source-arrowhead" | "target-arrowhead" => Some(Self::Ignored),
            _ => None,
        }
    }
}

struct Compiler<'a> {
    source: &'a str,
    graph: Graph,
    diagnostics: DiagnosticCollector,
}

impl<'a> Compiler<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            graph: Graph::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn statements(&mut self, statements: &[Statement], scope: Option<Id>) {
        for statement in statements {
            match statement {
                Statement::Shape(decl) => self.shape(decl, scope),
                Statement::Connection(conn) => self.connection(conn, scope),
            }
        }
    }

    fn shape(&mut self, decl: &ShapeDecl, scope: Option<Id>) {
        let segments: Vec<&Spanned<String>> = decl.key.segments().collect();

        match segments
            .iter()
            .position(|segment| Attribute::from_key(segment.inner()).is_some())
        {
            Some(idx) => {
                let owner = self.declare(&segments[..idx], scope);
                self.attribute(owner, segments[idx], decl);
            }
            None => {
                let id = self.endpoint(&decl.key, scope);
                if let Some(value) = &decl.value {
                    let label = value.text(self.source).to_owned();
                    self.graph.ensure_object(id).set_label(label);
                }
                if let Some(block) = &decl.block {
                    self.statements(&block.statements, Some(id));
                }
            }
        }
    }

    /// Creates every object along `segments` and returns the last one, or
    /// `scope` itself when there are no segments.
    fn declare(&mut self, segments: &[&Spanned<String>], scope: Option<Id>) -> Option<Id> {
        segments
            .iter()
            .fold(scope, |parent, segment| Some(self.object(parent, segment.inner())))
    }

    /// Resolves a full key to an object, creating it and its parents.
    fn endpoint(&mut self, key: &Key, scope: Option<Id>) -> Id {
        let mut id = self.object(scope, key.head().inner());
        for segment in key.tail() {
            id = self.object(Some(id), segment.inner());
        }
        id
    }

    /// Ensures the object `name` under `parent` exists and returns it.
    ///
    /// A nested object is labelled with its key as written until a label
    /// is declared.
    fn object(&mut self, parent: Option<Id>, name: &str) -> Id {
        let Some(parent) = parent else {
            let id = Id::new(name);
            self.graph.ensure_object(id);
            return id;
        };

        let id = parent.create_nested(Id::new(name));
        let object = self.graph.ensure_object(id);
        if object.label().is_none() {
            object.set_label(name);
        }
        id
    }

    fn attribute(&mut self, owner: Option<Id>, name: &Spanned<String>, decl: &ShapeDecl) {
        let value = decl.value.as_ref();

        match Attribute::from_key(name.inner()) {
            Some(Attribute::Direction) => match owner {
                None => self.direction(value, name.span()),
                Some(_) => self.diagnostics.emit(
                    Diagnostic::error("`direction` is only allowed at the top level")
                        .with_code(ErrorCode::E202)
                        .with_label(name.span(), "inside a block")
                        .with_help("move `direction` to the top level of the file"),
                ),
            },
            Some(Attribute::Label) => {
                if let (Some(owner), Some(value)) = (owner, value) {
                    let label = value.text(self.source).to_owned();
                    self.graph.ensure_object(owner).set_label(label);
                }
            }
            Some(attr @ (Attribute::Width | Attribute::Height | Attribute::Top | Attribute::Left)) => {
                let Some(number) = self.number(name, value) else {
                    return;
                };
                let Some(owner) = owner else {
                    return;
                };
                let object = self.graph.ensure_object(owner);
                match attr {
                    Attribute::Width => object.set_size(object.size().with_width(number)),
                    Attribute::Height => object.set_size(object.size().with_height(number)),
                    Attribute::Top => object.set_top(number),
                    _ => object.set_left(number),
                }
            }
            Some(Attribute::Ignored) | None => {}
        }
    }

    fn direction(&mut self, value: Option<&Value>, key_span: Span) {
        let text = value.map(|v| v.text(self.source)).unwrap_or_default();

        match Direction::from_keyword(text) {
            Some(direction) => self.graph.set_direction(direction),
            None => self.diagnostics.emit(
                Diagnostic::error(format!("invalid direction `{text}`"))
                    .with_code(ErrorCode::E200)
                    .with_label(value.map_or(key_span, Value::span), "not a direction")
                    .with_help("use one of `up`, `down`, `left`, `right`"),
            ),
        }
    }

    fn number(&mut self, name: &Spanned<String>, value: Option<&Value>) -> Option<f32> {
        let parsed = value
            .and_then(|v| v.text(self.source).parse::<f32>().ok())
            .filter(|n| n.is_finite());

        if parsed.is_none() {
            self.diagnostics.emit(
                Diagnostic::error(format!("`{}` must be a number", name.inner()))
                    .with_code(ErrorCode::E201)
                    .with_label(value.map_or(name.span(), Value::span), "expected a number")
                    .with_help(format!("write the value in pixels, e.g. `{}: 120`", name.inner())),
            );
        }

        parsed
    }

    fn connection(&mut self, conn: &ConnectionDecl, scope: Option<Id>) {
        let mut endpoints = Vec::with_capacity(conn.hops.len() + 1);
        endpoints.push(self.endpoint(&conn.source, scope));
        for hop in &conn.hops {
            endpoints.push(self.endpoint(&hop.target, scope));
        }

        let label = match &conn.value {
            Some(value) => Some(value.text(self.source).to_owned()),
            None => conn.block.as_ref().and_then(|b| self.edge_label(b)),
        };

        for (hop, pair) in conn.hops.iter().zip(endpoints.windows(2)) {
            let (source, target) = hop.arrow.inner().orient(pair[0], pair[1]);
            let mut edge = Edge::new(source, target);
            if let Some(label) = &label {
                edge = edge.with_label(label.clone());
            }
            self.graph.push_edge(Some(edge));
        }
    }

    /// `label: ...` inside a connection block.
    fn edge_label(&self, block: &Block) -> Option<String> {
        block.statements.iter().rev().find_map(|statement| match statement {
            Statement::Shape(decl) if decl.key.is_single() && decl.key.head().inner() == "label" => {
                decl.value.as_ref().map(|v| v.text(self.source).to_owned())
            }
            _ => None,
        })
    }

    fn finish(self) -> Result<Graph, ParseError> {
        let Self {
            graph, diagnostics, ..
        } = self;
        diagnostics.finish().map(|()| graph)
    }
}

/// Compile a parsed document into a graph.
pub fn compile(document: &Document, source: &str) -> Result<Graph, ParseError> {
    let mut compiler = Compiler::new(source);
    compiler.statements(&document.statements, None);

    let result = compiler.finish();
    if let Ok(graph) = &result {
        debug!(
            objects = graph.objects().count(),
            direction:? = graph.direction();
            "Compiled D2 document"
        );
    }
    result
}
