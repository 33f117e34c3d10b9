//! Graph model produced by the D2 compiler and consumed by the layout stages.
//!
//! The layout code is written against the small accessor traits
//! [`GraphSource`], [`NodeSource`] and [`EdgeSource`] rather than against
//! [`Graph`] directly, so any producer that can hand out ordered node and edge
//! slots can be laid out.
//!
//! Slots are `Option`s: a `None` entry is a placeholder that every consumer
//! skips. Geometry fields use zero for "not computed"; an object that no
//! layout engine has visited has no top-left point and a zero size.

use std::collections::HashMap;

use crate::{
    geometry::{Point, Size},
    identifier::Id,
};

/// Read access to one node of a graph.
pub trait NodeSource {
    /// Stable, unique identifier.
    fn id(&self) -> Id;

    /// Display label as written in the source, if any.
    fn label(&self) -> Option<&str>;

    /// Externally computed top-left corner, if a layout engine set one.
    fn top_left(&self) -> Option<Point>;

    /// Externally computed or declared size. Zero dimensions are unset.
    fn size(&self) -> Size;

    /// Label used for display and measuring: the label when it is non-empty,
    /// otherwise the identifier.
    fn display_label(&self) -> String {
        match self.label() {
            Some(label) if !label.is_empty() => label.to_owned(),
            _ => self.id().to_string(),
        }
    }
}

/// Read access to one edge of a graph.
pub trait EdgeSource {
    /// Source endpoint, `None` when the endpoint is missing.
    fn source(&self) -> Option<Id>;

    /// Target endpoint, `None` when the endpoint is missing.
    fn target(&self) -> Option<Id>;

    /// Edge label, if any.
    fn label(&self) -> Option<&str>;
}

/// Ordered node and edge slots of a graph.
pub trait GraphSource {
    type Node: NodeSource;
    type Edge: EdgeSource;

    /// Node slots in declaration order.
    fn nodes(&self) -> &[Option<Self::Node>];

    /// Edge slots in declaration order.
    fn edges(&self) -> &[Option<Self::Edge>];
}

/// Flow direction requested by a diagram's top-level `direction` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parses a D2 direction keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Returns `true` for `left` and `right`.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// A shape declared in (or implied by) the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    id: Id,
    label: Option<String>,
    top_left: Option<Point>,
    size: Size,
}

impl Object {
    /// Creates an object with no label and no geometry.
    pub fn new(id: Id) -> Self {
        Self {
            id,
            label: None,
            top_left: None,
            size: Size::default(),
        }
    }

    /// Builder-style label setter.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder-style position setter.
    pub fn with_top_left(mut self, top_left: Point) -> Self {
        self.top_left = Some(top_left);
        self
    }

    /// Builder-style size setter.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn set_top_left(&mut self, top_left: Point) {
        self.top_left = Some(top_left);
    }

    /// Sets only the x coordinate, keeping any existing y.
    pub fn set_left(&mut self, x: f32) {
        let y = self.top_left.map(Point::y).unwrap_or_default();
        self.top_left = Some(Point::new(x, y));
    }

    /// Sets only the y coordinate, keeping any existing x.
    pub fn set_top(&mut self, y: f32) {
        let x = self.top_left.map(Point::x).unwrap_or_default();
        self.top_left = Some(Point::new(x, y));
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}

impl NodeSource for Object {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn top_left(&self) -> Option<Point> {
        self.top_left
    }

    fn size(&self) -> Size {
        self.size
    }
}

/// A connection between two objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: Option<Id>,
    target: Option<Id>,
    label: Option<String>,
}

impl Edge {
    /// Creates an edge between two known endpoints.
    pub fn new(source: Id, target: Id) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
            label: None,
        }
    }

    /// Creates an edge whose endpoints may be missing.
    pub fn from_endpoints(source: Option<Id>, target: Option<Id>) -> Self {
        Self {
            source,
            target,
            label: None,
        }
    }

    /// Builder-style label setter.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl EdgeSource for Edge {
    fn source(&self) -> Option<Id> {
        self.source
    }

    fn target(&self) -> Option<Id> {
        self.target
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// An ordered collection of objects and edges.
///
/// # Examples
///
/// ```
/// use d2json_core::{graph::{Edge, Graph, GraphSource}, identifier::Id};
///
/// let mut graph = Graph::new();
/// graph.ensure_object(Id::new("client")).set_label("Client");
/// graph.ensure_object(Id::new("server"));
/// graph.push_edge(Some(Edge::new(Id::new("client"), Id::new("server"))));
///
/// assert_eq!(graph.nodes().len(), 2);
/// assert_eq!(graph.edges().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    direction: Direction,
    objects: Vec<Option<Object>>,
    edges: Vec<Option<Edge>>,
    // First slot holding each identifier.
    index: HashMap<Id, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Appends an object slot. A duplicate identifier is stored but lookups
    /// keep resolving to the first occurrence.
    pub fn push_object(&mut self, object: Option<Object>) {
        if let Some(object) = &object {
            self.index.entry(object.id).or_insert(self.objects.len());
        }
        self.objects.push(object);
    }

    /// Appends an edge slot.
    pub fn push_edge(&mut self, edge: Option<Edge>) {
        self.edges.push(edge);
    }

    /// Returns the object with `id`, creating it at the end of the node order
    /// if it does not exist yet.
    pub fn ensure_object(&mut self, id: Id) -> &mut Object {
        let idx = match self.index.get(&id) {
            Some(&idx) => idx,
            None => {
                self.push_object(Some(Object::new(id)));
                self.objects.len() - 1
            }
        };
        self.objects[idx].get_or_insert_with(|| Object::new(id))
    }

    /// Looks up an object by identifier.
    pub fn object(&self, id: Id) -> Option<&Object> {
        self.index
            .get(&id)
            .and_then(|&idx| self.objects[idx].as_ref())
    }

    /// Looks up an object by identifier for modification.
    pub fn object_mut(&mut self, id: Id) -> Option<&mut Object> {
        self.index
            .get(&id)
            .and_then(|&idx| self.objects[idx].as_mut())
    }

    /// Iterates over the non-placeholder objects in order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter().flatten()
    }

    /// Iterates mutably over the non-placeholder objects in order.
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.objects.iter_mut().flatten()
    }
}

impl GraphSource for Graph {
    type Node = Object;
    type Edge = Edge;

    fn nodes(&self) -> &[Option<Object>] {
        &self.objects
    }

    fn edges(&self) -> &[Option<Edge>] {
        &self.edges
    }
}
