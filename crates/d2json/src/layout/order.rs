//! Breadth-first topological ordering.
//!
//! [`order`] arranges nodes so that, as far as the edges allow, sources come
//! before their targets. Nodes with no incoming edges seed a breadth-first
//! walk; anything the walk cannot reach (cycles, self-loops, disconnected
//! nodes) is appended afterwards in declaration order. The function is total:
//! every distinct node appears exactly once in the result.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use log::trace;

use d2json_core::{
    graph::{EdgeSource, NodeSource},
    identifier::Id,
};

/// Adjacency entry for one distinct node.
#[derive(Debug)]
struct Vertex<'a, N> {
    node: &'a N,
    successors: Vec<Id>,
    in_degree: usize,
}

/// Builds adjacency over the known nodes, keyed in first-occurrence order.
///
/// Edges with a missing endpoint, or an endpoint that names no node, are
/// skipped.
fn adjacency<'a, N, E>(nodes: &'a [Option<N>], edges: &[Option<E>]) -> IndexMap<Id, Vertex<'a, N>>
where
    N: NodeSource,
    E: EdgeSource,
{
    let mut vertices: IndexMap<Id, Vertex<'a, N>> = IndexMap::new();
    for node in nodes.iter().flatten() {
        vertices.entry(node.id()).or_insert(Vertex {
            node,
            successors: Vec::new(),
            in_degree: 0,
        });
    }

    for edge in edges.iter().flatten() {
        let (Some(source), Some(target)) = (edge.source(), edge.target()) else {
            continue;
        };
        if !vertices.contains_key(&target) {
            continue;
        }
        let Some(vertex) = vertices.get_mut(&source) else {
            continue;
        };
        vertex.successors.push(target);
        if let Some(vertex) = vertices.get_mut(&target) {
            vertex.in_degree += 1;
        }
    }

    vertices
}

/// Orders `nodes` so that edge sources tend to precede their targets.
///
/// `None` slots in either slice are ignored. When an identifier occurs more
/// than once, the first occurrence decides its place and later ones are not
/// returned.
///
/// # Examples
///
/// ```
/// use d2json::layout::order;
/// use d2json_core::{graph::{Edge, NodeSource, Object}, identifier::Id};
///
/// let nodes = vec![
///     Some(Object::new(Id::new("db"))),
///     Some(Object::new(Id::new("api"))),
///     Some(Object::new(Id::new("web"))),
/// ];
/// let edges = vec![
///     Some(Edge::new(Id::new("web"), Id::new("api"))),
///     Some(Edge::new(Id::new("api"), Id::new("db"))),
/// ];
///
/// let ids: Vec<_> = order(&nodes, &edges).iter().map(|n| n.id()).collect();
/// assert_eq!(ids, [Id::new("web"), Id::new("api"), Id::new("db")]);
/// ```
pub fn order<'a, N, E>(nodes: &'a [Option<N>], edges: &[Option<E>]) -> Vec<&'a N>
where
    N: NodeSource,
    E: EdgeSource,
{
    let vertices = adjacency(nodes, edges);

    let mut queue: VecDeque<Id> = vertices
        .iter()
        .filter(|(_, vertex)| vertex.in_degree == 0)
        .map(|(&id, _)| id)
        .collect();
    if queue.is_empty() {
        queue.extend(vertices.keys().next().copied());
    }
    trace!(seeds = queue.len(), nodes = vertices.len(); "Ordering nodes");

    let mut visited: HashSet<Id> = HashSet::with_capacity(vertices.len());
    let mut ordered = Vec::with_capacity(vertices.len());

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let Some(vertex) = vertices.get(&id) else {
            continue;
        };
        ordered.push(vertex.node);
        queue.extend(
            vertex
                .successors
                .iter()
                .filter(|successor| !visited.contains(successor)),
        );
    }

    for (id, vertex) in &vertices {
        if !visited.contains(id) {
            ordered.push(vertex.node);
        }
    }

    ordered
}
