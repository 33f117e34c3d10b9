//! Flattened output records and JSON encoding.
//!
//! [`flatten`] turns a graph into an [`OutputDiagram`]: one record per node
//! slot and per edge slot, in declaration order, with placeholder slots
//! dropped. Geometry the graph already carries wins; the fallback layout only
//! fills what is unset.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use d2json_core::{
    geometry::Point,
    graph::{EdgeSource, GraphSource, NodeSource},
    identifier::Id,
};

use crate::{
    error::D2JsonError,
    layout::{self, NodeLayout},
};

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputNode {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// An edge between two node identifiers.
///
/// A missing endpoint is written as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEdge {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Target")]
    pub target: String,
    #[serde(rename = "Label")]
    pub label: String,
}

/// The flattened diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDiagram {
    pub nodes: Vec<OutputNode>,
    pub edges: Vec<OutputEdge>,
}

impl OutputDiagram {
    /// Encodes the diagram as JSON, indented by two spaces when `pretty`.
    ///
    /// # Errors
    ///
    /// Returns `D2JsonError::Serialize` if encoding fails.
    pub fn to_json(&self, pretty: bool) -> Result<String, D2JsonError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Merges a node's own geometry with its computed fallback box.
///
/// The position is taken as a pair: it is replaced only when both coordinates
/// are zero. Width and height are filled independently.
fn merge(node: &impl NodeSource, computed: NodeLayout) -> NodeLayout {
    let top_left = node.top_left().unwrap_or_default();
    let position = if top_left.is_zero() {
        computed.top_left()
    } else {
        top_left
    };
    NodeLayout::new(position, node.size().or_fill(computed.size()))
}

fn endpoint(id: Option<Id>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

/// Flattens `graph` into output records.
///
/// Runs the orderer and the fallback planner over the graph, then walks the
/// node and edge slots in their original order.
///
/// # Examples
///
/// ```
/// use d2json::output::flatten;
/// use d2json_core::{graph::{Edge, Graph, Object}, identifier::Id};
///
/// let mut graph = Graph::new();
/// graph.push_object(Some(Object::new(Id::new("client_web"))));
/// graph.push_object(Some(Object::new(Id::new("api_server")).with_label("API")));
/// graph.push_edge(Some(Edge::new(Id::new("client_web"), Id::new("api_server"))));
///
/// let diagram = flatten(&graph);
/// assert_eq!(diagram.nodes[0].x, 50.0);
/// assert_eq!(diagram.nodes[1].label, "API");
/// assert_eq!(diagram.edges[0].target, "api_server");
/// ```
pub fn flatten<G: GraphSource>(graph: &G) -> OutputDiagram {
    let ordered = layout::order(graph.nodes(), graph.edges());
    let computed: IndexMap<Id, NodeLayout> = layout::plan(&ordered);

    let nodes: Vec<OutputNode> = graph
        .nodes()
        .iter()
        .flatten()
        .map(|node| {
            let id = node.id();
            let fallback = computed.get(&id).copied().unwrap_or_else(|| {
                NodeLayout::new(Point::default(), layout::fallback::estimate_size(""))
            });
            let merged = merge(node, fallback);
            OutputNode {
                id: id.to_string(),
                label: node.display_label(),
                x: merged.x(),
                y: merged.y(),
                width: merged.width(),
                height: merged.height(),
            }
        })
        .collect();

    let edges: Vec<OutputEdge> = graph
        .edges()
        .iter()
        .flatten()
        .map(|edge| OutputEdge {
            source: endpoint(edge.source()),
            target: endpoint(edge.target()),
            label: edge.label().unwrap_or_default().to_string(),
        })
        .collect();

    debug!(nodes = nodes.len(), edges = edges.len(); "Flattened diagram");
    OutputDiagram { nodes, edges }
}

#[cfg(test)]
mod tests {
    use d2json_core::{
        geometry::Size,
        graph::{Edge, Graph, Object},
    };

    use super::*;

    #[test]
    fn test_merge_fills_only_unset_fields() {
        let node = Object::new(Id::new("n")).with_size(Size::new(80.0, 0.0));
        let computed = NodeLayout::new(Point::new(300.0, 250.0), Size::new(150.0, 50.0));

        let merged = merge(&node, computed);
        assert_eq!(merged.top_left(), Point::new(300.0, 250.0));
        assert_eq!(merged.size(), Size::new(80.0, 50.0));
    }

    #[test]
    fn test_merge_keeps_position_when_one_coordinate_is_set() {
        let node = Object::new(Id::new("n")).with_top_left(Point::new(0.0, 40.0));
        let computed = NodeLayout::new(Point::new(300.0, 250.0), Size::new(150.0, 50.0));

        let merged = merge(&node, computed);
        assert_eq!(merged.top_left(), Point::new(0.0, 40.0));
        assert_eq!(merged.size(), Size::new(150.0, 50.0));
    }

    #[test]
    fn test_merge_treats_explicit_origin_as_unset() {
        // Zero doubles as "not set", so a node deliberately placed at the
        // origin is moved by the fallback. Accepted ambiguity.
        let node = Object::new(Id::new("n"))
            .with_top_left(Point::new(0.0, 0.0))
            .with_size(Size::new(0.0, 0.0));
        let computed = NodeLayout::new(Point::new(950.0, 450.0), Size::new(120.0, 50.0));

        let merged = merge(&node, computed);
        assert_eq!(merged.top_left(), Point::new(950.0, 450.0));
        assert_eq!(merged.size(), Size::new(120.0, 50.0));
    }

    #[test]
    fn test_missing_endpoint_becomes_empty_string() {
        let mut graph = Graph::new();
        graph.push_object(Some(Object::new(Id::new("a"))));
        graph.push_object(Some(Object::new(Id::new("b"))));
        graph.push_edge(Some(
            Edge::from_endpoints(Some(Id::new("a")), None).with_label("dangling"),
        ));
        graph.push_edge(None);
        graph.push_edge(Some(Edge::new(Id::new("a"), Id::new("b"))));

        let diagram = flatten(&graph);
        assert_eq!(
            diagram.edges,
            [
                OutputEdge {
                    source: "a".to_string(),
                    target: String::new(),
                    label: "dangling".to_string(),
                },
                OutputEdge {
                    source: "a".to_string(),
                    target: "b".to_string(),
                    label: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_nodes_keep_declaration_order() {
        let mut graph = Graph::new();
        graph.push_object(Some(Object::new(Id::new("db_main"))));
        graph.push_object(None);
        graph.push_object(Some(Object::new(Id::new("web_server"))));
        graph.push_edge(Some(Edge::new(Id::new("web_server"), Id::new("db_main"))));

        let diagram = flatten(&graph);
        let ids: Vec<&str> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["db_main", "web_server"]);
        assert_eq!((diagram.nodes[0].x, diagram.nodes[0].y), (950.0, 450.0));
        assert_eq!((diagram.nodes[1].x, diagram.nodes[1].y), (550.0, 350.0));
    }

    #[test]
    fn test_label_defaults_to_identifier() {
        let mut graph = Graph::new();
        graph.push_object(Some(Object::new(Id::new("plain"))));
        graph.push_object(Some(Object::new(Id::new("blank")).with_label("")));

        let diagram = flatten(&graph);
        assert_eq!(diagram.nodes[0].label, "plain");
        assert_eq!(diagram.nodes[1].label, "blank");
    }

    #[test]
    fn test_json_field_names() {
        let diagram = OutputDiagram {
            nodes: vec![OutputNode {
                id: "a".to_string(),
                label: "A".to_string(),
                x: 1.0,
                y: 2.0,
                width: 120.0,
                height: 50.0,
            }],
            edges: vec![OutputEdge {
                source: "a".to_string(),
                target: String::new(),
                label: String::new(),
            }],
        };

        let compact = diagram.to_json(false).expect("serializes");
        assert_eq!(
            compact,
            r#"{"nodes":[{"id":"a","label":"A","x":1.0,"y":2.0,"width":120.0,"height":50.0}],"edges":[{"Source":"a","Target":"","Label":""}]}"#
        );

        let pretty = diagram.to_json(true).expect("serializes");
        assert!(pretty.contains("\n  \"nodes\": ["));
        let back: OutputDiagram = serde_json::from_str(&pretty).expect("parses back");
        assert_eq!(back, diagram);
    }

    #[test]
    fn test_empty_graph() {
        let diagram = flatten(&Graph::new());
        assert_eq!(diagram, OutputDiagram::default());
        assert_eq!(
            diagram.to_json(false).expect("serializes"),
            r#"{"nodes":[],"edges":[]}"#
        );
    }
}
