//! Sugiyama layout engine.
//!
//! Based on the Sugiyama method for layered drawing of directed graphs, using
//! the rust-sugiyama implementation. Only objects that take part in at least
//! one edge between two distinct objects are positioned; isolated objects are
//! left for the fallback layout.

use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
};

use indexmap::IndexMap;
use log::debug;
use rust_sugiyama::configure::Config;

use d2json_core::{
    geometry::{Bounds, Point, Size},
    graph::{Direction, EdgeSource, Graph, GraphSource, NodeSource},
    identifier::Id,
};

use crate::{error::D2JsonError, layout::fallback::estimate_size};

use super::ExternalEngine;

/// Distance kept between the laid out drawing and the origin.
///
/// A top-left of exactly `(0, 0)` reads as "unset" downstream.
const MARGIN: f32 = 20.0;

/// Raw rust-sugiyama output for one connected component: sequential vertex
/// ids with grid coordinates.
type GridLayout = Vec<(u64, (f64, f64))>;

/// The Sugiyama layout engine.
pub struct Engine {
    /// Horizontal spacing between nodes of the same rank
    horizontal_spacing: f32,

    /// Vertical spacing between ranks
    vertical_spacing: f32,
}

impl Engine {
    /// Create a new Sugiyama layout engine
    pub fn new() -> Self {
        Self {
            horizontal_spacing: 50.0,
            vertical_spacing: 80.0,
        }
    }

    /// Set the horizontal spacing between nodes of the same rank
    pub fn set_horizontal_spacing(&mut self, spacing: f32) -> &mut Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the vertical spacing between ranks
    pub fn set_vertical_spacing(&mut self, spacing: f32) -> &mut Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Declared size of each distinct object, with zero dimensions filled from
    /// the label estimate.
    fn node_sizes(graph: &Graph) -> IndexMap<Id, Size> {
        let mut sizes = IndexMap::new();
        for object in graph.objects() {
            sizes
                .entry(object.id())
                .or_insert_with(|| object.size().or_fill(estimate_size(&object.display_label())));
        }
        sizes
    }

    /// Runs rust-sugiyama over `edges`, catching any panic.
    fn grid_layouts(
        edges: Vec<(u32, u32)>,
        avg_node_size: f32,
    ) -> Result<Vec<GridLayout>, D2JsonError> {
        let layouts = panic::catch_unwind(AssertUnwindSafe(move || {
            // Configure with adaptive vertex spacing based on average node size
            let config = Config {
                minimum_length: 1,
                vertex_spacing: (avg_node_size / 50.0).clamp(2.0, 5.0) as f64,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&edges, &config)
        }));

        match layouts {
            Ok(results) if !results.is_empty() => Ok(results
                .into_iter()
                .map(|(coords, _, _)| {
                    coords
                        .into_iter()
                        .map(|(id, (x, y))| (id as u64, (x as f64, y as f64)))
                        .collect()
                })
                .collect()),
            Ok(_) => Err(D2JsonError::Layout(
                "Rust-sugiyama returned empty layout results".to_string(),
            )),
            Err(err) => {
                let message = if let Some(panic_msg) = err.downcast_ref::<String>() {
                    format!("Rust-sugiyama layout engine panicked: {panic_msg}")
                } else {
                    "Rust-sugiyama layout engine panicked with unknown error".to_string()
                };
                Err(D2JsonError::Layout(message))
            }
        }
    }

    /// Calculates node centers in a top-down frame.
    ///
    /// The first coordinate runs along a rank, the second across ranks.
    /// Connected components are placed side by side.
    fn positions(
        &self,
        graph: &Graph,
        sizes: &IndexMap<Id, Size>,
        horizontal: bool,
    ) -> Result<HashMap<Id, Point>, D2JsonError> {
        let mut positions = HashMap::new();

        // Map node IDs to u32 IDs for rust-sugiyama
        let node_ids: HashMap<Id, u32> = sizes
            .keys()
            .enumerate()
            .map(|(i, &id)| (id, i as u32))
            .collect();
        let id_to_node_id: HashMap<u32, Id> =
            node_ids.iter().map(|(&node, &id)| (id, node)).collect();

        let mut edges = Vec::new();
        for edge in graph.edges().iter().flatten() {
            let (Some(source), Some(target)) = (edge.source(), edge.target()) else {
                continue;
            };
            if let (Some(&source_id), Some(&target_id)) =
                (node_ids.get(&source), node_ids.get(&target))
            {
                // Skip self-loops
                if source_id != target_id {
                    edges.push((source_id, target_id));
                }
            }
        }

        if edges.is_empty() {
            debug!("Graph has no edges between distinct nodes, nothing to lay out");
            return Ok(positions);
        }

        debug!(nodes = node_ids.len(), edges = edges.len(); "Applying Sugiyama algorithm");

        // Ranks follow the flow direction, so the extent that separates ranks
        // swaps with the direction.
        let max_width = sizes.values().map(|s| s.width()).fold(0.0, f32::max);
        let max_height = sizes.values().map(|s| s.height()).fold(0.0, f32::max);
        let (cross_extent, rank_extent) = if horizontal {
            (max_height, max_width)
        } else {
            (max_width, max_height)
        };
        let cross_step = self.horizontal_spacing + cross_extent * 0.5;
        let rank_step = self.vertical_spacing + rank_extent;

        let avg_node_size = sizes
            .values()
            .map(|s| (s.width() + s.height()) / 2.0)
            .sum::<f32>()
            / sizes.len().max(1) as f32;

        let flow = edges.clone();
        let components = Self::grid_layouts(edges, avg_node_size)?;

        let mut grid: HashMap<u32, (f64, f64)> = HashMap::new();
        let mut offset_x = 0.0;
        for coords in &components {
            let min_x = coords
                .iter()
                .map(|&(_, (x, _))| x)
                .fold(f64::INFINITY, f64::min);
            let max_x = coords
                .iter()
                .map(|&(_, (x, _))| x)
                .fold(f64::NEG_INFINITY, f64::max);
            for &(id, (x, y)) in coords {
                // Convert safely to u32 with bounds checking
                let Ok(id) = u32::try_from(id) else {
                    debug!("Node ID {id} from rust-sugiyama result is out of valid range");
                    continue;
                };
                grid.insert(id, (x - min_x + offset_x, y));
            }
            if min_x.is_finite() {
                offset_x += max_x - min_x + 2.0;
            }
        }

        // Ranks must grow away from the sources.
        let rank_sign = if Self::ranks_point_up(&flow, &grid) { -1.0 } else { 1.0 };

        for (id, (x, y)) in grid {
            if let Some(&node_id) = id_to_node_id.get(&id) {
                let x_pos = (x as f32) * cross_step;
                let y_pos = (y as f32) * rank_sign * rank_step;
                positions.insert(node_id, Point::new(x_pos, y_pos));
            }
        }

        // If mapping failed for all nodes, return error
        if positions.is_empty() {
            return Err(D2JsonError::Layout(
                "Failed to map any rust-sugiyama positions back to graph nodes".to_string(),
            ));
        }

        Ok(positions)
    }

    /// `true` when edges mostly run towards smaller rank coordinates.
    ///
    /// When forward and back edges cancel out, the first declared edge that
    /// crosses ranks decides.
    fn ranks_point_up(edges: &[(u32, u32)], grid: &HashMap<u32, (f64, f64)>) -> bool {
        let drifts: Vec<f64> = edges
            .iter()
            .filter_map(|(source, target)| Some(grid.get(target)?.1 - grid.get(source)?.1))
            .collect();

        let drift: f64 = drifts.iter().sum();
        if drift.abs() > f64::EPSILON {
            return drift < 0.0;
        }
        drifts
            .into_iter()
            .find(|d| d.abs() > f64::EPSILON)
            .is_some_and(|d| d < 0.0)
    }

    /// Maps a center from the top-down frame to `direction`.
    fn orient(direction: Direction, center: Point) -> Point {
        match direction {
            Direction::Down => center,
            Direction::Up => center.flip_y(),
            Direction::Right => center.transpose(),
            Direction::Left => center.transpose().flip_x(),
        }
    }
}

impl ExternalEngine for Engine {
    fn apply(&self, graph: &mut Graph) -> Result<(), D2JsonError> {
        let direction = graph.direction();
        let sizes = Self::node_sizes(graph);
        let centers = self.positions(graph, &sizes, direction.is_horizontal())?;
        if centers.is_empty() {
            return Ok(());
        }

        // Translate so the whole drawing sits at the margin.
        let bounds: HashMap<Id, Bounds> = centers
            .iter()
            .filter_map(|(id, &center)| {
                let size = sizes.get(id)?;
                Some((*id, Bounds::new_from_center(Self::orient(direction, center), *size)))
            })
            .collect();
        let Some(extent) = bounds.values().copied().reduce(|acc, b| acc.merge(&b)) else {
            return Ok(());
        };
        let offset = Point::new(MARGIN, MARGIN).sub_point(extent.min_point());

        for object in graph.objects_mut() {
            let id = object.id();
            if let (Some(node_bounds), Some(&size)) = (bounds.get(&id), sizes.get(&id)) {
                object.set_top_left(node_bounds.min_point().add_point(offset));
                object.set_size(size);
            }
        }

        debug!(
            positioned = bounds.len(),
            width = extent.to_size().width(),
            height = extent.to_size().height();
            "Sugiyama layout generated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use d2json_core::graph::{Edge, Object};

    use super::*;

    fn graph(names: &[&str], pairs: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new();
        for name in names {
            graph.push_object(Some(Object::new(Id::new(name))));
        }
        for (source, target) in pairs {
            graph.push_edge(Some(Edge::new(Id::new(source), Id::new(target))));
        }
        graph
    }

    fn top_left(graph: &Graph, id: &str) -> Option<Point> {
        graph.object(Id::new(id)).and_then(NodeSource::top_left)
    }

    #[test]
    fn test_edgeless_graph_is_left_unset() {
        let mut graph = graph(&["a", "b"], &[("a", "a")]);
        Engine::new().apply(&mut graph).expect("layout succeeds");

        assert_eq!(top_left(&graph, "a"), None);
        assert_eq!(top_left(&graph, "b"), None);
    }

    #[test]
    fn test_connected_nodes_are_positioned_off_origin() {
        let mut graph = graph(&["web", "api", "lonely"], &[("web", "api")]);
        Engine::new().apply(&mut graph).expect("layout succeeds");

        let web = top_left(&graph, "web").expect("web positioned");
        let api = top_left(&graph, "api").expect("api positioned");
        assert!(web.x() > 0.0 && web.y() > 0.0);
        assert!(api.x() > 0.0 && api.y() > 0.0);
        assert!(web.y() < api.y(), "source rank is above target rank");
        assert_eq!(top_left(&graph, "lonely"), None);

        let size = graph.object(Id::new("web")).map(NodeSource::size);
        assert_eq!(size, Some(Size::new(120.0, 50.0)));
    }

    #[test]
    fn test_declared_size_is_kept() {
        let mut graph = graph(&["a", "b"], &[("a", "b")]);
        if let Some(object) = graph.object_mut(Id::new("a")) {
            object.set_size(Size::new(300.0, 0.0));
        }
        Engine::new().apply(&mut graph).expect("layout succeeds");

        let size = graph.object(Id::new("a")).map(NodeSource::size);
        assert_eq!(size, Some(Size::new(300.0, 50.0)));
    }

    #[test]
    fn test_right_direction_runs_left_to_right() {
        let mut graph = graph(&["a", "b"], &[("a", "b")]);
        graph.set_direction(Direction::Right);
        Engine::new().apply(&mut graph).expect("layout succeeds");

        let a = top_left(&graph, "a").expect("a positioned");
        let b = top_left(&graph, "b").expect("b positioned");
        assert!(a.x() < b.x());
    }

    #[test]
    fn test_up_direction_runs_bottom_to_top() {
        let mut graph = graph(&["a", "b"], &[("a", "b")]);
        graph.set_direction(Direction::Up);
        Engine::new().apply(&mut graph).expect("layout succeeds");

        let a = top_left(&graph, "a").expect("a positioned");
        let b = top_left(&graph, "b").expect("b positioned");
        assert!(a.y() > b.y());
    }

    #[test]
    fn test_ranks_point_up_by_total_drift() {
        let grid = HashMap::from([(0, (0.0, 2.0)), (1, (0.0, 1.0)), (2, (0.0, 0.0))]);

        assert!(Engine::ranks_point_up(&[(0, 1), (1, 2), (2, 1)], &grid));
        assert!(!Engine::ranks_point_up(&[(2, 1), (1, 0), (1, 2)], &grid));
    }

    #[test]
    fn test_balanced_cycle_follows_first_edge() {
        let grid = HashMap::from([(0, (0.0, 2.0)), (1, (0.0, 1.0)), (2, (0.0, 0.0))]);
        let round_trip = [(0, 1), (1, 2), (2, 1), (1, 0)];
        let reversed = [(2, 1), (1, 0), (0, 1), (1, 2)];

        assert!(Engine::ranks_point_up(&round_trip, &grid));
        assert!(!Engine::ranks_point_up(&reversed, &grid));
        assert!(!Engine::ranks_point_up(&[], &grid));
    }

    #[test]
    fn test_request_response_cycle_keeps_declared_flow() {
        let mut graph = graph(
            &["client", "server", "database"],
            &[
                ("client", "server"),
                ("server", "database"),
                ("database", "server"),
                ("server", "client"),
            ],
        );
        graph.set_direction(Direction::Right);
        Engine::new().apply(&mut graph).expect("layout succeeds");

        let client = top_left(&graph, "client").expect("client positioned");
        let server = top_left(&graph, "server").expect("server positioned");
        let database = top_left(&graph, "database").expect("database positioned");
        assert!(client.x() < server.x());
        assert!(server.x() < database.x());
    }

    #[test]
    fn test_orient() {
        let p = Point::new(10.0, 30.0);
        assert_eq!(Engine::orient(Direction::Down, p), p);
        assert_eq!(Engine::orient(Direction::Up, p), Point::new(10.0, -30.0));
        assert_eq!(Engine::orient(Direction::Right, p), Point::new(30.0, 10.0));
        assert_eq!(Engine::orient(Direction::Left, p), Point::new(-30.0, 10.0));
    }
}
