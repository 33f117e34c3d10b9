//! Deterministic fallback placement.
//!
//! [`plan`] gives every node a box without looking at anything an external
//! engine computed. Nodes are classified into a [`Tier`] and packed left to
//! right along that tier's lane in the order they are given, so the result
//! depends only on the node sequence and the labels.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;

use d2json_core::{
    geometry::{Point, Size},
    graph::NodeSource,
    identifier::Id,
};

use super::tier::Tier;

const CHAR_WIDTH: f32 = 8.0;
const TEXT_PADDING: f32 = 40.0;
const MIN_WIDTH: f32 = 120.0;
const MAX_WIDTH: f32 = 200.0;
const NODE_HEIGHT: f32 = 50.0;

/// A computed box for one node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeLayout {
    top_left: Point,
    size: Size,
}

impl NodeLayout {
    pub fn new(top_left: Point, size: Size) -> Self {
        Self { top_left, size }
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn x(&self) -> f32 {
        self.top_left.x()
    }

    pub fn y(&self) -> f32 {
        self.top_left.y()
    }

    pub fn width(&self) -> f32 {
        self.size.width()
    }

    pub fn height(&self) -> f32 {
        self.size.height()
    }
}

/// Estimates the box size needed for `label`.
///
/// The width grows with the label's byte length and is clamped to a readable
/// range; the height is fixed.
pub fn estimate_size(label: &str) -> Size {
    let width = (label.len() as f32 * CHAR_WIDTH + TEXT_PADDING).clamp(MIN_WIDTH, MAX_WIDTH);
    Size::new(width, NODE_HEIGHT)
}

/// Computes a box for every node in `ordered`.
///
/// Lane indices start at zero for each call and advance once per node placed
/// in a tier. A node whose identifier was already placed keeps its first box.
///
/// # Examples
///
/// ```
/// use d2json::layout::plan;
/// use d2json_core::{graph::Object, identifier::Id};
///
/// let primary = Object::new(Id::new("db_primary"));
/// let replica = Object::new(Id::new("db_replica"));
/// let layout = plan(&[&primary, &replica]);
///
/// assert_eq!(layout[&Id::new("db_primary")].x(), 950.0);
/// assert_eq!(layout[&Id::new("db_replica")].x(), 1090.0);
/// ```
pub fn plan<N: NodeSource>(ordered: &[&N]) -> IndexMap<Id, NodeLayout> {
    let mut lanes: HashMap<Tier, usize> = HashMap::new();
    let mut layout = IndexMap::with_capacity(ordered.len());

    for node in ordered {
        let id = node.id();
        if layout.contains_key(&id) {
            continue;
        }

        let tier = id.with_str(Tier::classify);
        let spec = tier.spec();
        let lane = lanes.entry(tier).or_insert(0);
        let x = spec.base_x() + *lane as f32 * spec.spacing();
        *lane += 1;

        let size = estimate_size(&node.display_label());
        trace!(id:% = id, tier:% = tier, x; "Placed node in fallback lane");
        layout.insert(id, NodeLayout::new(Point::new(x, spec.y()), size));
    }

    layout
}

#[cfg(test)]
mod tests {
    use d2json_core::graph::Object;
    use float_cmp::approx_eq;

    use super::*;

    fn object(id: &str) -> Object {
        Object::new(Id::new(id))
    }

    #[test]
    fn test_width_is_clamped() {
        assert_eq!(estimate_size("DB").width(), 120.0);
        assert_eq!(estimate_size(&"x".repeat(25)).width(), 200.0);
        assert_eq!(estimate_size("").width(), 120.0);
    }

    #[test]
    fn test_width_grows_between_bounds() {
        // 12 * 8 + 40
        assert!(approx_eq!(f32, estimate_size("Web Frontend").width(), 136.0));
        assert_eq!(estimate_size("Web Frontend").height(), 50.0);
    }

    #[test]
    fn test_width_uses_byte_length() {
        // 11 characters, 21 bytes
        let label = "ñññññññññ ñ";
        assert_eq!(label.len(), 21);
        assert_eq!(estimate_size(label).width(), 200.0);
    }

    #[test]
    fn test_lane_packing_within_tier() {
        let nodes = [object("db_1"), object("db_2"), object("db_3")];
        let refs: Vec<&Object> = nodes.iter().collect();
        let layout = plan(&refs);

        let xs: Vec<f32> = layout.values().map(NodeLayout::x).collect();
        assert_eq!(xs, [950.0, 1090.0, 1230.0]);
        assert!(layout.values().all(|l| l.y() == 450.0));
    }

    #[test]
    fn test_lanes_are_independent_per_tier() {
        let nodes = [
            object("client_web"),
            object("api"),
            object("client_ios"),
            object("widget"),
            object("edge_cdn"),
        ];
        let refs: Vec<&Object> = nodes.iter().collect();
        let layout = plan(&refs);

        let at = |id: &str| layout[&Id::new(id)].top_left();
        assert_eq!(at("client_web"), Point::new(50.0, 150.0));
        assert_eq!(at("client_ios"), Point::new(200.0, 150.0));
        assert_eq!(at("api"), Point::new(550.0, 350.0));
        // Default shares the application row but keeps its own lane counter.
        assert_eq!(at("widget"), Point::new(550.0, 350.0));
        assert_eq!(at("edge_cdn"), Point::new(300.0, 250.0));
    }

    #[test]
    fn test_width_measures_label_over_identifier() {
        let short = object("a_very_long_identifier_name").with_label("DB");
        let unlabeled = object("a_very_long_identifier_name_2");
        let empty_label = object("x").with_label("");

        let layout = plan(&[&short, &unlabeled, &empty_label]);
        assert_eq!(layout[&Id::new("a_very_long_identifier_name")].width(), 120.0);
        assert_eq!(layout[&Id::new("a_very_long_identifier_name_2")].width(), 200.0);
        assert_eq!(layout[&Id::new("x")].width(), 120.0);
    }

    #[test]
    fn test_lane_counters_reset_between_calls() {
        let node = object("db_main");
        let first = plan(&[&node]);
        let second = plan(&[&node]);
        assert_eq!(first, second);
        assert_eq!(first[&Id::new("db_main")].x(), 950.0);
    }

    #[test]
    fn test_repeated_node_keeps_first_box() {
        let node = object("db_main");
        let layout = plan(&[&node, &node]);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[&Id::new("db_main")].x(), 950.0);
    }
}
