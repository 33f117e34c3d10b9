//! Node positioning.
//!
//! Positions come from two places. An optional external engine (see
//! [`EngineBuilder`]) may write geometry into the graph; the deterministic
//! fallback then computes a box for every node, which is used wherever the
//! graph left a field unset.
//!
//! # Pipeline Position
//!
//! ```text
//! Graph
//!     ↓ engines (optional, faults contained)
//! Graph with some geometry
//!     ↓ order
//! node sequence
//!     ↓ tier + fallback
//! NodeLayout per node
//!     ↓ output (merge)
//! OutputDiagram
//! ```
//!
//! # Submodules
//!
//! - [`order`] - Breadth-first topological ordering of nodes
//! - [`tier`] - Classification of nodes into horizontal lanes
//! - [`fallback`] - Box placement within each tier

mod engines;
pub mod fallback;
pub mod order;
pub mod tier;

pub use engines::{EngineBuilder, ExternalEngine, apply_external_layout};
pub use fallback::{NodeLayout, plan};
pub use order::order;
pub use tier::Tier;
