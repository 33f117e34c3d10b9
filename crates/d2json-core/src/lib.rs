//! d2json Core Types
//!
//! Foundational types shared by the d2json crates:
//!
//! - **Identifiers**: interned object keys ([`identifier::Id`])
//! - **Geometry**: points, sizes and bounds ([`geometry`] module)
//! - **Graph**: the ordered object/edge model and the accessor traits the
//!   layout stages are written against ([`graph`] module)

pub mod geometry;
pub mod graph;
pub mod identifier;
