//! Sparse occupancy octree.
//!
//! Nodes live in an arena inside [`Octree`]; callers hold [`NodeId`]
//! handles. Leaves carry OPEN, BLOCKED or UNKNOWN; a node is MIXED exactly
//! when it has 8 children.
//!
//! # Octant Layout
//!
//! ```text
//! octant = x | (y << 1) | (z << 2)     x, y, z in {0, 1}, 1 = upper half
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: `NodeId`, `CellCoord`, `OctreeCell` and the arena slot
//! - [`config`]: `OctreeConfig` - minimum node size and agent padding
//! - [`tree`]: `Octree` - painting, sensor reveal, re-rooting, inspection
//! - [`neighbours`]: table-driven 26-direction neighbour resolution
//! - [`graph`]: `SearchGraph` implementation

pub mod config;
pub mod graph;
pub mod neighbours;
pub mod node;
pub mod tree;

// Re-exports
pub use config::OctreeConfig;
pub use node::{octant_offset, offset_octant, CellCoord, NodeId, OctreeCell};
pub use tree::{Leaves, Octree};
