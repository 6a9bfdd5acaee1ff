//! voxel_nav - Incremental 3D occupancy mapping and best-first search
//!
//! This crate keeps a map of space labelled OPEN, BLOCKED or UNKNOWN as a
//! robot or agent observes obstacles, and searches it for paths and for the
//! nearest unexplored frontier.
//!
//! # Features
//!
//! - **Sparse Octree**: Adaptive subdivision down to a minimum node size,
//!   compaction of uniform siblings, re-rooting to cover new space
//! - **Dense Voxel Grid**: Fixed-resolution alternative with the same
//!   mutation contract
//! - **26-Neighbour Resolution**: Table-driven face/edge/corner lookup
//!   across leaves of different sizes
//! - **Search**: A*, Dijkstra and greedy best-first, plus frontier
//!   exploration that ends in a phantom UNKNOWN target
//!
//! # Example
//!
//! ```ignore
//! use glam::DVec3;
//! use voxel_nav::{Aabb, Label, Octree, OctreeConfig, SearchEngine};
//!
//! let mut tree = Octree::new(DVec3::ZERO, 64.0, Label::Unknown, OctreeConfig::default())?;
//! tree.update_unknown(DVec3::ZERO, 10.0);
//! tree.add_obstacle(&Aabb::new(DVec3::new(2.0, -1.0, -1.0), DVec3::new(3.0, 1.0, 1.0)));
//!
//! let start = tree.cell_at(DVec3::ZERO).unwrap();
//! let frontier = SearchEngine::default().explore(&tree, start)?;
//! ```

pub mod bounds;
pub mod constants;
pub mod error;
pub mod map;
pub mod types;

// Re-export commonly used items
pub use bounds::Aabb;
pub use error::NavError;
pub use types::{Label, SearchMode};

// Sparse octree map
pub mod octree;
pub use octree::{CellCoord, NodeId, Octree, OctreeCell, OctreeConfig};

// Dense voxel grid map
pub mod grid;
pub use grid::{GridConfig, GridExtent, VoxelGrid};

// Search over either map
pub mod search;
pub use search::{SearchEngine, SearchGoal, SearchGraph, SearchOutcome, SearchResult, SearchStats};

pub use map::{parse_export_line, write_export, ExportRecord, OccupancyMap};

// Engine-agnostic statistics
pub mod metrics;
pub use metrics::MapMetrics;
