//! Best-first search over explorable occupancy graphs.
//!
//! The engine only sees the [`SearchGraph`] contract; both the sparse
//! [`Octree`](crate::octree::Octree) and the dense
//! [`VoxelGrid`](crate::grid::VoxelGrid) implement it.
//!
//! # Queries
//!
//! - `find_path`: goal-directed, ordered by the configured [`SearchMode`]
//! - `explore`: Dijkstra-ordered frontier search that stops next to the
//!   first UNKNOWN cell
//! - `explore_to`: frontier search that also stops once within one cell of
//!   a target point
//!
//! "No path" is `Ok(None)`. Errors only come from a corrupt graph.
//!
//! [`SearchMode`]: crate::types::SearchMode

use std::fmt::Debug;
use std::hash::Hash;

use glam::DVec3;
use smallvec::SmallVec;

use crate::error::NavError;

pub mod engine;
pub mod queue;

pub use engine::{SearchEngine, SearchGoal, SearchOutcome, SearchResult, SearchStats};

/// Neighbour list returned by graph queries. Inline for the 26 neighbours of
/// a uniform cell.
pub type NeighbourList<N> = SmallVec<[N; 26]>;

/// Graph contract consumed by [`SearchEngine`].
pub trait SearchGraph {
  /// Opaque node handle.
  type Node: Copy + Eq + Hash + Debug;

  /// Known neighbours of `node`.
  fn neighbours(&self, node: Self::Node) -> Result<NeighbourList<Self::Node>, NavError>;

  /// Neighbours of `node` including synthetic cells for space the map does
  /// not cover yet.
  fn neighbours_explore(&self, node: Self::Node) -> Result<NeighbourList<Self::Node>, NavError>;

  /// Estimated cost between two nodes.
  fn heuristic(&self, a: Self::Node, b: Self::Node) -> f64;

  /// Edge cost between adjacent nodes; `f64::INFINITY` if not traversable.
  fn distance(&self, a: Self::Node, b: Self::Node) -> f64;

  /// True if the node is unobserved space.
  fn is_unknown(&self, node: Self::Node) -> bool;

  /// Exploration target for an UNKNOWN `unknown` reached from `known`.
  fn phantom_neighbour(&self, unknown: Self::Node, known: Self::Node) -> Option<Self::Node>;

  /// Reclassify UNKNOWN space within `radius` of `center` as OPEN.
  fn update_unknown(&mut self, center: DVec3, radius: f64);

  /// World-space center of a node.
  fn center(&self, node: Self::Node) -> DVec3;

  /// Estimated cost from a node to an arbitrary point.
  fn heuristic_to_point(&self, node: Self::Node, point: DVec3) -> f64;

  /// Edge length of a node, the "one cell" distance used by `explore_to`.
  fn extent(&self, node: Self::Node) -> f64;
}
