//! Error types for map construction and neighbour resolution.
//!
//! "No path" and "nothing left to explore" are not errors; searches report
//! them as `Ok(None)`.

use crate::octree::NodeId;

/// Errors raised by the occupancy maps and the search engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum NavError {
  /// A configuration value is out of range.
  #[error("invalid configuration: {0}")]
  InvalidConfig(&'static str),

  /// A bound has zero, negative or non-finite extent.
  #[error("degenerate bounds: min {min:?}, max {max:?}")]
  DegenerateBounds {
    /// Minimum corner as supplied.
    min: [f64; 3],
    /// Maximum corner as supplied.
    max: [f64; 3],
  },

  /// The octree parent/child links disagree with a node's octant code.
  ///
  /// Only reachable through a bug in the tree mutation code.
  #[error("corrupt octree at node {node:?}: {reason}")]
  CorruptTree {
    /// Node at which the inconsistency was detected.
    node: NodeId,
    /// What was inconsistent.
    reason: &'static str,
  },

  /// A debug export line could not be parsed.
  #[error("malformed export line {line:?}: {reason}")]
  MalformedExport {
    /// Offending line.
    line: String,
    /// What was wrong with it.
    reason: &'static str,
  },

  /// A node handle does not refer to a live node.
  #[error("stale node handle {0:?}")]
  StaleNode(NodeId),
}
