//! OctreeConfig - subdivision limits and agent footprint.

use crate::constants::{DEFAULT_AGENT_PADDING, DEFAULT_MIN_NODE_SIZE, MAX_TREE_DEPTH};
use crate::error::NavError;

/// Configuration for octree subdivision.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OctreeConfig {
  /// Smallest edge length a node may be subdivided down to.
  pub min_node_size: f64,

  /// Padding added on every side of obstacle boxes for the agent footprint.
  pub agent_padding: f64,
}

impl OctreeConfig {
  /// Reject non-positive node sizes and negative padding.
  pub fn validate(&self) -> Result<(), NavError> {
    if !(self.min_node_size.is_finite() && self.min_node_size > 0.0) {
      return Err(NavError::InvalidConfig("min_node_size must be positive"));
    }
    if !(self.agent_padding.is_finite() && self.agent_padding >= 0.0) {
      return Err(NavError::InvalidConfig("agent_padding must be >= 0"));
    }
    Ok(())
  }

  /// Largest root edge whose minimum-size leaves stay within
  /// [`MAX_TREE_DEPTH`].
  #[inline]
  pub fn max_root_edge(&self) -> f64 {
    self.min_node_size * (1u64 << MAX_TREE_DEPTH) as f64
  }

  /// True if a node with this edge length may be split into 8 children.
  #[inline]
  pub fn can_subdivide(&self, edge: f64) -> bool {
    edge * 0.5 >= self.min_node_size
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      min_node_size: DEFAULT_MIN_NODE_SIZE,
      agent_padding: DEFAULT_AGENT_PADDING,
    }
  }
}
