//! GridConfig - voxel size, lattice origin and allocation margin.

use glam::DVec3;

use crate::constants::{DEFAULT_AGENT_PADDING, DEFAULT_GRID_MARGIN, DEFAULT_VOXEL_SIZE};
use crate::error::NavError;

/// Configuration for the dense voxel grid.
///
/// Voxel `(x, y, z)` spans `lattice_origin + [x, x+1) * voxel_size` on each
/// axis. Coordinates are global: growing the array never renumbers voxels.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
  /// Edge length of one voxel.
  pub voxel_size: f64,

  /// Padding added on every side of boxes before voxelizing them.
  pub agent_padding: f64,

  /// Extra voxels allocated beyond the initial radius on every side.
  pub margin: i32,

  /// World position of the lower corner of voxel (0, 0, 0).
  pub lattice_origin: DVec3,
}

impl GridConfig {
  /// Reject non-positive voxel sizes, negative padding and negative margins.
  pub fn validate(&self) -> Result<(), NavError> {
    if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
      return Err(NavError::InvalidConfig("voxel_size must be positive"));
    }
    if !(self.agent_padding.is_finite() && self.agent_padding >= 0.0) {
      return Err(NavError::InvalidConfig("agent_padding must be >= 0"));
    }
    if self.margin < 0 {
      return Err(NavError::InvalidConfig("margin must be >= 0"));
    }
    if !self.lattice_origin.is_finite() {
      return Err(NavError::InvalidConfig("lattice_origin must be finite"));
    }
    Ok(())
  }
}

impl Default for GridConfig {
  fn default() -> Self {
    Self {
      voxel_size: DEFAULT_VOXEL_SIZE,
      agent_padding: DEFAULT_AGENT_PADDING,
      margin: DEFAULT_GRID_MARGIN,
      lattice_origin: DVec3::ZERO,
    }
  }
}
