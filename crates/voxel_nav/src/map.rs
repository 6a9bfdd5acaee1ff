//! Occupancy contract shared by both map representations, plus the debug
//! export.
//!
//! # Export Format
//!
//! One line per leaf (octree) or voxel (grid):
//!
//! ```text
//! x y z size label
//! ```
//!
//! `x y z` is the lower corner, `size` the edge length and `label` the
//! integer code (0 = OPEN, 1 = BLOCKED, 2 = UNKNOWN). For offline
//! visualization only.

use std::io::{self, Write};

use glam::{DVec3, IVec3};

use crate::bounds::Aabb;
use crate::error::NavError;
use crate::grid::{GridExtent, VoxelGrid};
use crate::octree::{NodeId, Octree};
use crate::types::Label;

/// One exported leaf or voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportRecord {
  /// Lower corner.
  pub position: DVec3,
  /// Edge length.
  pub size: f64,
  /// Occupancy label.
  pub label: Label,
}

/// Map mutations driven by obstacle events, common to both representations.
pub trait OccupancyMap {
  /// What `check_and_expand` reports when the map grows.
  type Expansion;

  /// Mark a padded box as BLOCKED.
  fn add_obstacle(&mut self, obstacle: &Aabb);

  /// Mark a padded box as OPEN.
  fn remove_obstacle(&mut self, obstacle: &Aabb);

  /// Mark a padded box as UNKNOWN.
  fn set_unknown(&mut self, region: &Aabb);

  /// Grow the map to cover `range`; `None` if it already does.
  fn check_and_expand(&mut self, range: &Aabb) -> Option<Self::Expansion>;

  /// Label of the space containing `point`.
  fn label_at(&self, point: DVec3) -> Label;

  /// Every leaf or voxel with its label.
  fn export_records(&self) -> Vec<ExportRecord>;
}

impl OccupancyMap for Octree {
  type Expansion = NodeId;

  fn add_obstacle(&mut self, obstacle: &Aabb) {
    Octree::add_obstacle(self, obstacle);
  }

  fn remove_obstacle(&mut self, obstacle: &Aabb) {
    Octree::remove_obstacle(self, obstacle);
  }

  fn set_unknown(&mut self, region: &Aabb) {
    Octree::set_unknown(self, region);
  }

  fn check_and_expand(&mut self, range: &Aabb) -> Option<NodeId> {
    Octree::check_and_expand(self, range)
  }

  fn label_at(&self, point: DVec3) -> Label {
    Octree::label_at(self, point)
  }

  fn export_records(&self) -> Vec<ExportRecord> {
    self
      .leaves()
      .map(|id| {
        let node = self.n(id);
        ExportRecord {
          position: node.bound.min,
          size: node.bound.edge(),
          label: node.label,
        }
      })
      .collect()
  }
}

impl OccupancyMap for VoxelGrid {
  type Expansion = GridExtent;

  fn add_obstacle(&mut self, obstacle: &Aabb) {
    VoxelGrid::add_obstacle(self, obstacle);
  }

  fn remove_obstacle(&mut self, obstacle: &Aabb) {
    VoxelGrid::remove_obstacle(self, obstacle);
  }

  fn set_unknown(&mut self, region: &Aabb) {
    VoxelGrid::set_unknown(self, region);
  }

  fn check_and_expand(&mut self, range: &Aabb) -> Option<GridExtent> {
    VoxelGrid::check_and_expand(self, range)
  }

  fn label_at(&self, point: DVec3) -> Label {
    self.label(self.voxel_coord(point))
  }

  fn export_records(&self) -> Vec<ExportRecord> {
    let size = self.config().voxel_size;
    self
      .iter()
      .map(|(v, label): (IVec3, Label)| ExportRecord {
        position: self.voxel_bound(v).min,
        size,
        label,
      })
      .collect()
  }
}

/// Write every record of `map` as one `x y z size label` line.
pub fn write_export<M, W>(map: &M, mut out: W) -> io::Result<usize>
where
  M: OccupancyMap + ?Sized,
  W: Write,
{
  let records = map.export_records();
  for r in &records {
    writeln!(
      out,
      "{} {} {} {} {}",
      r.position.x,
      r.position.y,
      r.position.z,
      r.size,
      r.label.code()
    )?;
  }
  out.flush()?;
  tracing::debug!(lines = records.len(), "export written");
  Ok(records.len())
}

/// Parse one export line.
pub fn parse_export_line(line: &str) -> Result<ExportRecord, NavError> {
  let malformed = |reason: &'static str| NavError::MalformedExport {
    line: line.to_owned(),
    reason,
  };

  let mut tokens = line.split_whitespace();
  let mut number = || -> Result<f64, NavError> {
    tokens
      .next()
      .ok_or_else(|| malformed("expected 5 fields"))?
      .parse::<f64>()
      .map_err(|_| malformed("field is not a number"))
  };
  let position = DVec3::new(number()?, number()?, number()?);
  let size = number()?;
  let code = number()?;
  if tokens.next().is_some() {
    return Err(malformed("expected 5 fields"));
  }

  let label = Some(code)
    .filter(|c| c.fract() == 0.0 && (0.0..=255.0).contains(c))
    .and_then(|c| Label::from_code(c as u8))
    .filter(|l| l.is_terminal())
    .ok_or_else(|| malformed("unknown label code"))?;

  Ok(ExportRecord {
    position,
    size,
    label,
  })
}

#[cfg(test)]
#[path = "map_test.rs"]
mod map_test;
