//! VoxelGrid - dense occupancy array with a movable extent.
//!
//! Labels are stored x-major (`z` fastest) over an inclusive [`GridExtent`]
//! of global voxel coordinates. Mutations label every covered voxel
//! directly; there is no subdivision or compaction.

use glam::{DVec3, I64Vec3, IVec3};

use super::GridConfig;
use crate::bounds::Aabb;
use crate::constants::{neighbour_offsets, MAX_GRID_VOXELS};
use crate::error::NavError;
use crate::search::{NeighbourList, SearchGraph};
use crate::types::Label;

/// Largest half-width, in voxels, `initialize_grid` will allocate.
const MAX_HALF_WIDTH: f64 = (1 << 12) as f64;

/// Inclusive range of global voxel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridExtent {
  /// Lowest voxel on every axis.
  pub min: IVec3,
  /// Highest voxel on every axis.
  pub max: IVec3,
}

impl GridExtent {
  /// Create an extent from inclusive corners.
  pub fn new(min: IVec3, max: IVec3) -> Self {
    debug_assert!(min.cmple(max).all(), "extent min must be <= max");
    Self { min, max }
  }

  /// Voxels per axis.
  #[inline]
  pub fn dims(&self) -> IVec3 {
    self.max - self.min + IVec3::ONE
  }

  /// Extent from 64-bit corners; `None` if either falls outside `i32`.
  pub fn from_i64(min: I64Vec3, max: I64Vec3) -> Option<Self> {
    let narrow = |v: I64Vec3| -> Option<IVec3> {
      Some(IVec3::new(
        i32::try_from(v.x).ok()?,
        i32::try_from(v.y).ok()?,
        i32::try_from(v.z).ok()?,
      ))
    };
    Some(Self::new(narrow(min)?, narrow(max)?))
  }

  /// Voxel count without overflow; `None` if it exceeds `usize`.
  pub fn voxel_count(&self) -> Option<usize> {
    let d = self.max.as_i64vec3() - self.min.as_i64vec3() + I64Vec3::ONE;
    let n = d.x.checked_mul(d.y)?.checked_mul(d.z)?;
    usize::try_from(n).ok()
  }

  /// Total voxel count. Only valid for extents that fit in memory; see
  /// [`GridExtent::voxel_count`].
  #[inline]
  pub fn len(&self) -> usize {
    let d = self.dims().as_uvec3();
    d.x as usize * d.y as usize * d.z as usize
  }

  /// Always false: an extent covers at least one voxel.
  #[inline]
  pub fn is_empty(&self) -> bool {
    false
  }

  #[inline]
  pub fn contains(&self, v: IVec3) -> bool {
    v.cmpge(self.min).all() && v.cmple(self.max).all()
  }

  /// Smallest extent covering both.
  #[inline]
  pub fn union(&self, other: &GridExtent) -> GridExtent {
    GridExtent::new(self.min.min(other.min), self.max.max(other.max))
  }

  /// Overlap of both, if any.
  #[inline]
  pub fn intersection(&self, other: &GridExtent) -> Option<GridExtent> {
    let min = self.min.max(other.min);
    let max = self.max.min(other.max);
    min.cmple(max).all().then(|| GridExtent::new(min, max))
  }

  /// Every voxel in x-major order.
  pub fn iter(&self) -> impl Iterator<Item = IVec3> {
    let (min, max) = (self.min, self.max);
    (min.x..=max.x).flat_map(move |x| {
      (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| IVec3::new(x, y, z)))
    })
  }

  #[inline]
  fn index(&self, v: IVec3) -> usize {
    let d = self.dims();
    let r = v - self.min;
    ((r.x as usize * d.y as usize) + r.y as usize) * d.z as usize + r.z as usize
  }
}

/// Dense occupancy grid.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
  labels: Vec<Label>,
  extent: GridExtent,
  config: GridConfig,
}

impl VoxelGrid {
  /// Allocate a grid around `center` and label it with
  /// [`VoxelGrid::initialize_grid`].
  pub fn new(center: DVec3, radius: f64, config: GridConfig) -> Result<Self, NavError> {
    config.validate()?;
    let mut grid = Self {
      labels: vec![Label::Unknown],
      extent: GridExtent::new(IVec3::ZERO, IVec3::ZERO),
      config,
    };
    grid.initialize_grid(center, radius)?;
    Ok(grid)
  }

  /// Reallocate the array to cover `radius` plus the configured margin
  /// around `center`. Voxels whose centers lie within `radius` are OPEN,
  /// the rest UNKNOWN.
  pub fn initialize_grid(&mut self, center: DVec3, radius: f64) -> Result<(), NavError> {
    if !center.is_finite() || !(radius.is_finite() && radius >= 0.0) {
      return Err(NavError::InvalidConfig("grid center and radius must be finite, radius >= 0"));
    }
    let reach = (radius / self.config.voxel_size).ceil();
    if reach > MAX_HALF_WIDTH {
      return Err(NavError::InvalidConfig("grid radius too large for voxel size"));
    }

    let half = I64Vec3::splat(reach as i64 + i64::from(self.config.margin));
    let mid = self.voxel_coord(center).as_i64vec3();
    let extent = GridExtent::from_i64(mid - half, mid + half)
      .filter(|e| e.voxel_count().is_some_and(|n| n <= MAX_GRID_VOXELS))
      .ok_or(NavError::InvalidConfig("grid allocation exceeds the voxel limit"))?;
    self.extent = extent;
    self.labels = self
      .extent
      .iter()
      .map(|v| {
        if self.voxel_center(v).distance_squared(center) <= radius * radius {
          Label::Open
        } else {
          Label::Unknown
        }
      })
      .collect();

    tracing::debug!(?mid, ?half, voxels = self.labels.len(), "voxel grid initialized");
    Ok(())
  }

  #[inline]
  pub fn config(&self) -> &GridConfig {
    &self.config
  }

  /// Allocated voxel range.
  #[inline]
  pub fn extent(&self) -> GridExtent {
    self.extent
  }

  /// Voxels per axis.
  #[inline]
  pub fn dims(&self) -> IVec3 {
    self.extent.dims()
  }

  /// Number of allocated voxels.
  #[inline]
  pub fn len(&self) -> usize {
    self.labels.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  /// Voxel coordinate containing `point`, allocated or not.
  #[inline]
  pub fn voxel_coord(&self, point: DVec3) -> IVec3 {
    ((point - self.config.lattice_origin) / self.config.voxel_size)
      .floor()
      .as_ivec3()
  }

  /// Allocated voxel containing `point`.
  pub fn voxel_at(&self, point: DVec3) -> Option<IVec3> {
    if !point.is_finite() {
      return None;
    }
    let v = self.voxel_coord(point);
    self.extent.contains(v).then_some(v)
  }

  /// True if `v` is allocated.
  #[inline]
  pub fn contains(&self, v: IVec3) -> bool {
    self.extent.contains(v)
  }

  /// Label of `v`; voxels outside the array are UNKNOWN.
  #[inline]
  pub fn label(&self, v: IVec3) -> Label {
    if self.extent.contains(v) {
      self.labels[self.extent.index(v)]
    } else {
      Label::Unknown
    }
  }

  /// Overwrite the label of an allocated voxel. Returns false outside the
  /// array.
  pub fn set_label(&mut self, v: IVec3, label: Label) -> bool {
    debug_assert!(label.is_terminal(), "voxels cannot be MIXED");
    if !self.extent.contains(v) {
      return false;
    }
    let idx = self.extent.index(v);
    self.labels[idx] = label;
    true
  }

  /// World bound of voxel `v`.
  #[inline]
  pub fn voxel_bound(&self, v: IVec3) -> Aabb {
    let s = self.config.voxel_size;
    Aabb::cube(self.config.lattice_origin + v.as_dvec3() * s, s)
  }

  /// World center of voxel `v`.
  #[inline]
  pub fn voxel_center(&self, v: IVec3) -> DVec3 {
    self.config.lattice_origin + (v.as_dvec3() + DVec3::splat(0.5)) * self.config.voxel_size
  }

  /// Voxels covering `region`, allocated or not.
  ///
  /// A box whose upper face lies on a voxel boundary does not reach into the
  /// next voxel; a box thinner than one voxel still covers one.
  pub fn voxel_range(&self, region: &Aabb) -> GridExtent {
    let o = self.config.lattice_origin;
    let s = self.config.voxel_size;
    let min = ((region.min - o) / s).floor().as_ivec3();
    let max = (((region.max - o) / s).ceil() - DVec3::ONE).as_ivec3().max(min);
    GridExtent::new(min, max)
  }

  /// Allocated voxels covering `region`.
  pub fn voxelize(&self, region: &Aabb) -> Option<GridExtent> {
    self.voxel_range(region).intersection(&self.extent)
  }

  /// Voxels carrying `label`.
  pub fn count(&self, label: Label) -> usize {
    self.labels.iter().filter(|&&l| l == label).count()
  }

  /// Every allocated voxel with its label, x-major.
  pub fn iter(&self) -> impl Iterator<Item = (IVec3, Label)> + '_ {
    self.extent.iter().zip(self.labels.iter().copied())
  }

  /// Mark the voxels covered by `obstacle` (inflated by the agent padding)
  /// as BLOCKED.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "grid::add_obstacle"))]
  pub fn add_obstacle(&mut self, obstacle: &Aabb) {
    self.fill(obstacle, Label::Blocked);
  }

  /// Mark the voxels covered by `obstacle` (inflated by the agent padding)
  /// as OPEN.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "grid::remove_obstacle"))]
  pub fn remove_obstacle(&mut self, obstacle: &Aabb) {
    self.fill(obstacle, Label::Open);
  }

  /// Mark the voxels covered by `region` (inflated by the agent padding)
  /// as UNKNOWN.
  pub fn set_unknown(&mut self, region: &Aabb) {
    self.fill(region, Label::Unknown);
  }

  /// Mark the voxels covered by `region` (inflated by the agent padding)
  /// as OPEN.
  pub fn set_open(&mut self, region: &Aabb) {
    self.fill(region, Label::Open);
  }

  /// UNKNOWN voxels whose centers lie within `radius` of `center` become
  /// OPEN.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "grid::update_unknown"))]
  pub fn update_unknown(&mut self, center: DVec3, radius: f64) {
    let sphere = Aabb::from_center_half_extents(center, DVec3::splat(radius));
    let Some(range) = self.voxelize(&sphere) else {
      return;
    };
    let mut revealed = 0usize;
    for v in range.iter() {
      let idx = self.extent.index(v);
      if self.labels[idx] == Label::Unknown
        && self.voxel_center(v).distance_squared(center) <= radius * radius
      {
        self.labels[idx] = Label::Open;
        revealed += 1;
      }
    }
    tracing::trace!(?center, radius, revealed, "grid update_unknown");
  }

  /// Grow the array until it covers `range`. New voxels are UNKNOWN.
  ///
  /// Returns the new extent, or `None` if `range` was already covered or
  /// the grown array would exceed [`MAX_GRID_VOXELS`].
  pub fn check_and_expand(&mut self, range: &Aabb) -> Option<GridExtent> {
    if !range.min.is_finite() || !range.max.is_finite() {
      tracing::warn!(?range, "ignoring non-finite grid expansion range");
      return None;
    }
    let wanted = self.extent.union(&self.voxel_range(range));
    if wanted == self.extent {
      return None;
    }

    let voxels = match wanted.voxel_count() {
      Some(n) if n <= MAX_GRID_VOXELS => n,
      _ => {
        tracing::warn!(
          ?range,
          min = ?wanted.min,
          max = ?wanted.max,
          "voxel grid expansion refused, too large"
        );
        return None;
      }
    };

    let old = self.extent;
    let mut labels = vec![Label::Unknown; voxels];
    let run = old.dims().z as usize;
    for x in old.min.x..=old.max.x {
      for y in old.min.y..=old.max.y {
        let row = IVec3::new(x, y, old.min.z);
        let from = old.index(row);
        let to = wanted.index(row);
        labels[to..to + run].copy_from_slice(&self.labels[from..from + run]);
      }
    }
    self.labels = labels;
    self.extent = wanted;

    tracing::debug!(
      old_min = ?old.min,
      old_max = ?old.max,
      min = ?wanted.min,
      max = ?wanted.max,
      "voxel grid grown"
    );
    Some(wanted)
  }

  fn fill(&mut self, region: &Aabb, label: Label) {
    let region = region.inflate(self.config.agent_padding);
    let Some(range) = self.voxelize(&region) else {
      return;
    };
    for v in range.iter() {
      let idx = self.extent.index(v);
      self.labels[idx] = label;
    }
    tracing::trace!(?region, %label, voxels = range.len(), "grid fill");
  }
}

impl SearchGraph for VoxelGrid {
  type Node = IVec3;

  fn neighbours(&self, node: IVec3) -> Result<NeighbourList<IVec3>, NavError> {
    Ok(
      neighbour_offsets()
        .map(|o| node.saturating_add(o))
        .filter(|&v| v != node && self.extent.contains(v))
        .collect(),
    )
  }

  /// All 26 neighbours; voxels outside the array read as UNKNOWN.
  fn neighbours_explore(&self, node: IVec3) -> Result<NeighbourList<IVec3>, NavError> {
    Ok(
      neighbour_offsets()
        .map(|o| node.saturating_add(o))
        .filter(|&v| v != node)
        .collect(),
    )
  }

  fn heuristic(&self, a: IVec3, b: IVec3) -> f64 {
    a.as_dvec3().distance(b.as_dvec3()) * self.config.voxel_size
  }

  /// Edge, face-diagonal or cube-diagonal length by the number of differing
  /// axes.
  fn distance(&self, a: IVec3, b: IVec3) -> f64 {
    if self.label(a) == Label::Blocked || self.label(b) == Label::Blocked {
      return f64::INFINITY;
    }
    a.as_dvec3().distance(b.as_dvec3()) * self.config.voxel_size
  }

  fn is_unknown(&self, node: IVec3) -> bool {
    self.label(node) == Label::Unknown
  }

  fn phantom_neighbour(&self, unknown: IVec3, _known: IVec3) -> Option<IVec3> {
    Some(unknown)
  }

  fn update_unknown(&mut self, center: DVec3, radius: f64) {
    VoxelGrid::update_unknown(self, center, radius);
  }

  fn center(&self, node: IVec3) -> DVec3 {
    self.voxel_center(node)
  }

  fn heuristic_to_point(&self, node: IVec3, point: DVec3) -> f64 {
    self.voxel_center(node).distance(point)
  }

  fn extent(&self, _node: IVec3) -> f64 {
    self.config.voxel_size
  }
}

#[cfg(test)]
#[path = "voxel_grid_test.rs"]
mod voxel_grid_test;
