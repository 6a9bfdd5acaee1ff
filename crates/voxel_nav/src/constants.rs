//! Direction lattice and default tuning constants.
//!
//! # Direction Lattice
//!
//! Every neighbour direction is a signed offset `(dx, dy, dz)` with each
//! component in `-1..=1`. The 27 offsets (including the zero offset) are
//! packed into a slot index:
//!
//! ```text
//! slot = (dx + 1) + 3 * (dy + 1) + 9 * (dz + 1)
//!
//!   dz = -1            dz = 0             dz = +1
//!   6  7  8            15 16 17           24 25 26     +Y
//!   3  4  5            12 [13] 14         21 22 23      │
//!   0  1  2            9  10 11           18 19 20      └── +X
//! ```
//!
//! Slot 13 is the zero offset and doubles as "nothing left to resolve"
//! in the octree neighbour tables.
//!
//! Directions are grouped by how many axes they move along:
//! - 6 faces (one axis)
//! - 12 edges (two axes)
//! - 8 corners (three axes)

use glam::IVec3;

/// Number of neighbour directions around a cell.
pub const DIRECTION_COUNT: usize = 26;

/// Number of slots in the direction lattice, zero offset included.
pub const DIRECTION_SLOTS: usize = 27;

/// Slot of the zero offset.
pub const CENTER_SLOT: usize = 13;

/// Face directions (one axis).
pub const FACE_OFFSETS: [IVec3; 6] = [
  IVec3::new(-1, 0, 0),
  IVec3::new(1, 0, 0),
  IVec3::new(0, -1, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(0, 0, -1),
  IVec3::new(0, 0, 1),
];

/// Edge directions (two axes).
pub const EDGE_OFFSETS: [IVec3; 12] = [
  IVec3::new(-1, -1, 0),
  IVec3::new(1, -1, 0),
  IVec3::new(-1, 1, 0),
  IVec3::new(1, 1, 0),
  IVec3::new(-1, 0, -1),
  IVec3::new(1, 0, -1),
  IVec3::new(-1, 0, 1),
  IVec3::new(1, 0, 1),
  IVec3::new(0, -1, -1),
  IVec3::new(0, 1, -1),
  IVec3::new(0, -1, 1),
  IVec3::new(0, 1, 1),
];

/// Corner directions (three axes).
pub const CORNER_OFFSETS: [IVec3; 8] = [
  IVec3::new(-1, -1, -1),
  IVec3::new(1, -1, -1),
  IVec3::new(-1, 1, -1),
  IVec3::new(1, 1, -1),
  IVec3::new(-1, -1, 1),
  IVec3::new(1, -1, 1),
  IVec3::new(-1, 1, 1),
  IVec3::new(1, 1, 1),
];

/// Default smallest octree node edge length, in world units.
pub const DEFAULT_MIN_NODE_SIZE: f64 = 1.0;

/// Default padding added around obstacles for the agent footprint.
pub const DEFAULT_AGENT_PADDING: f64 = 0.5;

/// Default dense grid voxel edge length, in world units.
pub const DEFAULT_VOXEL_SIZE: f64 = 1.0;

/// Default number of extra voxels allocated beyond the sensor radius.
pub const DEFAULT_GRID_MARGIN: i32 = 2;

/// Deepest octree level. Lattice coordinates at this depth still fit in
/// `i32` with room for a one-cell step outside the root.
pub const MAX_TREE_DEPTH: u32 = 30;

/// Largest voxel count a grid may allocate.
pub const MAX_GRID_VOXELS: usize = 1 << 28;

/// Slot of a direction offset. Components must be in `-1..=1`.
#[inline]
pub const fn direction_slot(dx: i32, dy: i32, dz: i32) -> usize {
  ((dx + 1) + 3 * (dy + 1) + 9 * (dz + 1)) as usize
}

/// Slot of a direction offset given as a vector.
#[inline]
pub fn offset_slot(offset: IVec3) -> usize {
  debug_assert!(
    offset.abs().max_element() <= 1,
    "direction components must be -1, 0 or 1, got {offset}"
  );
  direction_slot(offset.x, offset.y, offset.z)
}

/// Offset stored in a direction slot.
#[inline]
pub const fn slot_offset(slot: usize) -> IVec3 {
  IVec3::new(
    (slot % 3) as i32 - 1,
    ((slot / 3) % 3) as i32 - 1,
    (slot / 9) as i32 - 1,
  )
}

/// All 26 neighbour offsets, faces first, then edges, then corners.
pub fn neighbour_offsets() -> impl Iterator<Item = IVec3> {
  FACE_OFFSETS
    .iter()
    .chain(EDGE_OFFSETS.iter())
    .chain(CORNER_OFFSETS.iter())
    .copied()
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
