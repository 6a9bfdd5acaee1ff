//! Octree node storage and value-type handles.
//!
//! Nodes live in an arena owned by [`Octree`](super::Octree). A node owns its
//! 8 children by index; the parent link is a plain index back up the tree and
//! never owns anything.

use glam::IVec3;

use crate::bounds::Aabb;
use crate::types::Label;

/// Handle to a node in an [`Octree`](super::Octree) arena.
///
/// Handles are only meaningful for the tree that produced them and become
/// stale when a mutation frees the node (compaction, subtree discard).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
  /// Raw arena slot.
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Convert octant code (0-7) to its 0/1 offset along each axis.
///
/// Octant bits represent +X, +Y, +Z halves:
/// - bit 0: X offset (0 or 1)
/// - bit 1: Y offset (0 or 1)
/// - bit 2: Z offset (0 or 1)
#[inline]
pub fn octant_offset(octant: u8) -> IVec3 {
  debug_assert!(octant < 8, "Octant code must be 0-7");
  IVec3::new(
    (octant & 1) as i32,
    ((octant >> 1) & 1) as i32,
    ((octant >> 2) & 1) as i32,
  )
}

/// Convert 0/1 offsets back to an octant code.
#[inline]
pub fn offset_octant(offset: IVec3) -> u8 {
  debug_assert!(
    offset.cmpge(IVec3::ZERO).all() && offset.cmple(IVec3::ONE).all(),
    "octant offsets must be 0 or 1, got {offset}"
  );
  (offset.x as u8) | ((offset.y as u8) << 1) | ((offset.z as u8) << 2)
}

/// Lattice position of a cell relative to the current root.
///
/// At depth `d` the root is split into `2^d` cells per axis; coordinates
/// outside `0..2^d` describe space beyond the root.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellCoord {
  /// Lattice X at this depth.
  pub x: i32,
  /// Lattice Y at this depth.
  pub y: i32,
  /// Lattice Z at this depth.
  pub z: i32,
  /// Depth below the root (root = 0).
  pub depth: u32,
}

impl CellCoord {
  /// Create a new cell coordinate.
  pub fn new(x: i32, y: i32, z: i32, depth: u32) -> Self {
    Self { x, y, z, depth }
  }

  /// Coordinates as a vector.
  #[inline]
  pub fn pos(&self) -> IVec3 {
    IVec3::new(self.x, self.y, self.z)
  }

  /// Child cell one level deeper.
  #[inline]
  pub fn child(&self, octant: u8) -> Self {
    let p = self.pos() * 2 + octant_offset(octant);
    Self::new(p.x, p.y, p.z, self.depth + 1)
  }

  /// Neighbouring cell at the same depth.
  #[inline]
  pub fn offset(&self, delta: IVec3) -> Self {
    let p = self.pos() + delta;
    Self::new(p.x, p.y, p.z, self.depth)
  }

  /// True if the cell lies inside the root.
  #[inline]
  pub fn inside_root(&self) -> bool {
    let cells = 1i64 << self.depth;
    [self.x, self.y, self.z]
      .iter()
      .all(|&c| (0..cells).contains(&(c as i64)))
  }

  /// World-space bound of this cell given the root bound.
  pub fn bound(&self, root: &Aabb) -> Aabb {
    let edge = root.edge() / (1u64 << self.depth) as f64;
    Aabb::cube(root.min + self.pos().as_dvec3() * edge, edge)
  }
}

/// Search node of the octree graph.
///
/// `Phantom` cells stand for same-depth space beyond the current root (or
/// inside a larger UNKNOWN leaf) that has no node of its own. They are only
/// produced by exploration queries and are meaningful until the root changes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum OctreeCell {
  /// An existing leaf.
  Leaf(NodeId),
  /// Synthetic UNKNOWN cell at a lattice coordinate relative to the root.
  Phantom(CellCoord),
}

impl From<NodeId> for OctreeCell {
  fn from(id: NodeId) -> Self {
    OctreeCell::Leaf(id)
  }
}

/// Arena slot for one octree node.
#[derive(Clone, Debug)]
pub(crate) struct Node {
  /// OPEN/BLOCKED/UNKNOWN for leaves, MIXED iff `children` is set.
  pub label: Label,
  /// Non-owning link to the parent; `None` only at the root.
  pub parent: Option<NodeId>,
  /// Position among the parent's children; `None` only at the root.
  pub octant: Option<u8>,
  /// Exactly 8 children or none.
  pub children: Option<[NodeId; 8]>,
  /// Cached bound, derivable from parent bound + octant.
  pub bound: Aabb,
  /// Cleared when the slot is on the free list.
  pub live: bool,
}

impl Node {
  pub fn leaf(label: Label, bound: Aabb, parent: Option<NodeId>, octant: Option<u8>) -> Self {
    Self {
      label,
      parent,
      octant,
      children: None,
      bound,
      live: true,
    }
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
