//! 26-direction neighbour resolution across arbitrary depths.
//!
//! # Algorithm
//!
//! A direction is a signed offset `d` in the direction lattice (see
//! [`crate::constants`]). For a node with octant code `o`, the same-size
//! cell in direction `d` is a child of either the same parent or one of the
//! parent's neighbours. Per axis with `d_a != 0` the child bit flips; the
//! parent has to be left along that axis when the step crosses the parent's
//! boundary:
//!
//! ```text
//! d_a = +1, bit 1  -> crosses, carry +1
//! d_a = -1, bit 0  -> crosses, carry -1
//! otherwise        -> stays inside the parent
//! ```
//!
//! [`STEPS`] tabulates `(mirrored octant, carried direction)` for all
//! 8 x 27 cases. Resolution ascends while a carry remains, recording the
//! mirrored octants, then descends the recorded path from the common
//! ancestor until it reaches a leaf (a larger or equal neighbour) or the
//! same-depth node. A same-depth node with children contributes every leaf
//! of its subtree touching the query cell's side.
//!
//! Ascending out of the root means the neighbour lies outside the tree. In
//! exploration mode that neighbour is reported as an
//! [`OctreeCell::Phantom`] at the query node's depth.

use glam::IVec3;
use smallvec::SmallVec;

use super::node::{octant_offset, CellCoord, NodeId, OctreeCell};
use super::Octree;
use crate::constants::{
  direction_slot, offset_slot, slot_offset, CENTER_SLOT, CORNER_OFFSETS, DIRECTION_SLOTS,
  EDGE_OFFSETS, FACE_OFFSETS,
};
use crate::error::NavError;
use crate::search::NeighbourList;

/// One ascent step for a (child octant, direction) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Step {
  /// Octant of the neighbouring cell within its own parent.
  pub octant: u8,
  /// Direction slot the parent still has to move in; `CENTER_SLOT` if the
  /// neighbour is a sibling.
  pub carry: u8,
}

/// Ascent table indexed by `[octant][direction slot]`.
pub(crate) const STEPS: [[Step; DIRECTION_SLOTS]; 8] = build_steps();

const fn build_steps() -> [[Step; DIRECTION_SLOTS]; 8] {
  let mut table = [[Step {
    octant: 0,
    carry: CENTER_SLOT as u8,
  }; DIRECTION_SLOTS]; 8];

  let mut octant = 0;
  while octant < 8 {
    let mut slot = 0;
    while slot < DIRECTION_SLOTS {
      let d = slot_offset(slot);
      let dirs = [d.x, d.y, d.z];
      let mut mirrored = octant;
      let mut carry = [0i32; 3];

      let mut axis = 0;
      while axis < 3 {
        let bit = (octant >> axis) & 1;
        let da = dirs[axis];
        if da != 0 {
          mirrored ^= 1 << axis;
          if (da > 0 && bit == 1) || (da < 0 && bit == 0) {
            carry[axis] = da;
          }
        }
        axis += 1;
      }

      table[octant][slot] = Step {
        octant: mirrored as u8,
        carry: direction_slot(carry[0], carry[1], carry[2]) as u8,
      };
      slot += 1;
    }
    octant += 1;
  }
  table
}

/// True if the child at `octant` touches the side of its parent facing
/// back along `d` (towards a query cell at `-d`).
#[inline]
fn faces_back(octant: u8, d: IVec3) -> bool {
  let bits = octant_offset(octant);
  (0..3).all(|a| d[a] == 0 || (bits[a] == 0) == (d[a] > 0))
}

/// Per-call state of one neighbour query.
struct NeighbourQuery<'a> {
  tree: &'a Octree,
  origin: NodeId,
  explore: bool,
  /// Lattice coordinate of `origin`, computed on the first phantom.
  coord: Option<CellCoord>,
  /// Bit per direction slot that resolved to at least one cell.
  found: u32,
  out: NeighbourList<OctreeCell>,
}

impl<'a> NeighbourQuery<'a> {
  fn new(tree: &'a Octree, origin: NodeId, explore: bool) -> Result<Self, NavError> {
    tree.live(origin)?;
    Ok(Self {
      tree,
      origin,
      explore,
      coord: None,
      found: 0,
      out: NeighbourList::new(),
    })
  }

  fn run(mut self) -> Result<NeighbourList<OctreeCell>, NavError> {
    for d in FACE_OFFSETS {
      self.resolve(d)?;
    }
    for d in EDGE_OFFSETS.into_iter().chain(CORNER_OFFSETS) {
      if self.components_found(d) {
        self.resolve(d)?;
      }
    }
    Ok(self.out)
  }

  /// Every lower-order direction making up `d` already resolved.
  fn components_found(&self, d: IVec3) -> bool {
    let axes = (d.x != 0) as u8 | (((d.y != 0) as u8) << 1) | (((d.z != 0) as u8) << 2);
    (1u8..7)
      .filter(|&mask| mask & axes == mask && mask != axes)
      .all(|mask| {
        let component = d * octant_offset(mask);
        self.found & (1 << offset_slot(component)) != 0
      })
  }

  fn resolve(&mut self, d: IVec3) -> Result<(), NavError> {
    let resolved = match self.same_or_larger(d)? {
      Some(node) => {
        self.push_facing(node, d);
        true
      }
      None if self.explore => {
        let coord = match self.coord {
          Some(coord) => coord,
          None => {
            let coord = self.tree.cell_coord(self.origin)?;
            self.coord = Some(coord);
            coord
          }
        };
        self.push(OctreeCell::Phantom(coord.offset(d)));
        true
      }
      None => false,
    };
    if resolved {
      self.found |= 1 << offset_slot(d);
    }
    Ok(())
  }

  /// Node in direction `d` at the origin's depth, or the larger leaf
  /// covering that cell. `None` outside the root.
  fn same_or_larger(&self, d: IVec3) -> Result<Option<NodeId>, NavError> {
    let tree = self.tree;
    let mut path: SmallVec<[u8; 32]> = SmallVec::new();
    let mut cur = self.origin;
    let mut slot = offset_slot(d);

    loop {
      let Some(parent) = tree.n(cur).parent else {
        return Ok(None);
      };
      let octant = tree.checked_octant(cur, parent)?;
      let step = STEPS[octant as usize][slot];
      path.push(step.octant);
      cur = parent;
      if step.carry as usize == CENTER_SLOT {
        break;
      }
      slot = step.carry as usize;
    }

    for &octant in path.iter().rev() {
      match tree.n(cur).children {
        Some(children) => cur = children[octant as usize],
        None => break,
      }
    }
    Ok(Some(cur))
  }

  /// Push `node` if it is a leaf, otherwise its leaves facing the origin.
  fn push_facing(&mut self, node: NodeId, d: IVec3) {
    let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
    stack.push(node);
    while let Some(id) = stack.pop() {
      match self.tree.n(id).children {
        None => self.push(OctreeCell::Leaf(id)),
        Some(children) => {
          for (octant, &child) in children.iter().enumerate() {
            if faces_back(octant as u8, d) {
              stack.push(child);
            }
          }
        }
      }
    }
  }

  fn push(&mut self, cell: OctreeCell) {
    if !self.out.contains(&cell) {
      self.out.push(cell);
    }
  }
}

impl Octree {
  /// Leaves adjacent to `id` along all 26 directions, at any depth.
  ///
  /// Faces come first, then edges, then corners; each leaf appears once.
  pub fn leaf_neighbours(&self, id: NodeId) -> Result<NeighbourList<OctreeCell>, NavError> {
    NeighbourQuery::new(self, id, false)?.run()
  }

  /// Like [`Octree::leaf_neighbours`], with [`OctreeCell::Phantom`] cells
  /// standing in for neighbours outside the root.
  pub fn leaf_neighbours_explore(&self, id: NodeId) -> Result<NeighbourList<OctreeCell>, NavError> {
    NeighbourQuery::new(self, id, true)?.run()
  }

  /// Leaves adjacent to `id` in the single direction `direction`
  /// (components in `-1..=1`, not all zero). Empty outside the root.
  pub fn leaf_neighbours_toward(
    &self,
    id: NodeId,
    direction: IVec3,
  ) -> Result<NeighbourList<OctreeCell>, NavError> {
    if direction == IVec3::ZERO || direction.abs().max_element() > 1 {
      return Err(NavError::InvalidConfig("neighbour direction must be a unit lattice offset"));
    }
    let mut query = NeighbourQuery::new(self, id, false)?;
    query.resolve(direction)?;
    Ok(query.out)
  }
}

#[cfg(test)]
#[path = "neighbours_test.rs"]
mod neighbours_test;
