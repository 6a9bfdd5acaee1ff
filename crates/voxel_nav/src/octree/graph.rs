//! Octree as a search graph.
//!
//! Costs and estimates both use the Manhattan distance between cell centers.
//! Phantom cells count as UNKNOWN and have no neighbours of their own.

use glam::{DVec3, IVec3};

use super::node::OctreeCell;
use super::Octree;
use crate::bounds::Aabb;
use crate::error::NavError;
use crate::search::{NeighbourList, SearchGraph};
use crate::types::Label;

#[inline]
fn manhattan(a: DVec3, b: DVec3) -> f64 {
  (a - b).abs().element_sum()
}

impl Octree {
  /// World bound of a leaf or phantom cell.
  pub fn cell_bound(&self, cell: OctreeCell) -> Aabb {
    match cell {
      OctreeCell::Leaf(id) => self.n(id).bound,
      OctreeCell::Phantom(coord) => coord.bound(&self.root_bound()),
    }
  }

  /// Label of a leaf; phantoms are UNKNOWN.
  pub fn cell_label(&self, cell: OctreeCell) -> Label {
    match cell {
      OctreeCell::Leaf(id) => self.n(id).label,
      OctreeCell::Phantom(_) => Label::Unknown,
    }
  }

  /// Leaf or phantom containing `point`; `None` only for non-finite points.
  ///
  /// Points outside the root map to a phantom cell the size of the root.
  pub fn cell_at(&self, point: DVec3) -> Option<OctreeCell> {
    if !point.is_finite() {
      return None;
    }
    if let Some(id) = self.locate(point) {
      return Some(OctreeCell::Leaf(id));
    }
    let root = self.root_bound();
    let pos = ((point - root.min) / root.edge()).floor().as_ivec3();
    Some(OctreeCell::Phantom(super::CellCoord::new(pos.x, pos.y, pos.z, 0)))
  }
}

impl SearchGraph for Octree {
  type Node = OctreeCell;

  fn neighbours(&self, node: OctreeCell) -> Result<NeighbourList<OctreeCell>, NavError> {
    match node {
      OctreeCell::Leaf(id) => self.leaf_neighbours(id),
      OctreeCell::Phantom(_) => Ok(NeighbourList::new()),
    }
  }

  fn neighbours_explore(&self, node: OctreeCell) -> Result<NeighbourList<OctreeCell>, NavError> {
    match node {
      OctreeCell::Leaf(id) => self.leaf_neighbours_explore(id),
      OctreeCell::Phantom(_) => Ok(NeighbourList::new()),
    }
  }

  fn heuristic(&self, a: OctreeCell, b: OctreeCell) -> f64 {
    manhattan(self.center(a), self.center(b))
  }

  fn distance(&self, a: OctreeCell, b: OctreeCell) -> f64 {
    if self.cell_label(a) == Label::Blocked || self.cell_label(b) == Label::Blocked {
      return f64::INFINITY;
    }
    manhattan(self.center(a), self.center(b))
  }

  fn is_unknown(&self, node: OctreeCell) -> bool {
    self.cell_label(node) == Label::Unknown
  }

  /// A cell next to `known`, at `known`'s size, inside the UNKNOWN region.
  ///
  /// Small enough UNKNOWN leaves and phantoms are returned as they are.
  fn phantom_neighbour(&self, unknown: OctreeCell, known: OctreeCell) -> Option<OctreeCell> {
    let OctreeCell::Leaf(known_id) = known else {
      return Some(unknown);
    };
    if matches!(unknown, OctreeCell::Phantom(_)) {
      return Some(unknown);
    }

    let target = self.cell_bound(unknown);
    let from = self.cell_bound(known);
    if target.edge() <= from.edge() {
      return Some(unknown);
    }

    let side = |a: usize| -> i32 {
      if target.min[a] >= from.max[a] {
        1
      } else if target.max[a] <= from.min[a] {
        -1
      } else {
        0
      }
    };
    let offset = IVec3::new(side(0), side(1), side(2));
    if offset == IVec3::ZERO {
      return Some(unknown);
    }
    match self.cell_coord(known_id) {
      Ok(coord) => Some(OctreeCell::Phantom(coord.offset(offset))),
      Err(err) => {
        tracing::warn!(%err, "phantom target falls back to the unknown leaf");
        Some(unknown)
      }
    }
  }

  fn update_unknown(&mut self, center: DVec3, radius: f64) {
    Octree::update_unknown(self, center, radius);
  }

  fn center(&self, node: OctreeCell) -> DVec3 {
    self.cell_bound(node).center()
  }

  fn heuristic_to_point(&self, node: OctreeCell, point: DVec3) -> f64 {
    manhattan(self.center(node), point)
  }

  fn extent(&self, node: OctreeCell) -> f64 {
    self.cell_bound(node).edge()
  }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod graph_test;
