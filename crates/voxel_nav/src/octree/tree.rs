//! Octree - sparse occupancy tree over an arena of nodes.
//!
//! # Mutation Shape
//!
//! `add_obstacle`, `remove_obstacle` and `set_unknown` share one recursive
//! paint pass:
//!
//! ```text
//! node outside region         -> untouched
//! leaf skipped by the pass    -> untouched
//! leaf inside region          -> target label
//! leaf partially in region    -> subdivide (children inherit the label)
//! ...at minimum node size     -> forced to the target label
//! subdivided node             -> recurse, then compact
//! ```
//!
//! Compaction collapses 8 leaf children sharing a label back into their
//! parent, so a MIXED node always has children that disagree.

use glam::{DVec3, IVec3};
use smallvec::SmallVec;

use super::node::{offset_octant, CellCoord, Node, NodeId};
use super::OctreeConfig;
use crate::bounds::Aabb;
use crate::constants::MAX_TREE_DEPTH;
use crate::error::NavError;
use crate::types::Label;

/// One painting pass over the tree.
#[derive(Clone, Copy)]
struct Paint {
  /// Label written into covered space.
  target: Label,
  /// Leaves carrying a label for which this returns true are left alone.
  skip: fn(Label) -> bool,
}

impl Paint {
  const BLOCK: Self = Self {
    target: Label::Blocked,
    skip: is_blocked,
  };

  const CLEAR: Self = Self {
    target: Label::Open,
    skip: is_open_or_unknown,
  };

  const FORGET: Self = Self {
    target: Label::Unknown,
    skip: is_unknown,
  };
}

fn is_blocked(label: Label) -> bool {
  label == Label::Blocked
}

fn is_open_or_unknown(label: Label) -> bool {
  matches!(label, Label::Open | Label::Unknown)
}

fn is_unknown(label: Label) -> bool {
  label == Label::Unknown
}

/// Sparse occupancy octree with a replaceable root.
///
/// Node bounds are cubic and halve exactly on subdivision. Node handles stay
/// valid until a mutation frees them; searches borrow the tree immutably so
/// handles are stable for the duration of a query.
#[derive(Clone, Debug)]
pub struct Octree {
  nodes: Vec<Node>,
  free: Vec<NodeId>,
  root: NodeId,
  config: OctreeConfig,
}

impl Octree {
  /// Create a tree with a single leaf root of edge `size` centered at `center`.
  ///
  /// `size` may be at most `2^MAX_TREE_DEPTH` times the minimum node size.
  pub fn new(center: DVec3, size: f64, label: Label, config: OctreeConfig) -> Result<Self, NavError> {
    config.validate()?;
    if !(size.is_finite() && size > 0.0) || !center.is_finite() {
      return Err(NavError::InvalidConfig("root size must be positive and finite"));
    }
    if size > config.max_root_edge() {
      return Err(NavError::InvalidConfig("root size exceeds the depth limit for min_node_size"));
    }
    if !label.is_terminal() {
      return Err(NavError::InvalidConfig("root label must be OPEN, BLOCKED or UNKNOWN"));
    }

    let bound = Aabb::from_center_half_extents(center, DVec3::splat(size * 0.5));
    Ok(Self {
      nodes: vec![Node::leaf(label, bound, None, None)],
      free: Vec::new(),
      root: NodeId(0),
      config,
    })
  }

  /// Current root handle. Changes after `check_and_expand` grows the tree.
  #[inline]
  pub fn root(&self) -> NodeId {
    self.root
  }

  /// Bound of the current root.
  #[inline]
  pub fn root_bound(&self) -> Aabb {
    self.n(self.root).bound
  }

  /// Subdivision configuration.
  #[inline]
  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// Label of a live node.
  pub fn label(&self, id: NodeId) -> Option<Label> {
    self.get(id).map(|n| n.label)
  }

  /// Bound of a live node.
  pub fn bound(&self, id: NodeId) -> Option<Aabb> {
    self.get(id).map(|n| n.bound)
  }

  /// Parent of a live node (`None` at the root).
  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.get(id).and_then(|n| n.parent)
  }

  /// Octant code of a live node among its siblings (`None` at the root).
  pub fn octant(&self, id: NodeId) -> Option<u8> {
    self.get(id).and_then(|n| n.octant)
  }

  /// Children of a live node, if it is subdivided.
  pub fn children(&self, id: NodeId) -> Option<[NodeId; 8]> {
    self.get(id).and_then(|n| n.children)
  }

  /// True if the node is live and has no children.
  pub fn is_leaf(&self, id: NodeId) -> bool {
    self.get(id).is_some_and(Node::is_leaf)
  }

  /// Number of edges between the node and the root.
  pub fn depth(&self, id: NodeId) -> Option<u32> {
    let mut node = self.get(id)?;
    let mut depth = 0;
    while let Some(parent) = node.parent {
      node = self.n(parent);
      depth += 1;
    }
    Some(depth)
  }

  /// Leaf containing `point`, or `None` outside the root.
  ///
  /// Points on a shared face resolve to the child on the positive side.
  pub fn locate(&self, point: DVec3) -> Option<NodeId> {
    if !self.root_bound().contains_point(point) {
      return None;
    }
    let mut cur = self.root;
    while let Some(children) = self.n(cur).children {
      let center = self.n(cur).bound.center();
      let offset = IVec3::new(
        (point.x >= center.x) as i32,
        (point.y >= center.y) as i32,
        (point.z >= center.z) as i32,
      );
      cur = children[offset_octant(offset) as usize];
    }
    Some(cur)
  }

  /// Label of the leaf containing `point`; space outside the root is UNKNOWN.
  pub fn label_at(&self, point: DVec3) -> Label {
    self
      .locate(point)
      .map_or(Label::Unknown, |id| self.n(id).label)
  }

  /// Count every node (internal and leaf) reachable from the root.
  pub fn count_nodes(&self) -> usize {
    let mut count = 0;
    let mut stack = vec![self.root];
    while let Some(id) = stack.pop() {
      count += 1;
      if let Some(children) = self.n(id).children {
        stack.extend(children);
      }
    }
    count
  }

  /// Number of leaves reachable from the root.
  pub fn leaf_count(&self) -> usize {
    self.leaves().count()
  }

  /// Iterate over all leaves in depth-first order.
  pub fn leaves(&self) -> Leaves<'_> {
    Leaves {
      tree: self,
      stack: vec![self.root],
    }
  }

  /// Mark the region covered by `obstacle` (inflated by the agent padding)
  /// as BLOCKED.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "octree::add_obstacle"))]
  pub fn add_obstacle(&mut self, obstacle: &Aabb) {
    let region = obstacle.inflate(self.config.agent_padding);
    tracing::trace!(?region, "octree add_obstacle");
    self.paint(self.root, &region, Paint::BLOCK);
  }

  /// Mark the region covered by `obstacle` (inflated by the agent padding)
  /// as OPEN. OPEN and UNKNOWN leaves are left as they are.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "octree::remove_obstacle"))]
  pub fn remove_obstacle(&mut self, obstacle: &Aabb) {
    let region = obstacle.inflate(self.config.agent_padding);
    tracing::trace!(?region, "octree remove_obstacle");
    self.paint(self.root, &region, Paint::CLEAR);
  }

  /// Mark `region` (inflated by the agent padding) as UNKNOWN.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "octree::set_unknown"))]
  pub fn set_unknown(&mut self, region: &Aabb) {
    let region = region.inflate(self.config.agent_padding);
    tracing::trace!(?region, "octree set_unknown");
    self.paint(self.root, &region, Paint::FORGET);
  }

  /// Reclassify UNKNOWN space within `radius` of `center` as OPEN.
  ///
  /// Minimum-size leaves straddling the sphere open when their center is
  /// inside it.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "octree::update_unknown"))]
  pub fn update_unknown(&mut self, center: DVec3, radius: f64) {
    tracing::trace!(?center, radius, "octree update_unknown");
    self.reveal(self.root, center, radius);
  }

  /// Grow the root until it contains `range`.
  ///
  /// Returns `None` if the root already contains `range`. Otherwise each
  /// doubling wraps the old root as one child of a new root twice its size,
  /// placed on the side away from `range`'s center, with the 7 new siblings
  /// UNKNOWN. Returns the new root handle, which replaces any root handle the
  /// caller holds. Handles to existing nodes stay valid; only their depth
  /// and lattice coordinates change.
  ///
  /// Growth stops early, with a warning, once another doubling would push
  /// minimum-size leaves past [`MAX_TREE_DEPTH`].
  pub fn check_and_expand(&mut self, range: &Aabb) -> Option<NodeId> {
    if self.root_bound().contains(range) {
      return None;
    }
    debug_assert!(
      range.min.is_finite() && range.max.is_finite(),
      "expansion range must be finite"
    );

    let target = range.center();
    let mut doublings = 0;
    while !self.root_bound().contains(range) {
      if self.root_bound().edge() * 2.0 > self.config.max_root_edge() {
        tracing::warn!(?range, doublings, "octree expansion stopped at the depth limit");
        break;
      }
      self.grow_towards(target);
      doublings += 1;
    }
    if doublings == 0 {
      return None;
    }

    tracing::debug!(
      doublings,
      edge = self.root_bound().edge(),
      "octree re-rooted"
    );
    Some(self.root)
  }

  /// Lattice coordinate of a node relative to the current root.
  pub fn cell_coord(&self, id: NodeId) -> Result<CellCoord, NavError> {
    let mut octants: SmallVec<[u8; 32]> = SmallVec::new();
    let mut cur = self.live(id)?;
    let mut node = self.n(cur);
    while let Some(parent) = node.parent {
      let octant = self.checked_octant(cur, parent)?;
      octants.push(octant);
      if octants.len() > MAX_TREE_DEPTH as usize {
        return Err(NavError::CorruptTree {
          node: id,
          reason: "node deeper than the depth limit",
        });
      }
      cur = parent;
      node = self.n(cur);
    }

    let mut coord = CellCoord::new(0, 0, 0, 0);
    for &octant in octants.iter().rev() {
      coord = coord.child(octant);
    }
    Ok(coord)
  }

  // ---------------------------------------------------------------------------
  // Arena access
  // ---------------------------------------------------------------------------

  #[inline]
  pub(crate) fn n(&self, id: NodeId) -> &Node {
    &self.nodes[id.index()]
  }

  #[inline]
  fn n_mut(&mut self, id: NodeId) -> &mut Node {
    &mut self.nodes[id.index()]
  }

  #[inline]
  pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
    self.nodes.get(id.index()).filter(|n| n.live)
  }

  /// Confirm a handle refers to a live node.
  #[inline]
  pub(crate) fn live(&self, id: NodeId) -> Result<NodeId, NavError> {
    self.get(id).map(|_| id).ok_or(NavError::StaleNode(id))
  }

  /// Octant of `child`, verified against the parent's child slots.
  pub(crate) fn checked_octant(&self, child: NodeId, parent: NodeId) -> Result<u8, NavError> {
    let octant = self.n(child).octant.ok_or(NavError::CorruptTree {
      node: child,
      reason: "non-root node without octant code",
    })?;
    if octant >= 8 {
      return Err(NavError::CorruptTree {
        node: child,
        reason: "octant code out of range",
      });
    }
    let siblings = self.n(parent).children.ok_or(NavError::CorruptTree {
      node: parent,
      reason: "parent link points at a leaf",
    })?;
    if siblings[octant as usize] != child {
      return Err(NavError::CorruptTree {
        node: child,
        reason: "parent child slot does not point back",
      });
    }
    Ok(octant)
  }

  fn alloc(&mut self, node: Node) -> NodeId {
    match self.free.pop() {
      Some(id) => {
        self.nodes[id.index()] = node;
        id
      }
      None => {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
      }
    }
  }

  /// Free every descendant of `id` and turn it into a leaf.
  fn discard_children(&mut self, id: NodeId) {
    let Some(children) = self.n_mut(id).children.take() else {
      return;
    };
    let mut stack: Vec<NodeId> = children.to_vec();
    while let Some(dead) = stack.pop() {
      let node = self.n_mut(dead);
      node.live = false;
      if let Some(grandchildren) = node.children.take() {
        stack.extend(grandchildren);
      }
      self.free.push(dead);
    }
  }

  fn make_leaf(&mut self, id: NodeId, label: Label) {
    self.discard_children(id);
    self.n_mut(id).label = label;
  }

  /// Split a leaf into 8 children that inherit its label.
  fn subdivide(&mut self, id: NodeId) {
    debug_assert!(self.n(id).is_leaf(), "only leaves can be subdivided");
    let (label, bound) = {
      let node = self.n(id);
      (node.label, node.bound)
    };

    let mut children = [id; 8];
    for (octant, slot) in children.iter_mut().enumerate() {
      let octant = octant as u8;
      *slot = self.alloc(Node::leaf(label, bound.octant(octant), Some(id), Some(octant)));
    }

    let node = self.n_mut(id);
    node.children = Some(children);
    node.label = Label::Mixed;
  }

  /// Collapse the node if all 8 children are leaves sharing one label.
  fn try_compact(&mut self, id: NodeId) -> bool {
    let Some(children) = self.n(id).children else {
      return false;
    };
    let first = self.n(children[0]);
    if !first.is_leaf() {
      return false;
    }
    let label = first.label;
    let uniform = children[1..]
      .iter()
      .all(|&c| self.n(c).is_leaf() && self.n(c).label == label);
    if uniform {
      self.make_leaf(id, label);
    }
    uniform
  }

  fn paint(&mut self, id: NodeId, region: &Aabb, paint: Paint) {
    let (bound, leaf, label) = {
      let node = self.n(id);
      (node.bound, node.is_leaf(), node.label)
    };
    if leaf && (paint.skip)(label) {
      return;
    }
    if !bound.intersects(region) {
      return;
    }
    if leaf {
      if region.contains(&bound) {
        self.n_mut(id).label = paint.target;
        return;
      }
      if !self.config.can_subdivide(bound.edge()) {
        // Conservative rounding at the resolution limit.
        self.n_mut(id).label = paint.target;
        return;
      }
      self.subdivide(id);
    }

    if let Some(children) = self.n(id).children {
      for child in children {
        self.paint(child, region, paint);
      }
    }
    self.try_compact(id);
  }

  fn reveal(&mut self, id: NodeId, center: DVec3, radius: f64) {
    let (bound, leaf, label) = {
      let node = self.n(id);
      (node.bound, node.is_leaf(), node.label)
    };
    if leaf && label != Label::Unknown {
      return;
    }
    if !bound.intersects_sphere(center, radius) {
      return;
    }
    if leaf {
      if bound.within_sphere(center, radius) {
        self.n_mut(id).label = Label::Open;
        return;
      }
      if !self.config.can_subdivide(bound.edge()) {
        if bound.center().distance_squared(center) <= radius * radius {
          self.n_mut(id).label = Label::Open;
        }
        return;
      }
      self.subdivide(id);
    }

    if let Some(children) = self.n(id).children {
      for child in children {
        self.reveal(child, center, radius);
      }
    }
    self.try_compact(id);
  }

  /// Wrap the current root as one octant of a root twice its size.
  fn grow_towards(&mut self, target: DVec3) {
    let old = self.root;
    let bound = self.n(old).bound;
    let center = bound.center();
    let edge = bound.edge();

    // The old root takes the high half on axes where the target lies below.
    let offset = IVec3::new(
      (target.x < center.x) as i32,
      (target.y < center.y) as i32,
      (target.z < center.z) as i32,
    );
    let octant = offset_octant(offset);
    let grown = Aabb::cube(bound.min - offset.as_dvec3() * edge, edge * 2.0);

    let root = self.alloc(Node::leaf(Label::Mixed, grown, None, None));
    let mut children = [old; 8];
    for (slot_octant, slot) in children.iter_mut().enumerate() {
      let slot_octant = slot_octant as u8;
      if slot_octant != octant {
        *slot = self.alloc(Node::leaf(
          Label::Unknown,
          grown.octant(slot_octant),
          Some(root),
          Some(slot_octant),
        ));
      }
    }

    let old_node = self.n_mut(old);
    old_node.parent = Some(root);
    old_node.octant = Some(octant);
    self.n_mut(root).children = Some(children);
    self.root = root;
  }
}

#[cfg(test)]
impl Octree {
  /// Overwrite a node's octant code without touching its parent.
  pub(crate) fn corrupt_octant(&mut self, id: NodeId, octant: Option<u8>) {
    self.n_mut(id).octant = octant;
  }
}

/// Depth-first iterator over the leaves of an [`Octree`].
pub struct Leaves<'a> {
  tree: &'a Octree,
  stack: Vec<NodeId>,
}

impl Iterator for Leaves<'_> {
  type Item = NodeId;

  fn next(&mut self) -> Option<NodeId> {
    while let Some(id) = self.stack.pop() {
      match self.tree.n(id).children {
        Some(children) => self.stack.extend(children.iter().rev()),
        None => return Some(id),
      }
    }
    None
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
