use super::*;

fn exact() -> OctreeConfig {
  OctreeConfig {
    min_node_size: 1.0,
    agent_padding: 0.0,
  }
}

fn tree(center: DVec3, size: f64, label: Label) -> Octree {
  Octree::new(center, size, label, exact()).unwrap()
}

fn leaf_labels(tree: &Octree) -> Vec<Label> {
  tree.leaves().map(|id| tree.label(id).unwrap()).collect()
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_new_single_leaf_root() {
  let tree = tree(DVec3::ZERO, 10.0, Label::Unknown);

  assert_eq!(tree.count_nodes(), 1);
  assert!(tree.is_leaf(tree.root()));
  assert_eq!(tree.label(tree.root()), Some(Label::Unknown));
  assert_eq!(tree.root_bound().min, DVec3::splat(-5.0));
  assert_eq!(tree.parent(tree.root()), None);
  assert_eq!(tree.octant(tree.root()), None);
  assert_eq!(tree.depth(tree.root()), Some(0));
}

#[test]
fn test_new_rejects_bad_input() {
  let bad = OctreeConfig {
    min_node_size: 0.0,
    agent_padding: 0.0,
  };
  assert!(matches!(
    Octree::new(DVec3::ZERO, 10.0, Label::Open, bad),
    Err(NavError::InvalidConfig(_))
  ));
  assert!(Octree::new(DVec3::ZERO, -1.0, Label::Open, exact()).is_err());
  assert!(Octree::new(DVec3::ZERO, 10.0, Label::Mixed, exact()).is_err());
}

#[test]
fn test_new_rejects_roots_past_depth_limit() {
  let fine = OctreeConfig {
    min_node_size: 1e-13,
    agent_padding: 0.0,
  };
  assert!(matches!(
    Octree::new(DVec3::ZERO, 1.0, Label::Open, fine),
    Err(NavError::InvalidConfig(_))
  ));

  let widest = (1u64 << MAX_TREE_DEPTH) as f64;
  assert!(Octree::new(DVec3::ZERO, widest, Label::Open, exact()).is_ok());
  assert!(Octree::new(DVec3::ZERO, widest * 2.0, Label::Open, exact()).is_err());
}

// =========================================================================
// Obstacle painting
// =========================================================================

/// 2x2x2 box at the center of a size-10 root subdivides the root and
/// blocks only space the box overlaps.
#[test]
fn test_center_box_subdivides_root() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  tree.add_obstacle(&Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0)));

  let root = tree.root();
  assert_eq!(tree.label(root), Some(Label::Mixed));
  assert_eq!(tree.children(root).map(|c| c.len()), Some(8));
  assert!(tree.count_nodes() >= 9, "got {}", tree.count_nodes());

  assert_eq!(tree.label_at(DVec3::ZERO), Label::Blocked);
  assert_eq!(tree.label_at(DVec3::new(-0.5, 0.5, -0.5)), Label::Blocked);
  assert_eq!(tree.label_at(DVec3::splat(4.0)), Label::Open);
  assert_eq!(tree.label_at(DVec3::splat(2.0)), Label::Open);

  // No leaf is MIXED and no MIXED node has uniform leaf children.
  assert!(leaf_labels(&tree).iter().all(|l| l.is_terminal()));
}

/// A box covering one octant exactly blocks that child and nothing else.
#[test]
fn test_box_covering_octant() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Unknown);
  tree.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::splat(5.0)));

  assert_eq!(tree.count_nodes(), 9);
  let children = tree.children(tree.root()).unwrap();
  for (octant, child) in children.iter().enumerate() {
    let expected = if octant == 7 { Label::Blocked } else { Label::Unknown };
    assert_eq!(tree.label(*child), Some(expected), "octant {octant}");
    assert_eq!(tree.octant(*child), Some(octant as u8));
    assert_eq!(tree.parent(*child), Some(tree.root()));
  }
}

#[test]
fn test_add_then_remove_restores_open() {
  let boxes = [
    Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0)),
    Aabb::new(DVec3::new(-4.2, 0.3, 1.1), DVec3::new(-0.7, 2.9, 4.6)),
    Aabb::new(DVec3::new(2.0, -5.0, -5.0), DVec3::new(2.5, 5.0, 5.0)),
  ];

  for obstacle in &boxes {
    let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
    tree.add_obstacle(obstacle);
    assert!(tree.count_nodes() > 1);

    tree.remove_obstacle(obstacle);
    assert_eq!(tree.count_nodes(), 1, "box {obstacle:?} left structure behind");
    assert_eq!(tree.label(tree.root()), Some(Label::Open));
  }
}

/// Padding grows the blocked region by at most one minimum-size node.
#[test]
fn test_padding_inflates_obstacle() {
  let config = OctreeConfig {
    min_node_size: 1.0,
    agent_padding: 0.5,
  };
  let mut tree = Octree::new(DVec3::splat(4.0), 8.0, Label::Open, config).unwrap();
  tree.add_obstacle(&Aabb::new(DVec3::splat(3.0), DVec3::splat(5.0)));

  assert_eq!(tree.label_at(DVec3::new(2.7, 4.0, 4.0)), Label::Blocked);
  assert_eq!(tree.label_at(DVec3::new(1.5, 4.0, 4.0)), Label::Open);

  tree.remove_obstacle(&Aabb::new(DVec3::splat(3.0), DVec3::splat(5.0)));
  assert_eq!(tree.count_nodes(), 1);
}

/// Two halves blocked one after the other compact into one BLOCKED leaf,
/// and further blocking of that space leaves it a single leaf.
#[test]
fn test_compaction_idempotence() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  tree.add_obstacle(&Aabb::new(DVec3::splat(-5.0), DVec3::new(0.0, 5.0, 5.0)));
  assert_eq!(tree.count_nodes(), 9);

  tree.add_obstacle(&Aabb::new(DVec3::new(0.0, -5.0, -5.0), DVec3::splat(5.0)));
  assert_eq!(tree.count_nodes(), 1);
  assert_eq!(tree.label(tree.root()), Some(Label::Blocked));

  tree.add_obstacle(&Aabb::new(DVec3::splat(-1.3), DVec3::splat(2.2)));
  assert_eq!(tree.count_nodes(), 1);
  assert_eq!(tree.label(tree.root()), Some(Label::Blocked));
}

#[test]
fn test_remove_skips_unknown() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Unknown);
  tree.remove_obstacle(&Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0)));

  assert_eq!(tree.count_nodes(), 1);
  assert_eq!(tree.label(tree.root()), Some(Label::Unknown));
}

#[test]
fn test_set_unknown_no_op_on_unknown() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Unknown);
  tree.set_unknown(&Aabb::new(DVec3::splat(-2.0), DVec3::splat(3.0)));
  assert_eq!(tree.count_nodes(), 1);
}

#[test]
fn test_set_unknown_forgets_blocked_and_open() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  tree.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::splat(5.0)));
  tree.set_unknown(&Aabb::new(DVec3::new(-5.0, -5.0, -5.0), DVec3::new(5.0, 5.0, 0.0)));

  assert_eq!(tree.label_at(DVec3::new(-2.0, -2.0, -2.0)), Label::Unknown);
  assert_eq!(tree.label_at(DVec3::new(2.0, 2.0, 2.0)), Label::Blocked);
  assert_eq!(tree.label_at(DVec3::new(-2.0, -2.0, 2.0)), Label::Open);
}

// =========================================================================
// Sensor reveal
// =========================================================================

#[test]
fn test_update_unknown_whole_root() {
  let mut tree = tree(DVec3::ZERO, 8.0, Label::Unknown);
  tree.update_unknown(DVec3::ZERO, 100.0);

  assert_eq!(tree.count_nodes(), 1);
  assert_eq!(tree.label(tree.root()), Some(Label::Open));
}

#[test]
fn test_update_unknown_partial_sphere() {
  let mut tree = tree(DVec3::splat(4.0), 8.0, Label::Unknown);
  tree.update_unknown(DVec3::ZERO, 2.5);

  assert_eq!(tree.label_at(DVec3::splat(0.5)), Label::Open);
  // Straddling min-size leaf with its center inside the sphere.
  assert_eq!(tree.label_at(DVec3::new(1.5, 1.5, 0.5)), Label::Open);
  // Straddling min-size leaf with its center outside.
  assert_eq!(tree.label_at(DVec3::splat(1.5)), Label::Unknown);
  assert_eq!(tree.label_at(DVec3::splat(6.0)), Label::Unknown);
}

#[test]
fn test_update_unknown_ignores_known_space() {
  let mut tree = tree(DVec3::ZERO, 8.0, Label::Blocked);
  tree.update_unknown(DVec3::ZERO, 100.0);
  assert_eq!(tree.label(tree.root()), Some(Label::Blocked));
}

/// Revealing the remaining UNKNOWN leaves compacts the tree back to OPEN.
#[test]
fn test_update_unknown_compacts_to_open() {
  let mut tree = tree(DVec3::splat(4.0), 8.0, Label::Unknown);
  tree.remove_obstacle(&Aabb::new(DVec3::ZERO, DVec3::ONE));
  // UNKNOWN space is not opened by removal.
  assert_eq!(tree.count_nodes(), 1);

  tree.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::ONE));
  tree.remove_obstacle(&Aabb::new(DVec3::ZERO, DVec3::ONE));
  assert!(tree.count_nodes() > 1);
  assert_eq!(tree.label_at(DVec3::splat(0.5)), Label::Open);

  tree.update_unknown(DVec3::splat(4.0), 100.0);
  assert_eq!(tree.count_nodes(), 1);
  assert_eq!(tree.label(tree.root()), Some(Label::Open));
}

// =========================================================================
// Re-rooting
// =========================================================================

#[test]
fn test_check_and_expand_no_change_when_contained() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  let root = tree.root();

  assert_eq!(tree.check_and_expand(&Aabb::new(DVec3::splat(-5.0), DVec3::splat(5.0))), None);
  assert_eq!(tree.root(), root);
}

#[test]
fn test_check_and_expand_single_doubling() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  let old_root = tree.root();
  let old_bound = tree.root_bound();
  let range = Aabb::new(DVec3::splat(6.0), DVec3::splat(8.0));

  let new_root = tree.check_and_expand(&range).unwrap();
  assert_eq!(tree.root(), new_root);
  assert_ne!(new_root, old_root);
  assert!(tree.root_bound().contains(&range));
  assert_eq!(tree.root_bound().edge(), 20.0);

  let children = tree.children(new_root).unwrap();
  assert_eq!(children.iter().filter(|&&c| c == old_root).count(), 1);
  assert_eq!(children[0], old_root, "range above the root keeps it low");
  assert_eq!(tree.label(old_root), Some(Label::Open));
  assert_eq!(tree.bound(old_root), Some(old_bound));
  for child in &children[1..] {
    assert_eq!(tree.label(*child), Some(Label::Unknown));
  }

  // Second call is a no-op.
  assert_eq!(tree.check_and_expand(&range), None);
}

#[test]
fn test_check_and_expand_below_root() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Blocked);
  let old_root = tree.root();
  let range = Aabb::new(DVec3::splat(-9.0), DVec3::splat(-7.0));

  let new_root = tree.check_and_expand(&range).unwrap();
  assert_eq!(tree.root_bound().min, DVec3::splat(-15.0));
  assert_eq!(tree.children(new_root).unwrap()[7], old_root);
  assert_eq!(tree.label(old_root), Some(Label::Blocked));
  assert_eq!(tree.label_at(DVec3::splat(-8.0)), Label::Unknown);
}

#[test]
fn test_check_and_expand_repeats_until_contained() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  let old_root = tree.root();
  let range = Aabb::new(DVec3::splat(20.0), DVec3::splat(22.0));

  tree.check_and_expand(&range).unwrap();
  assert!(tree.root_bound().contains(&range));
  assert_eq!(tree.depth(old_root), Some(2));
  assert_eq!(tree.cell_coord(old_root).unwrap(), CellCoord::new(0, 0, 0, 2));
  assert_eq!(tree.label_at(DVec3::ZERO), Label::Open);
}

#[test]
fn test_check_and_expand_stops_at_depth_limit() {
  let edge = (1u64 << (MAX_TREE_DEPTH - 2)) as f64;
  let mut tree = tree(DVec3::splat(edge * 0.5), edge, Label::Open);
  tree.add_obstacle(&Aabb::new(DVec3::splat(edge - 1.0), DVec3::splat(edge)));
  let corner = tree.locate(DVec3::splat(edge - 0.5)).unwrap();
  assert_eq!(tree.depth(corner), Some(MAX_TREE_DEPTH - 2));

  let far = Aabb::new(DVec3::splat(-1e12), DVec3::splat(-1e12 + 1.0));
  assert!(tree.check_and_expand(&far).is_some());
  assert!(!tree.root_bound().contains(&far));
  assert_eq!(tree.root_bound().edge(), edge * 4.0);
  assert_eq!(tree.check_and_expand(&far), None);

  // The high corner leaf now sits at the deepest lattice level.
  let top = (1i32 << MAX_TREE_DEPTH) - 1;
  assert_eq!(tree.cell_coord(corner).unwrap(), CellCoord::new(top, top, top, MAX_TREE_DEPTH));
  let explore = tree.leaf_neighbours_explore(corner).unwrap();
  let beyond = CellCoord::new(top + 1, top + 1, top + 1, MAX_TREE_DEPTH);
  assert!(explore.contains(&crate::octree::OctreeCell::Phantom(beyond)));
}

// =========================================================================
// Inspection
// =========================================================================

#[test]
fn test_locate_outside_root() {
  let tree = tree(DVec3::ZERO, 10.0, Label::Open);
  assert_eq!(tree.locate(DVec3::splat(6.0)), None);
  assert_eq!(tree.label_at(DVec3::splat(6.0)), Label::Unknown);
  assert_eq!(tree.locate(DVec3::splat(5.0)), Some(tree.root()));
}

#[test]
fn test_leaves_and_cell_coords() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  tree.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::splat(5.0)));

  assert_eq!(tree.leaf_count(), 8);
  let blocked = tree.locate(DVec3::splat(2.5)).unwrap();
  assert_eq!(tree.cell_coord(blocked).unwrap(), CellCoord::new(1, 1, 1, 1));
  assert_eq!(tree.depth(blocked), Some(1));
  assert_eq!(tree.cell_coord(tree.root()).unwrap(), CellCoord::new(0, 0, 0, 0));
}

/// Compaction frees child slots; their handles go stale.
#[test]
fn test_freed_handles_are_stale() {
  let mut tree = tree(DVec3::ZERO, 10.0, Label::Open);
  tree.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::splat(5.0)));
  let child = tree.children(tree.root()).unwrap()[0];

  tree.add_obstacle(&Aabb::new(DVec3::splat(-5.0), DVec3::splat(5.0)));
  assert_eq!(tree.label(child), None);
  assert!(!tree.is_leaf(child));
  assert_eq!(tree.cell_coord(child), Err(NavError::StaleNode(child)));
}
