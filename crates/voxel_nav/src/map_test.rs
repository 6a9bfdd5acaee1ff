use super::*;
use crate::grid::GridConfig;
use crate::octree::OctreeConfig;

fn octree() -> Octree {
  let config = OctreeConfig {
    min_node_size: 1.0,
    agent_padding: 0.0,
  };
  Octree::new(DVec3::splat(4.0), 8.0, Label::Open, config).unwrap()
}

fn grid() -> VoxelGrid {
  let config = GridConfig {
    agent_padding: 0.0,
    margin: 0,
    ..GridConfig::default()
  };
  VoxelGrid::new(DVec3::ZERO, 1.0, config).unwrap()
}

fn export<M: OccupancyMap>(map: &M) -> String {
  let mut out = Vec::new();
  let lines = write_export(map, &mut out).unwrap();
  let text = String::from_utf8(out).unwrap();
  assert_eq!(text.lines().count(), lines);
  text
}

/// Drive either map through the shared contract.
fn block_corner<M: OccupancyMap>(map: &mut M) {
  map.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::ONE));
}

#[test]
fn test_octree_export_lists_leaves() {
  let mut tree = octree();
  OccupancyMap::add_obstacle(&mut tree, &Aabb::new(DVec3::ZERO, DVec3::splat(4.0)));

  let text = export(&tree);
  let records: Vec<ExportRecord> = text.lines().map(|l| parse_export_line(l).unwrap()).collect();
  assert_eq!(records.len(), 8);
  assert!(records.contains(&ExportRecord {
    position: DVec3::ZERO,
    size: 4.0,
    label: Label::Blocked,
  }));
  assert_eq!(records.iter().filter(|r| r.label == Label::Open).count(), 7);
}

#[test]
fn test_grid_export_lists_voxels() {
  let grid = grid();
  let text = export(&grid);

  assert_eq!(text.lines().count(), grid.len());
  assert_eq!(text.lines().next(), Some("-1 -1 -1 1 0"));
}

#[test]
fn test_shared_contract_on_both_maps() {
  let mut tree = octree();
  let mut grid = grid();
  block_corner(&mut tree);
  block_corner(&mut grid);

  let inside = DVec3::splat(0.5);
  assert_eq!(OccupancyMap::label_at(&tree, inside), Label::Blocked);
  assert_eq!(OccupancyMap::label_at(&grid, inside), Label::Blocked);

  assert!(OccupancyMap::check_and_expand(&mut tree, &Aabb::new(DVec3::ZERO, DVec3::ONE)).is_none());
  assert!(OccupancyMap::check_and_expand(&mut grid, &Aabb::new(DVec3::ZERO, DVec3::ONE)).is_none());
  assert!(OccupancyMap::check_and_expand(&mut tree, &Aabb::new(DVec3::splat(9.0), DVec3::splat(10.0))).is_some());
  assert!(OccupancyMap::check_and_expand(&mut grid, &Aabb::new(DVec3::splat(9.0), DVec3::splat(10.0))).is_some());

  OccupancyMap::set_unknown(&mut grid, &Aabb::new(DVec3::ZERO, DVec3::ONE));
  assert_eq!(OccupancyMap::label_at(&grid, inside), Label::Unknown);
}

#[test]
fn test_parse_export_line() {
  let record = parse_export_line("  0.5 -2 3.25   1.5 1 ").unwrap();
  assert_eq!(record.position, DVec3::new(0.5, -2.0, 3.25));
  assert_eq!(record.size, 1.5);
  assert_eq!(record.label, Label::Blocked);
}

#[test]
fn test_parse_export_line_rejects_malformed() {
  for line in ["", "1 2 3", "1 2 3 4 0 7", "a 2 3 4 0", "1 2 3 4 9", "1 2 3 4 3", "1 2 3 4 0.5"] {
    assert!(
      matches!(parse_export_line(line), Err(NavError::MalformedExport { .. })),
      "accepted {line:?}"
    );
  }
}
