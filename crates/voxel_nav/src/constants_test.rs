use std::collections::HashSet;

use super::*;

#[test]
fn test_center_slot_is_zero_offset() {
  assert_eq!(direction_slot(0, 0, 0), CENTER_SLOT);
  assert_eq!(slot_offset(CENTER_SLOT), IVec3::ZERO);
}

#[test]
fn test_slot_roundtrip() {
  for slot in 0..DIRECTION_SLOTS {
    let offset = slot_offset(slot);
    assert_eq!(
      offset_slot(offset),
      slot,
      "Roundtrip failed for slot {} ({})",
      slot,
      offset
    );
  }
}

/// Faces move along one axis, edges along two, corners along three.
#[test]
fn test_direction_groups_by_axis_count() {
  let moved = |o: &IVec3| (o.x != 0) as u8 + (o.y != 0) as u8 + (o.z != 0) as u8;

  assert!(FACE_OFFSETS.iter().all(|o| moved(o) == 1));
  assert!(EDGE_OFFSETS.iter().all(|o| moved(o) == 2));
  assert!(CORNER_OFFSETS.iter().all(|o| moved(o) == 3));
}

/// The three groups together cover all 26 directions exactly once.
#[test]
fn test_neighbour_offsets_are_distinct_and_complete() {
  let all: HashSet<usize> = neighbour_offsets().map(offset_slot).collect();
  assert_eq!(all.len(), DIRECTION_COUNT);
  assert!(!all.contains(&CENTER_SLOT));
}
