//! Core value types shared by both occupancy representations.

use std::fmt;

/// Occupancy label of an octree node or a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Label {
  /// Known traversable space.
  Open,
  /// Known obstacle.
  Blocked,
  /// Not yet observed.
  #[default]
  Unknown,
  /// Octree only: subdivided node whose children disagree.
  Mixed,
}

impl Label {
  /// Integer token used by the debug export.
  ///
  /// 0 = OPEN, 1 = BLOCKED, 2 = UNKNOWN, 3 = MIXED.
  #[inline]
  pub fn code(self) -> u8 {
    match self {
      Label::Open => 0,
      Label::Blocked => 1,
      Label::Unknown => 2,
      Label::Mixed => 3,
    }
  }

  /// Inverse of [`Label::code`].
  pub fn from_code(code: u8) -> Option<Self> {
    match code {
      0 => Some(Label::Open),
      1 => Some(Label::Blocked),
      2 => Some(Label::Unknown),
      3 => Some(Label::Mixed),
      _ => None,
    }
  }

  /// True for the three labels a leaf (or voxel) can carry.
  #[inline]
  pub fn is_terminal(self) -> bool {
    self != Label::Mixed
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Label::Open => "OPEN",
      Label::Blocked => "BLOCKED",
      Label::Unknown => "UNKNOWN",
      Label::Mixed => "MIXED",
    };
    f.write_str(name)
  }
}

/// Priority function used by the search engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SearchMode {
  /// A*: cost-so-far + heuristic.
  #[default]
  Heuristic,
  /// Cost-so-far only.
  Dijkstra,
  /// Heuristic only.
  Greedy,
}

impl SearchMode {
  /// Frontier priority for a node with accumulated `cost` and estimate `h`.
  #[inline]
  pub fn priority(self, cost: f64, h: f64) -> f64 {
    match self {
      SearchMode::Heuristic => cost + h,
      SearchMode::Dijkstra => cost,
      SearchMode::Greedy => h,
    }
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
