//! Frontier entries for the min-priority queue.

use std::cmp::Ordering;

/// One frontier entry. Orders as a min-heap on `priority` inside
/// `BinaryHeap`, ties broken by insertion order.
#[derive(Clone, Copy, Debug)]
pub struct QueueEntry<N> {
  /// Frontier priority (lower pops first).
  pub priority: f64,
  /// Insertion sequence number.
  pub seq: u64,
  /// Graph node.
  pub node: N,
}

impl<N> PartialEq for QueueEntry<N> {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl<N> Eq for QueueEntry<N> {}

impl<N> PartialOrd for QueueEntry<N> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<N> Ord for QueueEntry<N> {
  fn cmp(&self, other: &Self) -> Ordering {
    // Reverse for min-heap behavior with BinaryHeap
    other
      .priority
      .total_cmp(&self.priority)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}
