//! SearchEngine - best-first search with early termination.
//!
//! One frontier loop serves all three queries:
//!
//! ```text
//! pop lowest priority
//!   already closed?                  -> skip (no reopening)
//!   goal / near target?              -> reconstruct, done
//!   for each neighbour:
//!     frontier query, UNKNOWN, != start -> path + phantom, done
//!     closed or infinite edge        -> skip
//!     cheaper than best known        -> record, push
//! frontier empty                     -> not found
//! ```
//!
//! Closed nodes are never reopened, so results are optimal only when the
//! heuristic is consistent.

use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use glam::DVec3;
use web_time::Instant;

use super::queue::QueueEntry;
use super::SearchGraph;
use crate::error::NavError;
use crate::types::SearchMode;

/// What a search is looking for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchGoal<N> {
  /// A specific node.
  Node(N),
  /// The nearest node next to UNKNOWN space.
  Frontier,
  /// The nearest node next to UNKNOWN space, or any node within one cell
  /// of the point.
  Toward(DVec3),
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
  /// The goal node was popped.
  ReachedGoal,
  /// An UNKNOWN neighbour was found.
  ReachedFrontier,
  /// A node within one cell of the target point was popped.
  ReachedTarget,
  /// The frontier ran empty.
  Exhausted,
}

/// Counters for one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
  /// Nodes popped and expanded.
  pub expanded: usize,
  /// Entries pushed onto the frontier.
  pub pushed: usize,
  /// Wall time in microseconds.
  pub elapsed_us: u64,
}

/// Path (if any) plus bookkeeping for one search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult<N> {
  /// Nodes from start to the stopping node, phantom target last for
  /// frontier hits.
  pub path: Option<Vec<N>>,
  /// Why the search stopped.
  pub outcome: SearchOutcome,
  /// Counters.
  pub stats: SearchStats,
}

/// Best-first search configured with a priority mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchEngine {
  /// Priority used by `find_path` and `explore_to`.
  pub mode: SearchMode,
}

/// Per-query bookkeeping, dropped when the query returns.
struct Frontier<N> {
  heap: BinaryHeap<QueueEntry<N>>,
  best: HashMap<N, f64>,
  came_from: HashMap<N, N>,
  closed: HashSet<N>,
  seq: u64,
  stats: SearchStats,
}

impl<N: Copy + Eq + std::hash::Hash> Frontier<N> {
  fn new(start: N, priority: f64) -> Self {
    let mut frontier = Self {
      heap: BinaryHeap::new(),
      best: HashMap::new(),
      came_from: HashMap::new(),
      closed: HashSet::new(),
      seq: 0,
      stats: SearchStats::default(),
    };
    frontier.best.insert(start, 0.0);
    frontier.push(start, priority);
    frontier
  }

  fn push(&mut self, node: N, priority: f64) {
    self.heap.push(QueueEntry {
      priority,
      seq: self.seq,
      node,
    });
    self.seq += 1;
    self.stats.pushed += 1;
  }

  /// Record `cost` for `node` via `from` if it beats the best known cost.
  fn relax(&mut self, node: N, from: N, cost: f64) -> bool {
    match self.best.entry(node) {
      Entry::Occupied(mut e) if cost < *e.get() => {
        e.insert(cost);
      }
      Entry::Occupied(_) => return false,
      Entry::Vacant(e) => {
        e.insert(cost);
      }
    }
    self.came_from.insert(node, from);
    true
  }

  fn path_to(&self, end: N) -> Vec<N> {
    let mut path = vec![end];
    let mut cur = end;
    while let Some(&prev) = self.came_from.get(&cur) {
      path.push(prev);
      cur = prev;
    }
    path.reverse();
    path
  }
}

impl SearchEngine {
  /// Engine with the given priority mode.
  pub fn new(mode: SearchMode) -> Self {
    Self { mode }
  }

  /// Path from `start` to `goal`, or `None` if the goal is unreachable.
  pub fn find_path<G: SearchGraph>(
    &self,
    graph: &G,
    start: G::Node,
    goal: G::Node,
  ) -> Result<Option<Vec<G::Node>>, NavError> {
    Ok(self.search(graph, start, SearchGoal::Node(goal))?.path)
  }

  /// Path from `start` to the nearest node next to UNKNOWN space, ending in
  /// the graph's phantom target when it supplies one. `None` once all
  /// reachable known space has been searched.
  pub fn explore<G: SearchGraph>(
    &self,
    graph: &G,
    start: G::Node,
  ) -> Result<Option<Vec<G::Node>>, NavError> {
    Ok(self.search(graph, start, SearchGoal::Frontier)?.path)
  }

  /// Like [`SearchEngine::explore`], also stopping at the first node within
  /// one cell of `target`.
  pub fn explore_to<G: SearchGraph>(
    &self,
    graph: &G,
    start: G::Node,
    target: DVec3,
  ) -> Result<Option<Vec<G::Node>>, NavError> {
    Ok(self.search(graph, start, SearchGoal::Toward(target))?.path)
  }

  /// Run one query and report how it ended.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "search"))]
  pub fn search<G: SearchGraph>(
    &self,
    graph: &G,
    start: G::Node,
    goal: SearchGoal<G::Node>,
  ) -> Result<SearchResult<G::Node>, NavError> {
    let started = Instant::now();
    let frontier_query = !matches!(goal, SearchGoal::Node(_));
    let mode = match goal {
      SearchGoal::Frontier => SearchMode::Dijkstra,
      _ => self.mode,
    };
    let estimate = |node: G::Node| match goal {
      SearchGoal::Node(target) => graph.heuristic(node, target),
      SearchGoal::Frontier => 0.0,
      SearchGoal::Toward(point) => graph.heuristic_to_point(node, point),
    };

    let mut frontier = Frontier::new(start, mode.priority(0.0, estimate(start)));
    let mut found: Option<(Vec<G::Node>, SearchOutcome)> = None;

    'search: while let Some(QueueEntry { node: current, .. }) = frontier.heap.pop() {
      if !frontier.closed.insert(current) {
        continue;
      }
      frontier.stats.expanded += 1;

      match goal {
        SearchGoal::Node(target) if current == target => {
          found = Some((frontier.path_to(current), SearchOutcome::ReachedGoal));
          break;
        }
        SearchGoal::Toward(point) if graph.heuristic_to_point(current, point) < graph.extent(current) => {
          found = Some((frontier.path_to(current), SearchOutcome::ReachedTarget));
          break;
        }
        _ => {}
      }

      let neighbours = if frontier_query {
        graph.neighbours_explore(current)?
      } else {
        graph.neighbours(current)?
      };
      let cost_here = frontier.best.get(&current).copied().unwrap_or(0.0);

      for next in neighbours {
        if frontier_query && next != start && graph.is_unknown(next) {
          let mut path = frontier.path_to(current);
          if let Some(phantom) = graph.phantom_neighbour(next, current) {
            path.push(phantom);
          }
          found = Some((path, SearchOutcome::ReachedFrontier));
          break 'search;
        }
        if frontier.closed.contains(&next) {
          continue;
        }
        let step = graph.distance(current, next);
        if !step.is_finite() {
          continue;
        }
        let cost = cost_here + step.max(0.0);
        if frontier.relax(next, current, cost) {
          frontier.push(next, mode.priority(cost, estimate(next)));
        }
      }
    }

    frontier.stats.elapsed_us = started.elapsed().as_micros() as u64;
    let stats = frontier.stats;
    let result = match found {
      Some((path, outcome)) => SearchResult {
        path: Some(path),
        outcome,
        stats,
      },
      None => SearchResult {
        path: None,
        outcome: SearchOutcome::Exhausted,
        stats,
      },
    };

    tracing::debug!(
      outcome = ?result.outcome,
      len = result.path.as_ref().map_or(0, Vec::len),
      expanded = stats.expanded,
      pushed = stats.pushed,
      elapsed_us = stats.elapsed_us,
      "search finished"
    );
    Ok(result)
  }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
