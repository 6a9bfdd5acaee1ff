//! Map and search statistics for debug overlays and the scenario runner.
//!
//! Feature-gated and runtime-toggled: without `--features metrics` every
//! recording call is a no-op.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_nav::metrics::{MapMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // After a batch of obstacle events:
//! metrics.update_from_octree(&tree);
//!
//! // After each query:
//! metrics.record_search(result.outcome, &result.stats);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::grid::VoxelGrid;
use crate::octree::Octree;
use crate::search::{SearchOutcome, SearchStats};
use crate::types::Label;

/// Deepest level tracked separately; deeper leaves share the last bucket.
pub const MAX_TRACKED_DEPTH: usize = 15;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Searches remembered for the timing and expansion averages.
pub const SEARCH_HISTORY: usize = 128;

/// The last `capacity` samples of one search statistic, with a running
/// total for the average.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<u64>,
    capacity: usize,
    total: u64,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    /// Record a sample, dropping the oldest once full.
    pub fn record(&mut self, sample: u64) {
        if self.samples.len() == self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.total -= old;
            }
        }
        self.samples.push_back(sample);
        self.total = self.total.saturating_add(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.total = 0;
    }

    /// Mean of the held samples; 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.total as f64 / self.samples.len() as f64
    }

    /// Smallest and largest held sample.
    pub fn range(&self) -> Option<(u64, u64)> {
        let lo = self.samples.iter().min()?;
        let hi = self.samples.iter().max()?;
        Some((*lo, *hi))
    }

    pub fn latest(&self) -> Option<u64> {
        self.samples.back().copied()
    }
}

/// Snapshot of map shape plus recent search history.
#[derive(Debug, Clone)]
pub struct MapMetrics {
    // Occupancy
    /// Leaf (octree) or voxel (grid) count per label, indexed by label code.
    pub cells_per_label: [u64; 3],
    /// Octree leaves per depth; the last bucket collects anything deeper.
    pub leaves_per_depth: [u32; MAX_TRACKED_DEPTH + 1],
    /// Live octree nodes, internal ones included.
    pub node_count: u64,

    // Memory
    /// Approximate bytes held by the map storage.
    pub map_memory_bytes: u64,

    // Search
    /// Recent search times in microseconds.
    pub search_timings: SampleWindow,
    /// Recent node expansion counts.
    pub search_expansions: SampleWindow,
    /// Last search time in microseconds.
    pub last_search_us: u64,
    /// Total searches recorded this session.
    pub total_searches: u64,
    /// Searches that returned no path.
    pub failed_searches: u64,
}

impl Default for MapMetrics {
    fn default() -> Self {
        Self {
            cells_per_label: [0; 3],
            leaves_per_depth: [0; MAX_TRACKED_DEPTH + 1],
            node_count: 0,
            map_memory_bytes: 0,
            search_timings: SampleWindow::new(SEARCH_HISTORY),
            search_expansions: SampleWindow::new(SEARCH_HISTORY),
            last_search_us: 0,
            total_searches: 0,
            failed_searches: 0,
        }
    }
}

impl MapMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the map snapshot and timing windows.
    pub fn reset(&mut self) {
        self.clear_map();
        self.search_timings.clear();
        self.search_expansions.clear();
        self.last_search_us = 0;
        // Search totals are cumulative.
    }

    fn clear_map(&mut self) {
        self.cells_per_label = [0; 3];
        self.leaves_per_depth.fill(0);
        self.node_count = 0;
        self.map_memory_bytes = 0;
    }

    /// Replace the map snapshot with the shape of `tree`.
    pub fn update_from_octree(&mut self, tree: &Octree) {
        if !is_enabled() {
            return;
        }
        self.clear_map();
        for id in tree.leaves() {
            if let Some(label) = tree.label(id) {
                self.count_label(label);
            }
            let depth = tree.depth(id).unwrap_or(0) as usize;
            self.leaves_per_depth[depth.min(MAX_TRACKED_DEPTH)] += 1;
        }
        self.node_count = tree.count_nodes() as u64;
        self.map_memory_bytes =
            self.node_count * std::mem::size_of::<crate::octree::node::Node>() as u64;
    }

    /// Replace the map snapshot with the contents of `grid`.
    pub fn update_from_grid(&mut self, grid: &VoxelGrid) {
        if !is_enabled() {
            return;
        }
        self.clear_map();
        for (_, label) in grid.iter() {
            self.count_label(label);
        }
        self.map_memory_bytes = (grid.len() * std::mem::size_of::<Label>()) as u64;
    }

    /// Record how one search went.
    pub fn record_search(&mut self, outcome: SearchOutcome, stats: &SearchStats) {
        if !is_enabled() {
            return;
        }
        self.search_timings.record(stats.elapsed_us);
        self.search_expansions.record(stats.expanded as u64);
        self.last_search_us = stats.elapsed_us;
        self.total_searches += 1;
        if outcome == SearchOutcome::Exhausted {
            self.failed_searches += 1;
        }
    }

    fn count_label(&mut self, label: Label) {
        if let Some(slot) = self.cells_per_label.get_mut(label.code() as usize) {
            *slot += 1;
        }
    }

    /// Cells currently labelled `label`.
    pub fn cells(&self, label: Label) -> u64 {
        self.cells_per_label.get(label.code() as usize).copied().unwrap_or(0)
    }

    pub fn total_cells(&self) -> u64 {
        self.cells_per_label.iter().sum()
    }

    /// Mean search time over the recent history, in microseconds.
    pub fn avg_search_timing_us(&self) -> f64 {
        self.search_timings.mean()
    }

    /// Mean nodes expanded over the recent history.
    pub fn avg_expanded(&self) -> f64 {
        self.search_expansions.mean()
    }

    pub fn map_memory_mb(&self) -> f64 {
        self.map_memory_bytes as f64 / 1_048_576.0
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::bounds::Aabb;
    use crate::grid::GridConfig;
    use crate::octree::OctreeConfig;

    #[test]
    fn test_sample_window_drops_oldest() {
        let mut window = SampleWindow::new(3);
        assert!(window.is_empty());
        assert_eq!(window.range(), None);
        assert_eq!(window.mean(), 0.0);

        for sample in [10, 20, 30] {
            window.record(sample);
        }
        assert_eq!(window.mean(), 20.0);

        window.record(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.mean(), 30.0);
        assert_eq!(window.range(), Some((20, 40)));
        assert_eq!(window.latest(), Some(40));

        window.clear();
        window.record(7);
        assert_eq!(window.mean(), 7.0);
    }

    #[test]
    fn test_octree_snapshot() {
        let config = OctreeConfig {
            min_node_size: 1.0,
            agent_padding: 0.0,
        };
        let mut tree = Octree::new(DVec3::splat(4.0), 8.0, Label::Open, config).unwrap();
        tree.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::splat(4.0)));

        let mut metrics = MapMetrics::new();
        metrics.update_from_octree(&tree);
        assert_eq!(metrics.cells(Label::Blocked), 1);
        assert_eq!(metrics.cells(Label::Open), 7);
        assert_eq!(metrics.leaves_per_depth[1], 8);
        assert_eq!(metrics.node_count, 9);
        assert!(metrics.map_memory_bytes > 0);

        tree.remove_obstacle(&Aabb::new(DVec3::ZERO, DVec3::splat(4.0)));
        metrics.update_from_octree(&tree);
        assert_eq!(metrics.total_cells(), 1);
        assert_eq!(metrics.leaves_per_depth[0], 1);
    }

    #[test]
    fn test_grid_snapshot() {
        let config = GridConfig {
            agent_padding: 0.0,
            margin: 0,
            ..GridConfig::default()
        };
        let mut grid = VoxelGrid::new(DVec3::ZERO, 1.0, config).unwrap();
        grid.add_obstacle(&Aabb::new(DVec3::ZERO, DVec3::ONE));

        let mut metrics = MapMetrics::new();
        metrics.update_from_grid(&grid);
        assert_eq!(metrics.total_cells(), grid.len() as u64);
        assert_eq!(metrics.cells(Label::Blocked), 1);
        assert_eq!(metrics.node_count, 0);
    }

    #[test]
    fn test_search_recording() {
        let mut metrics = MapMetrics::new();
        let stats = |expanded, elapsed_us| SearchStats {
            expanded,
            pushed: expanded,
            elapsed_us,
        };

        metrics.record_search(SearchOutcome::ReachedGoal, &stats(10, 1000));
        metrics.record_search(SearchOutcome::Exhausted, &stats(30, 3000));

        assert_eq!(metrics.total_searches, 2);
        assert_eq!(metrics.failed_searches, 1);
        assert_eq!(metrics.avg_search_timing_us(), 2000.0);
        assert_eq!(metrics.avg_expanded(), 20.0);
        assert_eq!(metrics.last_search_us, 3000);

        metrics.reset();
        assert!(metrics.search_timings.is_empty());
        assert_eq!(metrics.total_searches, 2);
    }
}
