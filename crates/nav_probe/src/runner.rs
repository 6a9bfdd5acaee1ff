//! Applies scenario steps to either map representation.

use anyhow::{Context, Result};
use glam::DVec3;
use voxel_nav::{MapMetrics, OccupancyMap, Octree, SearchEngine, SearchGoal, SearchGraph, VoxelGrid};

use crate::config::Step;

/// What the runner needs beyond the two library traits.
pub trait ProbeMap: OccupancyMap + SearchGraph {
	/// Search node for a world point.
	fn node_at(&self, point: DVec3) -> Option<Self::Node>;

	fn refresh(&self, metrics: &mut MapMetrics);
}

impl ProbeMap for Octree {
	fn node_at(&self, point: DVec3) -> Option<Self::Node> {
		self.cell_at(point)
	}

	fn refresh(&self, metrics: &mut MapMetrics) {
		metrics.update_from_octree(self);
	}
}

impl ProbeMap for VoxelGrid {
	fn node_at(&self, point: DVec3) -> Option<Self::Node> {
		point.is_finite().then(|| self.voxel_coord(point))
	}

	fn refresh(&self, metrics: &mut MapMetrics) {
		metrics.update_from_grid(self);
	}
}

/// Summary of one query step.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
	pub step: usize,
	pub found: bool,
	pub nodes: usize,
	/// Summed edge cost along the path.
	pub cost: f64,
	pub end: Option<DVec3>,
}

/// Run every step against `map`, returning one report per query.
pub fn run<M: ProbeMap>(
	map: &mut M,
	steps: &[Step],
	engine: SearchEngine,
	metrics: &mut MapMetrics,
) -> Result<Vec<QueryReport>> {
	let mut reports = Vec::new();

	for (i, step) in steps.iter().enumerate() {
		match step {
			Step::Obstacle { bounds } => map.add_obstacle(bounds),
			Step::Remove { bounds } => map.remove_obstacle(bounds),
			Step::Forget { bounds } => map.set_unknown(bounds),
			Step::Sweep { center, radius } => map.update_unknown(*center, *radius),
			Step::Expand { bounds } => {
				let grew = map.check_and_expand(bounds).is_some();
				tracing::info!(step = i, grew, "expand");
			}
			Step::FindPath { from, to } => {
				let start = locate(map, *from, i)?;
				let goal = locate(map, *to, i)?;
				let result = engine
					.search(map, start, SearchGoal::Node(goal))
					.with_context(|| format!("step {i}: find_path"))?;
				metrics.record_search(result.outcome, &result.stats);
				reports.push(report(map, i, result.path));
			}
			Step::Explore { from, target } => {
				let start = locate(map, *from, i)?;
				let goal = match target {
					Some(point) => SearchGoal::Toward(*point),
					None => SearchGoal::Frontier,
				};
				let result = engine
					.search(map, start, goal)
					.with_context(|| format!("step {i}: explore"))?;
				metrics.record_search(result.outcome, &result.stats);
				reports.push(report(map, i, result.path));
			}
		}
	}

	map.refresh(metrics);
	Ok(reports)
}

fn locate<M: ProbeMap>(map: &M, point: DVec3, step: usize) -> Result<M::Node> {
	map.node_at(point)
		.with_context(|| format!("step {step}: no map cell at {point}"))
}

fn report<M: ProbeMap>(map: &M, step: usize, path: Option<Vec<M::Node>>) -> QueryReport {
	let Some(path) = path else {
		tracing::info!(step, "no path");
		return QueryReport {
			step,
			found: false,
			nodes: 0,
			cost: 0.0,
			end: None,
		};
	};

	let cost: f64 = path
		.windows(2)
		.map(|w| map.distance(w[0], w[1]))
		.filter(|c| c.is_finite())
		.sum();
	let end = path.last().map(|&n| map.center(n));
	tracing::info!(step, nodes = path.len(), cost, ?end, "path");
	QueryReport {
		step,
		found: true,
		nodes: path.len(),
		cost,
		end,
	}
}
