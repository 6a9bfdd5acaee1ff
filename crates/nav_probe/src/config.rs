//! Scenario file parsing.

use anyhow::{Context, Result};
use glam::DVec3;
use serde::Deserialize;
use std::path::Path;
use voxel_nav::{Aabb, GridConfig, Label, OctreeConfig, SearchMode};

/// Root of a scenario TOML file.
#[derive(Debug, Deserialize)]
pub struct Scenario {
	/// Which occupancy representation to drive.
	#[serde(default)]
	pub backend: Backend,
	/// Priority function for path queries.
	#[serde(default)]
	pub mode: SearchMode,
	/// Export file written after the last step, relative to the scenario.
	pub export: Option<String>,
	/// Initial map placement.
	pub map: MapConfig,
	#[serde(default)]
	pub octree: OctreeConfig,
	#[serde(default)]
	pub grid: GridConfig,
	/// Events and queries, applied in order.
	#[serde(default)]
	pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
	#[default]
	Octree,
	Grid,
}

/// Initial map placement.
#[derive(Debug, Deserialize)]
pub struct MapConfig {
	pub center: DVec3,
	/// Octree root edge length; the grid covers the inscribed sphere.
	pub size: f64,
	/// Root label for the octree. The grid always starts OPEN inside its
	/// sphere and UNKNOWN outside.
	#[serde(default)]
	pub initial: Label,
}

/// One scenario event or query.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
	Obstacle { bounds: Aabb },
	Remove { bounds: Aabb },
	Forget { bounds: Aabb },
	/// Range sensor sweep revealing UNKNOWN space.
	Sweep { center: DVec3, radius: f64 },
	Expand { bounds: Aabb },
	FindPath { from: DVec3, to: DVec3 },
	Explore {
		from: DVec3,
		/// Stop early near this point.
		target: Option<DVec3>,
	},
}

impl Scenario {
	/// Load a scenario from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> Result<Self> {
		let scenario: Scenario =
			toml::from_str(content).with_context(|| "Failed to parse scenario TOML")?;

		if !scenario.map.size.is_finite() || scenario.map.size <= 0.0 {
			anyhow::bail!("map.size must be positive, got {}", scenario.map.size);
		}
		if scenario.map.initial == Label::Mixed {
			anyhow::bail!("map.initial must be open, blocked or unknown");
		}
		for (i, step) in scenario.steps.iter().enumerate() {
			if let Some(bounds) = step.bounds() {
				Aabb::try_new(bounds.min, bounds.max).with_context(|| format!("step {i}"))?;
			}
		}

		Ok(scenario)
	}
}

impl Step {
	/// Box carried by map events.
	pub fn bounds(&self) -> Option<&Aabb> {
		match self {
			Step::Obstacle { bounds }
			| Step::Remove { bounds }
			| Step::Forget { bounds }
			| Step::Expand { bounds } => Some(bounds),
			_ => None,
		}
	}
}
