//! Offline scenario runner for voxel_nav.
//!
//! Loads a TOML scenario, builds an octree or voxel grid, replays its
//! obstacle events, sensor sweeps and queries, then prints a summary and
//! optionally writes the `x y z size label` debug export.
//!
//! Set `RUST_LOG=voxel_nav=debug` to see per-search events.

mod config;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use voxel_nav::{write_export, Label, MapMetrics, Octree, SearchEngine, VoxelGrid};

use config::{Backend, Scenario};
use runner::{ProbeMap, QueryReport};

/// Offline scenario runner for voxel_nav occupancy maps.
#[derive(Parser, Debug)]
#[command(name = "nav_probe")]
#[command(about = "Replays an obstacle/query scenario against an occupancy map")]
struct Args {
	/// Path to scenario TOML file.
	#[arg(short, long)]
	scenario: PathBuf,

	/// Override the scenario's backend.
	#[arg(short, long, value_parser = parse_backend)]
	backend: Option<Backend>,

	/// Override the scenario's export path (relative to the working directory).
	#[arg(short, long)]
	export: Option<PathBuf>,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
	match s {
		"octree" => Ok(Backend::Octree),
		"grid" => Ok(Backend::Grid),
		other => Err(format!("unknown backend {other:?}, expected octree or grid")),
	}
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = Args::parse();
	println!("Loading scenario from: {}", args.scenario.display());
	let scenario = Scenario::load(&args.scenario)?;

	let backend = args.backend.unwrap_or(scenario.backend);
	let export = args.export.or_else(|| {
		scenario.export.as_ref().map(|p| {
			args.scenario
				.parent()
				.unwrap_or(Path::new("."))
				.join(p)
		})
	});
	let engine = SearchEngine::new(scenario.mode);
	let mut metrics = MapMetrics::new();

	println!(
		"Running {} steps on {:?} backend ({:?} search)",
		scenario.steps.len(),
		backend,
		scenario.mode
	);

	let reports = match backend {
		Backend::Octree => {
			let mut tree = Octree::new(
				scenario.map.center,
				scenario.map.size,
				scenario.map.initial,
				scenario.octree.clone(),
			)
			.context("Failed to build octree")?;
			execute(&mut tree, &scenario, engine, &mut metrics, export.as_deref())?
		}
		Backend::Grid => {
			let mut grid = VoxelGrid::new(scenario.map.center, scenario.map.size * 0.5, scenario.grid.clone())
				.context("Failed to build voxel grid")?;
			execute(&mut grid, &scenario, engine, &mut metrics, export.as_deref())?
		}
	};

	println!("\nQueries:");
	for r in &reports {
		match r.end {
			Some(end) => println!(
				"  step {:>3}: {} nodes, cost {:.3}, ends at {}",
				r.step, r.nodes, r.cost, end
			),
			None => println!("  step {:>3}: not found", r.step),
		}
	}

	println!("\nMap:");
	println!(
		"  open {} / blocked {} / unknown {} cells",
		metrics.cells(Label::Open),
		metrics.cells(Label::Blocked),
		metrics.cells(Label::Unknown)
	);
	if metrics.node_count > 0 {
		println!("  {} octree nodes", metrics.node_count);
	}
	println!("  ~{:.2} MB", metrics.map_memory_mb());
	if metrics.total_searches > 0 {
		println!(
			"  {} searches, {} failed, avg {:.0} us / {:.0} expanded",
			metrics.total_searches,
			metrics.failed_searches,
			metrics.avg_search_timing_us(),
			metrics.avg_expanded()
		);
	}

	Ok(())
}

fn execute<M: ProbeMap>(
	map: &mut M,
	scenario: &Scenario,
	engine: SearchEngine,
	metrics: &mut MapMetrics,
	export: Option<&Path>,
) -> Result<Vec<QueryReport>> {
	let reports = runner::run(map, &scenario.steps, engine, metrics)?;

	if let Some(path) = export {
		if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
			std::fs::create_dir_all(dir)
				.with_context(|| format!("Failed to create export dir: {}", dir.display()))?;
		}
		let file = File::create(path)
			.with_context(|| format!("Failed to create export file: {}", path.display()))?;
		let lines = write_export(&*map, BufWriter::new(file))
			.with_context(|| format!("Failed to write: {}", path.display()))?;
		println!("Exported {} cells to: {}", lines, path.display());
	}

	Ok(reports)
}
