//! Dense voxel grid occupancy map.
//!
//! A fixed-resolution alternative to the octree: more memory, trivial
//! neighbour lookup, and mutations whose cost is proportional to the
//! covered volume.
//!
//! - [`config`]: `GridConfig` - voxel size, lattice origin, margin
//! - [`voxel_grid`]: `VoxelGrid`, `GridExtent`

pub mod config;
pub mod voxel_grid;

pub use config::GridConfig;
pub use voxel_grid::{GridExtent, VoxelGrid};
