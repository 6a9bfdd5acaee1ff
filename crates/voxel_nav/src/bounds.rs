//! Axis-aligned bounding box with double precision.
//!
//! Octree nodes always carry cubic bounds that halve exactly on
//! subdivision; obstacle boxes and grid extents may be rectangular.

use glam::DVec3;

use crate::error::NavError;

/// Double-precision axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive).
	pub max: DVec3,
}

impl Aabb {
	/// Create a new AABB from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: DVec3, max: DVec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Create an AABB, rejecting non-finite or non-positive extents.
	pub fn try_new(min: DVec3, max: DVec3) -> Result<Self, NavError> {
		let size = max - min;
		if !min.is_finite() || !max.is_finite() || size.min_element() <= 0.0 {
			return Err(NavError::DegenerateBounds {
				min: min.to_array(),
				max: max.to_array(),
			});
		}
		Ok(Self { min, max })
	}

	/// Create an AABB from its lower corner and per-axis size.
	pub fn from_min_size(min: DVec3, size: DVec3) -> Self {
		Self::new(min, min + size)
	}

	/// Create a cube from its lower corner and edge length.
	pub fn cube(min: DVec3, edge: f64) -> Self {
		Self::from_min_size(min, DVec3::splat(edge))
	}

	/// Create a new AABB from center and half-extents.
	pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
		Self {
			min: center - half_extents,
			max: center + half_extents,
		}
	}

	/// Check if this AABB shares positive volume with another.
	///
	/// Boxes that only touch along a face, edge or corner do not intersect.
	#[inline]
	pub fn intersects(&self, other: &Aabb) -> bool {
		self.min.x < other.max.x
			&& self.max.x > other.min.x
			&& self.min.y < other.max.y
			&& self.max.y > other.min.y
			&& self.min.z < other.max.z
			&& self.max.z > other.min.z
	}

	/// Check if this AABB touches or overlaps another.
	#[inline]
	pub fn touches(&self, other: &Aabb) -> bool {
		self.min.x <= other.max.x
			&& self.max.x >= other.min.x
			&& self.min.y <= other.max.y
			&& self.max.y >= other.min.y
			&& self.min.z <= other.max.z
			&& self.max.z >= other.min.z
	}

	/// Check if this AABB contains a point.
	#[inline]
	pub fn contains_point(&self, point: DVec3) -> bool {
		point.x >= self.min.x
			&& point.x <= self.max.x
			&& point.y >= self.min.y
			&& point.y <= self.max.y
			&& point.z >= self.min.z
			&& point.z <= self.max.z
	}

	/// Check if `other` lies entirely inside this AABB (boundaries included).
	#[inline]
	pub fn contains(&self, other: &Aabb) -> bool {
		self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
	}

	/// Get the size of the AABB (max - min).
	#[inline]
	pub fn size(&self) -> DVec3 {
		self.max - self.min
	}

	/// Edge length along X. Equal on all axes for octree bounds.
	#[inline]
	pub fn edge(&self) -> f64 {
		self.max.x - self.min.x
	}

	/// Get the center of the AABB.
	#[inline]
	pub fn center(&self) -> DVec3 {
		(self.min + self.max) * 0.5
	}

	/// Grow the box by `padding` on every side.
	#[inline]
	pub fn inflate(&self, padding: f64) -> Aabb {
		Aabb {
			min: self.min - DVec3::splat(padding),
			max: self.max + DVec3::splat(padding),
		}
	}

	/// Check if any part of the box lies strictly within `radius` of `center`.
	#[inline]
	pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
		let closest = center.clamp(self.min, self.max);
		closest.distance_squared(center) < radius * radius
	}

	/// Check if the whole box lies within `radius` of `center`.
	#[inline]
	pub fn within_sphere(&self, center: DVec3, radius: f64) -> bool {
		let far = DVec3::select(
			(center - self.min).cmpgt(self.max - center),
			self.min,
			self.max,
		);
		far.distance_squared(center) <= radius * radius
	}

	/// Child cube at `octant` (bit 0 = +X half, bit 1 = +Y, bit 2 = +Z).
	#[inline]
	pub fn octant(&self, octant: u8) -> Aabb {
		let half = self.size() * 0.5;
		let step = DVec3::new(
			(octant & 1) as f64,
			((octant >> 1) & 1) as f64,
			((octant >> 2) & 1) as f64,
		);
		Aabb::from_min_size(self.min + half * step, half)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new() {
		let aabb = Aabb::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
		assert_eq!(aabb.min, DVec3::new(-1.0, -2.0, -3.0));
		assert_eq!(aabb.max, DVec3::new(1.0, 2.0, 3.0));
	}

	#[test]
	fn test_try_new_rejects_degenerate() {
		assert!(Aabb::try_new(DVec3::ZERO, DVec3::ONE).is_ok());
		assert!(Aabb::try_new(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0)).is_err());
		assert!(Aabb::try_new(DVec3::ONE, DVec3::ZERO).is_err());
		assert!(Aabb::try_new(DVec3::ZERO, DVec3::splat(f64::INFINITY)).is_err());
	}

	#[test]
	fn test_intersects_requires_volume() {
		let a = Aabb::new(DVec3::ZERO, DVec3::splat(10.0));
		let b = Aabb::new(DVec3::splat(5.0), DVec3::splat(15.0));
		let touching = Aabb::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(20.0, 10.0, 10.0));

		assert!(a.intersects(&b));
		assert!(b.intersects(&a));
		assert!(!a.intersects(&touching));
		assert!(a.touches(&touching));
	}

	#[test]
	fn test_contains_box() {
		let outer = Aabb::new(DVec3::ZERO, DVec3::splat(10.0));
		let inner = Aabb::new(DVec3::splat(2.0), DVec3::splat(10.0));
		let poking = Aabb::new(DVec3::splat(2.0), DVec3::splat(11.0));

		assert!(outer.contains(&inner));
		assert!(outer.contains(&outer));
		assert!(!outer.contains(&poking));
	}

	#[test]
	fn test_contains_point() {
		let aabb = Aabb::new(DVec3::ZERO, DVec3::splat(10.0));

		assert!(aabb.contains_point(DVec3::splat(5.0)));
		assert!(aabb.contains_point(DVec3::ZERO));
		assert!(aabb.contains_point(DVec3::splat(10.0)));
		assert!(!aabb.contains_point(DVec3::splat(-1.0)));
	}

	#[test]
	fn test_size_and_center() {
		let aabb = Aabb::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
		assert_eq!(aabb.size(), DVec3::new(2.0, 4.0, 6.0));
		assert_eq!(aabb.center(), DVec3::ZERO);
	}

	#[test]
	fn test_inflate() {
		let aabb = Aabb::cube(DVec3::ZERO, 2.0).inflate(0.5);
		assert_eq!(aabb.min, DVec3::splat(-0.5));
		assert_eq!(aabb.max, DVec3::splat(2.5));
	}

	#[test]
	fn test_sphere_tests() {
		let aabb = Aabb::cube(DVec3::ZERO, 1.0);

		assert!(aabb.intersects_sphere(DVec3::new(-0.5, 0.5, 0.5), 1.0));
		assert!(!aabb.intersects_sphere(DVec3::new(-2.0, 0.5, 0.5), 1.0));
		assert!(aabb.within_sphere(DVec3::splat(0.5), 1.0));
		assert!(!aabb.within_sphere(DVec3::splat(0.5), 0.6));
	}

	/// Octant children tile the parent and halve the edge.
	#[test]
	fn test_octants_halve() {
		let parent = Aabb::cube(DVec3::new(-4.0, -4.0, -4.0), 8.0);

		let low = parent.octant(0);
		assert_eq!(low.min, parent.min);
		assert_eq!(low.edge(), 4.0);

		let high = parent.octant(7);
		assert_eq!(high.max, parent.max);

		let x_only = parent.octant(1);
		assert_eq!(x_only.min, DVec3::new(0.0, -4.0, -4.0));
	}
}
