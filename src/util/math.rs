//! Math type re-exports and JT-specific math utilities.
//!
//! This module re-exports types from `glam` and provides additional
//! types specific to JT (bounding boxes, count ranges).

// Re-export glam types used across the crate
pub use glam::{Mat4, Vec3};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// All-zero box, the wire default for nodes without geometry.
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from a single point.
    #[inline]
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Collapse the inverted empty state to the wire default.
    #[inline]
    pub fn or_zero(self) -> Self {
        if self.is_empty() {
            Self::ZERO
        } else {
            self
        }
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

/// Min/max statistic carried by partitions and shape nodes.
#[derive(Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct CountRange {
    pub min: i32,
    pub max: i32,
}

impl CountRange {
    /// A range collapsed to a single exact count.
    #[inline]
    pub const fn exact(count: i32) -> Self {
        Self { min: count, max: count }
    }

    #[inline]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Componentwise sum, used when aggregating child statistics.
    #[inline]
    pub fn accumulate(&mut self, other: Self) {
        self.min += other.min;
        self.max += other.max;
    }
}

impl fmt::Debug for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountRange({}..{})", self.min, self.max)
    }
}

/// Triangle surface area from its corner points (Heron's formula).
///
/// Computed in double precision; callers accumulate the result and cast
/// once at the end.
pub fn triangle_area(p0: Vec3, p1: Vec3, p2: Vec3) -> f64 {
    let (p0, p1, p2) = (p0.as_dvec3(), p1.as_dvec3(), p2.as_dvec3());
    let a = p0.distance(p1);
    let b = p1.distance(p2);
    let c = p2.distance(p0);
    let s = (a + b + c) * 0.5;
    let sq = s * (s - a) * (s - b) * (s - c);
    if sq > 0.0 {
        sq.sqrt()
    } else {
        0.0
    }
}
