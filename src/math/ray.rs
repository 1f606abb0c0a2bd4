use glam::{Vec3, Vec3A};

use super::RAY_EPSILON;

/// A ray with precomputed reciprocal directions.
///
/// Fields use [`Vec3A`] so each lane loads as a single 128-bit register;
/// the fourth lane is padding. Reciprocals are clamped to finite values
/// so slab tests never multiply zero by infinity.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3A,
    /// Unit-length travel direction.
    pub direction: Vec3A,
    /// Componentwise `1 / direction`, clamped to ±`f32::MAX`.
    pub recip: Vec3A,
    /// Componentwise `|1 / direction|`, clamped to `f32::MAX`.
    pub abs_recip: Vec3A,
}

impl Ray {
    /// Creates a ray from an origin and a unit direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        debug_assert!(
            (direction.length_squared() - 1.0).abs() < 1e-3,
            "ray direction must be unit length, got {direction:?}"
        );
        let direction = Vec3A::from(direction);
        let recip = direction
            .recip()
            .clamp(Vec3A::splat(f32::MIN), Vec3A::splat(f32::MAX));
        Self {
            origin: Vec3A::from(origin),
            direction,
            recip,
            abs_recip: recip.abs(),
        }
    }

    /// Creates a ray whose origin is shifted forward along the direction
    /// to step over the surface it was spawned from.
    #[must_use]
    pub fn forward(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin + direction * RAY_EPSILON, direction)
    }

    /// The point at parametric distance `t`.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        Vec3::from(self.origin + self.direction * t)
    }

    /// The travel direction as a plain [`Vec3`].
    #[inline]
    #[must_use]
    pub fn direction3(&self) -> Vec3 {
        Vec3::from(self.direction)
    }

    /// The origin as a plain [`Vec3`].
    #[inline]
    #[must_use]
    pub fn origin3(&self) -> Vec3 {
        Vec3::from(self.origin)
    }
}
