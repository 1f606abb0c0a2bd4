use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::math::{Aabb, Ray};
use crate::sampling::warp;

/// An analytic sphere pressed for intersection.
#[derive(Debug, Clone, Copy)]
pub struct PreparedSphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: u32,
}

impl PreparedSphere {
    #[must_use]
    pub fn new(center: Vec3, radius: f32, material: u32) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// Nearest positive intersection. The surface coordinate is the
    /// polar parametrization scaled to `[0, 1)²` and doubles as the
    /// texture coordinate.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, Vec2)> {
        let oc = ray.origin3() - self.center;
        let b = oc.dot(ray.direction3());
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 || discriminant.is_nan() {
            return None;
        }
        let sq = discriminant.sqrt();
        let mut t = -b - sq;
        if t <= 0.0 {
            t = -b + sq;
        }
        if t <= 0.0 || !t.is_finite() {
            return None;
        }
        let normal = (ray.at(t) - self.center) / self.radius;
        Some((t, Self::polar(normal)))
    }

    fn polar(normal: Vec3) -> Vec2 {
        let phi = normal.x.atan2(-normal.z);
        let theta = normal.y.clamp(-1.0, 1.0).acos();
        Vec2::new(phi / TAU + 0.5, theta / PI)
    }

    #[inline]
    #[must_use]
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center) / self.radius
    }

    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.center - Vec3::splat(self.radius),
            self.center + Vec3::splat(self.radius),
        )
    }

    #[must_use]
    pub fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    /// Uniform point on the sphere surface with its outward normal.
    /// The area density is `1 / area()`.
    #[must_use]
    pub fn sample_point(&self, u: Vec2) -> (Vec3, Vec3) {
        let normal = warp::square_to_uniform_sphere(u);
        (self.center + normal * self.radius, normal)
    }
}
