//! Math kernel: rays, bounding boxes, orthonormal frames and the small
//! floating-point helpers the shading code leans on.
//!
//! Shading-space conventions follow the usual local frame where the
//! surface normal is +Z: `cos_theta` of a unit direction is simply its
//! z component.

pub(crate) mod aabb;
mod frame;
mod ray;

pub use aabb::Aabb;
pub use frame::Frame;
pub use ray::Ray;

use glam::Vec3;

/// Self-intersection guard applied when spawning continuation rays.
pub const RAY_EPSILON: f32 = 5e-4;

/// Squares a value.
#[inline]
#[must_use]
pub fn sqr(x: f32) -> f32 {
    x * x
}

/// Square root clamped against slightly-negative arguments produced by
/// floating-point cancellation.
#[inline]
#[must_use]
pub fn safe_sqrt(x: f32) -> f32 {
    x.max(0.0).sqrt()
}

/// Rec. 709 luminance of a linear RGB color.
#[inline]
#[must_use]
pub fn luminance(color: Vec3) -> f32 {
    color.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

/// Power heuristic with beta = 2 for combining two sampling strategies.
#[inline]
#[must_use]
pub fn power_heuristic(nf: f32, f_pdf: f32, ng: f32, g_pdf: f32) -> f32 {
    let f = nf * f_pdf;
    let g = ng * g_pdf;
    if f == 0.0 && g == 0.0 {
        return 0.0;
    }
    (f * f) / (f * f + g * g)
}

// Local-frame trigonometry. Directions are unit vectors expressed in a
// frame whose +Z axis is the shading normal.

#[inline]
#[must_use]
pub fn cos_theta(w: Vec3) -> f32 {
    w.z
}

#[inline]
#[must_use]
pub fn cos2_theta(w: Vec3) -> f32 {
    w.z * w.z
}

#[inline]
#[must_use]
pub fn abs_cos_theta(w: Vec3) -> f32 {
    w.z.abs()
}

#[inline]
#[must_use]
pub fn sin2_theta(w: Vec3) -> f32 {
    (1.0 - cos2_theta(w)).max(0.0)
}

#[inline]
#[must_use]
pub fn sin_theta(w: Vec3) -> f32 {
    sin2_theta(w).sqrt()
}

#[inline]
#[must_use]
pub fn tan2_theta(w: Vec3) -> f32 {
    sin2_theta(w) / cos2_theta(w)
}

/// Whether two local directions lie on the same side of the surface.
#[inline]
#[must_use]
pub fn same_hemisphere(a: Vec3, b: Vec3) -> bool {
    a.z * b.z > 0.0
}

/// Mirror reflection of a local direction across the +Z axis.
#[inline]
#[must_use]
pub fn reflect_z(w: Vec3) -> Vec3 {
    Vec3::new(-w.x, -w.y, w.z)
}

/// Reflection of `w` about an arbitrary unit vector `n`.
#[inline]
#[must_use]
pub fn reflect(w: Vec3, n: Vec3) -> Vec3 {
    2.0 * w.dot(n) * n - w
}

/// Refraction of local direction `w` through a surface with relative
/// index of refraction `eta` (incident over transmitted). Returns `None`
/// on total internal reflection.
#[must_use]
pub fn refract(w: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = w.dot(n);
    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(-w * eta + (eta * cos_i - cos_t) * n)
}
