use glam::{Vec3, Vec3A};

use super::Ray;

/// Multiplier applied to the far slab distance so that rays grazing a
/// box edge register as hits instead of misses. Traversal stays
/// conservative: a false hit costs one extra descent, a false miss
/// loses geometry.
pub const FAR_MULTIPLIER: f32 = 1.000_000_24;

/// An axis-aligned bounding box.
///
/// Stored as two [`Vec3A`] so the slab test runs on 128-bit lanes; the
/// fourth lane is padding. Invariant: `max >= min` componentwise for
/// any box that contains something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3A,
    pub max: Vec3A,
}

impl Aabb {
    /// The empty box: encapsulating anything into it yields that thing.
    pub const EMPTY: Self = Self {
        min: Vec3A::INFINITY,
        max: Vec3A::NEG_INFINITY,
    };

    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: Vec3A::from(min),
            max: Vec3A::from(max),
        }
    }

    /// A degenerate box containing a single point.
    #[must_use]
    pub fn point(p: Vec3) -> Self {
        let p = Vec3A::from(p);
        Self { min: p, max: p }
    }

    /// Slab intersection. Returns the nearest non-negative parametric
    /// distance at which the ray enters the box, or `f32::INFINITY` on a
    /// miss. An origin inside the box reports distance zero.
    #[inline]
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> f32 {
        let t0 = (self.min - ray.origin) * ray.recip;
        let t1 = (self.max - ray.origin) * ray.recip;
        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element() * FAR_MULTIPLIER;
        if near <= far && far >= 0.0 {
            near.max(0.0)
        } else {
            f32::INFINITY
        }
    }

    /// Grows the box to contain a point.
    #[inline]
    pub fn encapsulate(&mut self, point: Vec3) {
        let p = Vec3A::from(point);
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grows the box to contain another box.
    #[inline]
    pub fn encapsulate_box(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// The union of two boxes.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        Vec3::from((self.min + self.max) * 0.5)
    }

    #[inline]
    #[must_use]
    pub fn extent(&self) -> Vec3 {
        Vec3::from(self.max - self.min)
    }

    /// Half the surface area. Relative SAH costs only ever compare
    /// areas, so the factor of two is dropped throughout.
    #[inline]
    #[must_use]
    pub fn half_area(&self) -> f32 {
        let d = (self.max - self.min).max(Vec3A::ZERO);
        d.x * d.y + d.y * d.z + d.z * d.x
    }

    /// Index of the axis with the largest extent (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub fn major_axis(&self) -> usize {
        let d = self.extent();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let p = Vec3A::from(point);
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Whether every min component is at most its max counterpart.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }
}
