use glam::Vec3A;

use crate::accel::Token;
use crate::math::{Aabb, Ray};
use crate::math::aabb::FAR_MULTIPLIER;

/// One BVH node, packed to half a cache line.
///
/// Interior nodes store [`Token::node`] pointing at their first child;
/// the sibling sits at the next index. Leaf nodes store the geometry
/// token directly.
#[derive(Debug, Clone, Copy)]
#[repr(C, align(32))]
pub struct BvhNode {
    min: [f32; 3],
    max: [f32; 3],
    pub token: Token,
    _pad: u32,
}

const _: () = assert!(std::mem::size_of::<BvhNode>() == 32);

impl BvhNode {
    #[must_use]
    pub fn new(bounds: &Aabb, token: Token) -> Self {
        Self {
            min: [bounds.min.x, bounds.min.y, bounds.min.z],
            max: [bounds.max.x, bounds.max.y, bounds.max.z],
            token,
            _pad: 0,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb {
            min: Vec3A::from_array(self.min),
            max: Vec3A::from_array(self.max),
        }
    }

    /// Slab test against the packed bounds; identical semantics to
    /// [`Aabb::intersect`].
    #[inline]
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> f32 {
        let t0 = (Vec3A::from_array(self.min) - ray.origin) * ray.recip;
        let t1 = (Vec3A::from_array(self.max) - ray.origin) * ray.recip;
        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element() * FAR_MULTIPLIER;
        if near <= far && far >= 0.0 {
            near.max(0.0)
        } else {
            f32::INFINITY
        }
    }
}
