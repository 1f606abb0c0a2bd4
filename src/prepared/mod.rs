//! The prepared scene: the compact, immutable form a source scene is
//! pressed into before rendering. Everything the hot path touches lives
//! here in flat arrays indexed by tokens.

mod light;
mod scene;
mod sphere;
mod triangle;

pub use light::{LightDistribution, LightSample, PreparedLight};
pub use scene::{PreparedScene, SceneStats};
pub use sphere::PreparedSphere;
pub use triangle::PreparedTriangle;

use glam::{Vec2, Vec3};

use crate::accel::Token;
use crate::material::Material;

/// Borrowed views of the primitive arrays, for code that resolves
/// tokens without holding the whole scene.
#[derive(Clone, Copy)]
pub struct GeometryView<'a> {
    pub triangles: &'a [PreparedTriangle],
    pub spheres: &'a [PreparedSphere],
}

/// The packet produced at a ray hit.
///
/// `outgoing` points away from the surface, back along the ray. The
/// shading normal has normal mapping applied; the geometric normal is
/// the true surface orientation and is what transmission checks use.
pub struct Interaction<'a> {
    pub point: Vec3,
    /// Geometric normal.
    pub normal: Vec3,
    /// Interpolated and normal-mapped normal.
    pub shading_normal: Vec3,
    pub outgoing: Vec3,
    pub texcoord: Vec2,
    pub material_index: u32,
    pub material: &'a dyn Material,
    pub token: Token,
}
