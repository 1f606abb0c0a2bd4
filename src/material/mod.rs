//! Materials: the shading policy attached to each surface.
//!
//! A material turns a surface interaction into a [`Bsdf`] by sampling
//! its textures and pushing lobes into the per-hit arena. Pressing a
//! scene hoists the per-material invariants (emissive? pass-through?)
//! into flags so the evaluators never query the trait on the hot path.

pub mod bxdf;
mod bsdf;
mod kinds;

pub use bsdf::{Bsdf, BsdfSample};
pub use kinds::{Emissive, Glass, Glossy, Matte, Mirror};

use std::collections::HashMap;
use std::sync::Arc;

use bumpalo::Bump;
use glam::{Vec2, Vec3, Vec4};

use crate::math::Frame;
use crate::prepared::Interaction;
use crate::resources::Texture;

/// The shading policy of a surface.
pub trait Material: Send + Sync {
    /// Builds the BSDF for a hit, allocating lobes from the arena.
    fn scatter<'a>(&self, interaction: &Interaction<'_>, arena: &'a Bump) -> Bsdf<'a>;

    /// Surface color at a texture coordinate, for the albedo probe.
    fn albedo(&self, texcoord: Vec2) -> Vec4;

    /// Emitted radiance at a texture coordinate.
    fn emission(&self, _texcoord: Vec2) -> Vec3 {
        Vec3::ZERO
    }

    /// Whether any texel of the emission input carries energy.
    fn is_emissive(&self) -> bool {
        false
    }

    /// Pass-through surfaces are skipped by the albedo probe; the
    /// camera effectively sees what lies behind them.
    fn is_pass_through(&self) -> bool {
        false
    }

    /// Perturbs a shading normal by the material's normal map. The
    /// default is the identity.
    fn apply_normal_mapping(&self, _texcoord: Vec2, normal: Vec3) -> Vec3 {
        normal
    }
}

/// A tangent-space normal map with per-channel intensity.
#[derive(Debug, Clone)]
pub struct NormalMap {
    pub texture: Arc<Texture>,
    pub intensity: Vec3,
}

impl NormalMap {
    #[must_use]
    pub fn new(texture: Arc<Texture>) -> Self {
        Self {
            texture,
            intensity: Vec3::ONE,
        }
    }

    /// Applies the map to a world-space shading normal.
    #[must_use]
    pub fn apply(&self, texcoord: Vec2, normal: Vec3) -> Vec3 {
        let texel = self.texture.sample_2d(texcoord).truncate();
        let tangent = (texel * 2.0 - Vec3::ONE) * self.intensity;
        let frame = Frame::from_normal(normal);
        frame.to_world(tangent).normalize_or(normal)
    }
}

/// Assigns monotonically-increasing indices to distinct materials
/// during pressing. Identity is by allocation, not by value: two
/// `Arc`s to the same material share an index.
pub struct MaterialRegistry {
    materials: Vec<Arc<dyn Material>>,
    indices: HashMap<usize, u32>,
}

impl MaterialRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
            indices: HashMap::new(),
        }
    }

    /// Registers a material and returns its index.
    pub fn register(&mut self, material: &Arc<dyn Material>) -> u32 {
        let key = Arc::as_ptr(material).cast::<()>() as usize;
        *self.indices.entry(key).or_insert_with(|| {
            let index = self.materials.len() as u32;
            self.materials.push(Arc::clone(material));
            index
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Finishes registration, pressing each material's invariants.
    #[must_use]
    pub fn press(self) -> Vec<PressedMaterial> {
        self.materials.into_iter().map(PressedMaterial::press).collect()
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A material with its invariants hoisted out of the trait.
pub struct PressedMaterial {
    pub material: Arc<dyn Material>,
    pub emissive: bool,
    pub pass_through: bool,
}

impl PressedMaterial {
    #[must_use]
    pub fn press(material: Arc<dyn Material>) -> Self {
        Self {
            emissive: material.is_emissive(),
            pass_through: material.is_pass_through(),
            material,
        }
    }
}
