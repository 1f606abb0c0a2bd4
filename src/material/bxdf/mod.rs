//! Individual scattering lobes.
//!
//! Every lobe works in a local frame whose +Z axis is the shading
//! normal; incident and outgoing directions both point away from the
//! surface. Values are BRDF/BTDF quantities without the cosine factor.

mod fresnel;
mod lambert;
mod microfacet;
mod specular;

pub use fresnel::DielectricFresnel;
pub use lambert::Lambert;
pub use microfacet::{GlossyReflection, GlossyTransmission, TrowbridgeReitz};
pub use specular::{SpecularReflection, SpecularTransmission};

use bitflags::bitflags;
use glam::{Vec2, Vec3};

use crate::math::abs_cos_theta;
use crate::sampling::{warp, Sampler};

bitflags! {
    /// Orthogonal classification axes of a lobe: transport direction
    /// and sharpness.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FunctionType: u8 {
        const REFLECTIVE = 1 << 0;
        const TRANSMISSIVE = 1 << 1;
        const DIFFUSE = 1 << 2;
        const GLOSSY = 1 << 3;
        const SPECULAR = 1 << 4;
    }
}

/// One draw from a lobe.
#[derive(Debug, Clone, Copy)]
pub struct BxdfSample {
    pub value: Vec3,
    /// Local-frame incident direction.
    pub incident: Vec3,
    pub pdf: f32,
    pub function: FunctionType,
}

impl BxdfSample {
    /// The impossible sample: pdf zero, no energy. Total internal
    /// reflection and sampling dead ends flow through this rather than
    /// an error.
    pub const IMPOSSIBLE: Self = Self {
        value: Vec3::ZERO,
        incident: Vec3::Z,
        pdf: 0.0,
        function: FunctionType::empty(),
    };

    #[inline]
    #[must_use]
    pub fn is_impossible(&self) -> bool {
        self.pdf == 0.0
    }
}

/// A scattering lobe. Dispatch is a tag match; every variant is plain
/// stack data so whole lobes live in the per-hit arena.
#[derive(Debug, Clone, Copy)]
pub enum Lobe {
    Lambert(Lambert),
    SpecularReflection(SpecularReflection),
    SpecularTransmission(SpecularTransmission),
    GlossyReflection(GlossyReflection),
    GlossyTransmission(GlossyTransmission),
}

impl Lobe {
    #[must_use]
    pub fn function_type(&self) -> FunctionType {
        match self {
            Lobe::Lambert(_) => FunctionType::REFLECTIVE | FunctionType::DIFFUSE,
            Lobe::SpecularReflection(_) => FunctionType::REFLECTIVE | FunctionType::SPECULAR,
            Lobe::SpecularTransmission(_) => FunctionType::TRANSMISSIVE | FunctionType::SPECULAR,
            Lobe::GlossyReflection(_) => FunctionType::REFLECTIVE | FunctionType::GLOSSY,
            Lobe::GlossyTransmission(_) => FunctionType::TRANSMISSIVE | FunctionType::GLOSSY,
        }
    }

    /// Whether this lobe's classification is contained in a query mask.
    #[inline]
    #[must_use]
    pub fn matches(&self, mask: FunctionType) -> bool {
        mask.contains(self.function_type())
    }

    #[must_use]
    pub fn evaluate(&self, outgoing: Vec3, incident: Vec3) -> Vec3 {
        match self {
            Lobe::Lambert(lobe) => lobe.evaluate(outgoing, incident),
            // Dirac lobes have zero measure under direct evaluation.
            Lobe::SpecularReflection(_) | Lobe::SpecularTransmission(_) => Vec3::ZERO,
            Lobe::GlossyReflection(lobe) => lobe.evaluate(outgoing, incident),
            Lobe::GlossyTransmission(lobe) => lobe.evaluate(outgoing, incident),
        }
    }

    #[must_use]
    pub fn pdf(&self, outgoing: Vec3, incident: Vec3) -> f32 {
        match self {
            Lobe::Lambert(lobe) => lobe.pdf(outgoing, incident),
            Lobe::SpecularReflection(_) | Lobe::SpecularTransmission(_) => 0.0,
            Lobe::GlossyReflection(lobe) => lobe.pdf(outgoing, incident),
            Lobe::GlossyTransmission(lobe) => lobe.pdf(outgoing, incident),
        }
    }

    #[must_use]
    pub fn sample(&self, u: Vec2, outgoing: Vec3) -> BxdfSample {
        let sample = match self {
            Lobe::Lambert(lobe) => lobe.sample(u, outgoing),
            Lobe::SpecularReflection(lobe) => lobe.sample(outgoing),
            Lobe::SpecularTransmission(lobe) => lobe.sample(outgoing),
            Lobe::GlossyReflection(lobe) => lobe.sample(u, outgoing),
            Lobe::GlossyTransmission(lobe) => lobe.sample(u, outgoing),
        };
        debug_assert!(sample.pdf >= 0.0);
        sample
    }

    /// Monte Carlo estimate of directional-hemispherical reflectance
    /// for a fixed outgoing direction.
    #[must_use]
    pub fn reflectance(&self, outgoing: Vec3, sampler: &mut Sampler, samples: u32) -> Vec3 {
        let mut sum = Vec3::ZERO;
        for _ in 0..samples {
            let s = self.sample(sampler.next_2d(), outgoing);
            if !s.is_impossible() {
                sum += s.value * abs_cos_theta(s.incident) / s.pdf;
            }
        }
        sum / samples as f32
    }

    /// Monte Carlo estimate of hemispherical-hemispherical
    /// reflectance.
    #[must_use]
    pub fn hemispherical_reflectance(&self, sampler: &mut Sampler, samples: u32) -> Vec3 {
        let mut sum = Vec3::ZERO;
        for _ in 0..samples {
            let outgoing = warp::square_to_uniform_hemisphere(sampler.next_2d());
            let s = self.sample(sampler.next_2d(), outgoing);
            if !s.is_impossible() {
                sum += s.value * abs_cos_theta(s.incident) * abs_cos_theta(outgoing)
                    / (s.pdf * warp::uniform_hemisphere_pdf());
            }
        }
        sum / (std::f32::consts::PI * samples as f32)
    }
}
