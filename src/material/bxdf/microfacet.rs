use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use super::{BxdfSample, DielectricFresnel, FunctionType};
use crate::math::{
    abs_cos_theta, cos_theta, cos2_theta, reflect, refract, same_hemisphere, sqr, tan2_theta,
};

/// The Trowbridge–Reitz (GGX) microfacet distribution, isotropic form.
#[derive(Debug, Clone, Copy)]
pub struct TrowbridgeReitz {
    pub alpha: f32,
}

impl TrowbridgeReitz {
    /// Maps a perceptual roughness in `[0, 1]` onto the distribution
    /// width. The floor keeps the distribution sampleable; true mirrors
    /// belong to the specular lobes.
    #[must_use]
    pub fn from_roughness(roughness: f32) -> Self {
        Self {
            alpha: sqr(roughness.clamp(0.0, 1.0)).max(1e-4),
        }
    }

    /// Differential area of microfacets aligned with the half vector.
    #[must_use]
    pub fn d(&self, h: Vec3) -> f32 {
        let cos2 = cos2_theta(h);
        let denom = cos2 * (self.alpha * self.alpha - 1.0) + 1.0;
        self.alpha * self.alpha / (PI * denom * denom)
    }

    /// Smith's shadowing auxiliary function.
    fn lambda(&self, w: Vec3) -> f32 {
        let tan2 = tan2_theta(w);
        if !tan2.is_finite() {
            return 0.0;
        }
        ((1.0 + self.alpha * self.alpha * tan2).sqrt() - 1.0) * 0.5
    }

    #[must_use]
    pub fn g1(&self, w: Vec3) -> f32 {
        1.0 / (1.0 + self.lambda(w))
    }

    /// Joint masking-shadowing for an outgoing/incident pair.
    #[must_use]
    pub fn g(&self, outgoing: Vec3, incident: Vec3) -> f32 {
        1.0 / (1.0 + self.lambda(outgoing) + self.lambda(incident))
    }

    /// Samples a half vector in the upper hemisphere, distributed
    /// according to `d(h) |cos h|`.
    #[must_use]
    pub fn sample_h(&self, u: Vec2) -> Vec3 {
        let tan2 = self.alpha * self.alpha * u.x / (1.0 - u.x).max(1e-7);
        let cos = (1.0 / (1.0 + tan2)).sqrt();
        let sin = (1.0 - cos * cos).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;
        Vec3::new(sin * phi.cos(), sin * phi.sin(), cos)
    }

    /// Density of [`Self::sample_h`] over solid angle.
    #[must_use]
    pub fn pdf_h(&self, h: Vec3) -> f32 {
        self.d(h) * abs_cos_theta(h)
    }
}

/// Glossy reflection from a rough dielectric boundary.
#[derive(Debug, Clone, Copy)]
pub struct GlossyReflection {
    pub albedo: Vec3,
    pub distribution: TrowbridgeReitz,
    pub fresnel: DielectricFresnel,
}

impl GlossyReflection {
    #[must_use]
    pub fn evaluate(&self, outgoing: Vec3, incident: Vec3) -> Vec3 {
        if !same_hemisphere(outgoing, incident) {
            return Vec3::ZERO;
        }
        let cos_o = abs_cos_theta(outgoing);
        let cos_i = abs_cos_theta(incident);
        let h = outgoing + incident;
        if cos_o == 0.0 || cos_i == 0.0 || h == Vec3::ZERO {
            return Vec3::ZERO;
        }
        let h = h.normalize();
        // Orient the half vector into the upper hemisphere for the
        // distribution lookup.
        let h = if h.z < 0.0 { -h } else { h };
        let (fresnel, _) = self.fresnel.evaluate(outgoing.dot(h));
        self.albedo * self.distribution.d(h) * self.distribution.g(outgoing, incident) * fresnel
            / (4.0 * cos_o * cos_i)
    }

    #[must_use]
    pub fn pdf(&self, outgoing: Vec3, incident: Vec3) -> f32 {
        if !same_hemisphere(outgoing, incident) {
            return 0.0;
        }
        let h = (outgoing + incident).normalize_or_zero();
        if h == Vec3::ZERO {
            return 0.0;
        }
        let h = if h.z < 0.0 { -h } else { h };
        // Change of variables from half vector to incident direction.
        self.distribution.pdf_h(h) / (4.0 * outgoing.dot(h).abs().max(1e-7))
    }

    #[must_use]
    pub fn sample(&self, u: Vec2, outgoing: Vec3) -> BxdfSample {
        if outgoing.z == 0.0 {
            return BxdfSample::IMPOSSIBLE;
        }
        let mut h = self.distribution.sample_h(u);
        if outgoing.z < 0.0 {
            h = -h;
        }
        let incident = reflect(outgoing, h);
        if !same_hemisphere(outgoing, incident) {
            return BxdfSample::IMPOSSIBLE;
        }
        let pdf = self.pdf(outgoing, incident);
        if pdf == 0.0 {
            return BxdfSample::IMPOSSIBLE;
        }
        BxdfSample {
            value: self.evaluate(outgoing, incident),
            incident,
            pdf,
            function: FunctionType::REFLECTIVE | FunctionType::GLOSSY,
        }
    }
}

/// Glossy transmission through a rough dielectric boundary.
#[derive(Debug, Clone, Copy)]
pub struct GlossyTransmission {
    pub albedo: Vec3,
    pub distribution: TrowbridgeReitz,
    pub eta_outside: f32,
    pub eta_inside: f32,
}

impl GlossyTransmission {
    fn eta_ratio(&self, outgoing: Vec3) -> f32 {
        // Transmitted over incident side, following the refraction
        // half-vector convention.
        if cos_theta(outgoing) > 0.0 {
            self.eta_inside / self.eta_outside
        } else {
            self.eta_outside / self.eta_inside
        }
    }

    /// The refraction half vector `normalize(o + i·η)`, oriented up.
    fn half_vector(&self, outgoing: Vec3, incident: Vec3) -> Option<Vec3> {
        let eta = self.eta_ratio(outgoing);
        let h = (outgoing + incident * eta).normalize_or_zero();
        if h == Vec3::ZERO {
            return None;
        }
        Some(if h.z < 0.0 { -h } else { h })
    }

    #[must_use]
    pub fn evaluate(&self, outgoing: Vec3, incident: Vec3) -> Vec3 {
        if same_hemisphere(outgoing, incident) {
            return Vec3::ZERO;
        }
        let cos_o = cos_theta(outgoing);
        let cos_i = cos_theta(incident);
        if cos_o == 0.0 || cos_i == 0.0 {
            return Vec3::ZERO;
        }
        let eta = self.eta_ratio(outgoing);
        let Some(h) = self.half_vector(outgoing, incident) else {
            return Vec3::ZERO;
        };
        let dot_o = outgoing.dot(h);
        let dot_i = incident.dot(h);
        // Both directions on the same side of the microfacet would be
        // reflection, not transmission.
        if dot_o * dot_i > 0.0 {
            return Vec3::ZERO;
        }
        let fresnel = DielectricFresnel::new(self.eta_outside, self.eta_inside);
        let (reflectance, _) = fresnel.evaluate(dot_o);
        let denom = sqr(dot_o + eta * dot_i);
        if denom == 0.0 {
            return Vec3::ZERO;
        }
        let factor =
            self.distribution.d(h) * self.distribution.g(outgoing, incident) * eta * eta
                * dot_i.abs()
                * dot_o.abs()
                / (cos_i * cos_o * denom);
        // Radiance compression through the interface.
        self.albedo * (1.0 - reflectance) * factor.abs() / sqr(eta)
    }

    #[must_use]
    pub fn pdf(&self, outgoing: Vec3, incident: Vec3) -> f32 {
        if same_hemisphere(outgoing, incident) {
            return 0.0;
        }
        let eta = self.eta_ratio(outgoing);
        let Some(h) = self.half_vector(outgoing, incident) else {
            return 0.0;
        };
        let dot_o = outgoing.dot(h);
        let dot_i = incident.dot(h);
        if dot_o * dot_i > 0.0 {
            return 0.0;
        }
        let denom = sqr(dot_o + eta * dot_i);
        if denom == 0.0 {
            return 0.0;
        }
        let dh_di = (eta * eta * dot_i / denom).abs();
        self.distribution.pdf_h(h) * dh_di
    }

    #[must_use]
    pub fn sample(&self, u: Vec2, outgoing: Vec3) -> BxdfSample {
        if outgoing.z == 0.0 {
            return BxdfSample::IMPOSSIBLE;
        }
        let mut h = self.distribution.sample_h(u);
        if outgoing.dot(h) < 0.0 {
            h = -h;
        }
        let entering = cos_theta(outgoing) > 0.0;
        let (eta_i, eta_t) = if entering {
            (self.eta_outside, self.eta_inside)
        } else {
            (self.eta_inside, self.eta_outside)
        };
        let Some(incident) = refract(outgoing, h, eta_i / eta_t) else {
            return BxdfSample::IMPOSSIBLE;
        };
        if same_hemisphere(outgoing, incident) {
            return BxdfSample::IMPOSSIBLE;
        }
        let pdf = self.pdf(outgoing, incident);
        if pdf == 0.0 {
            return BxdfSample::IMPOSSIBLE;
        }
        BxdfSample {
            value: self.evaluate(outgoing, incident),
            incident,
            pdf,
            function: FunctionType::TRANSMISSIVE | FunctionType::GLOSSY,
        }
    }
}
