use glam::Vec3;

use super::{BxdfSample, DielectricFresnel, FunctionType};
use crate::math::{abs_cos_theta, cos_theta, refract, reflect_z, sqr};

/// Perfect mirror reflection: a Dirac lobe with unit pdf.
#[derive(Debug, Clone, Copy)]
pub struct SpecularReflection {
    pub albedo: Vec3,
    /// `None` reflects everything, as a metal mirror does.
    pub fresnel: Option<DielectricFresnel>,
}

impl SpecularReflection {
    #[must_use]
    pub fn sample(&self, outgoing: Vec3) -> BxdfSample {
        let incident = reflect_z(outgoing);
        let cos_i = abs_cos_theta(incident);
        if cos_i == 0.0 {
            return BxdfSample::IMPOSSIBLE;
        }
        let reflectance = match &self.fresnel {
            Some(fresnel) => fresnel.evaluate(cos_theta(outgoing)).0,
            None => 1.0,
        };
        BxdfSample {
            value: self.albedo * reflectance / cos_i,
            incident,
            pdf: 1.0,
            function: FunctionType::REFLECTIVE | FunctionType::SPECULAR,
        }
    }
}

/// Perfect refraction through a dielectric interface.
///
/// Total internal reflection surfaces as the impossible sample; the
/// matching reflection lobe carries that energy instead.
#[derive(Debug, Clone, Copy)]
pub struct SpecularTransmission {
    pub albedo: Vec3,
    pub eta_outside: f32,
    pub eta_inside: f32,
}

impl SpecularTransmission {
    #[must_use]
    pub fn sample(&self, outgoing: Vec3) -> BxdfSample {
        let entering = cos_theta(outgoing) > 0.0;
        let (eta_i, eta_t) = if entering {
            (self.eta_outside, self.eta_inside)
        } else {
            (self.eta_inside, self.eta_outside)
        };
        let normal = if entering { Vec3::Z } else { -Vec3::Z };

        let Some(incident) = refract(outgoing, normal, eta_i / eta_t) else {
            return BxdfSample::IMPOSSIBLE;
        };
        let cos_i = abs_cos_theta(incident);
        if cos_i == 0.0 {
            return BxdfSample::IMPOSSIBLE;
        }

        let fresnel = DielectricFresnel::new(self.eta_outside, self.eta_inside);
        let (reflectance, _) = fresnel.evaluate(cos_theta(outgoing));
        // Radiance compresses by the squared index ratio on the way
        // through the interface.
        let compression = sqr(eta_i / eta_t);
        BxdfSample {
            value: self.albedo * (1.0 - reflectance) * compression / cos_i,
            incident,
            pdf: 1.0,
            function: FunctionType::TRANSMISSIVE | FunctionType::SPECULAR,
        }
    }
}
