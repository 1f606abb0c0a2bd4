use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use super::{BxdfSample, FunctionType};
use crate::math::{abs_cos_theta, same_hemisphere};
use crate::sampling::warp;

/// Ideal diffuse reflection.
#[derive(Debug, Clone, Copy)]
pub struct Lambert {
    pub albedo: Vec3,
}

impl Lambert {
    #[must_use]
    pub fn evaluate(&self, outgoing: Vec3, incident: Vec3) -> Vec3 {
        if same_hemisphere(outgoing, incident) {
            self.albedo / PI
        } else {
            Vec3::ZERO
        }
    }

    #[must_use]
    pub fn pdf(&self, outgoing: Vec3, incident: Vec3) -> f32 {
        if same_hemisphere(outgoing, incident) {
            warp::cosine_hemisphere_pdf(abs_cos_theta(incident))
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn sample(&self, u: Vec2, outgoing: Vec3) -> BxdfSample {
        let mut incident = warp::square_to_cosine_hemisphere(u);
        if outgoing.z < 0.0 {
            incident.z = -incident.z;
        }
        let pdf = warp::cosine_hemisphere_pdf(abs_cos_theta(incident));
        if pdf == 0.0 {
            return BxdfSample::IMPOSSIBLE;
        }
        BxdfSample {
            value: self.albedo / PI,
            incident,
            pdf,
            function: FunctionType::REFLECTIVE | FunctionType::DIFFUSE,
        }
    }
}
