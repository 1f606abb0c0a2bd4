use crate::math::sqr;

/// Real-valued Fresnel reflectance for a dielectric interface.
///
/// `eta_outside` is the index of refraction on the +Z side of the
/// local frame, `eta_inside` the other side. A negative cosine means
/// the direction lies inside the medium and the roles swap.
#[derive(Debug, Clone, Copy)]
pub struct DielectricFresnel {
    pub eta_outside: f32,
    pub eta_inside: f32,
}

impl DielectricFresnel {
    #[must_use]
    pub fn new(eta_outside: f32, eta_inside: f32) -> Self {
        Self {
            eta_outside,
            eta_inside,
        }
    }

    /// Unpolarized reflectance for a signed incident cosine. The flag
    /// reports total internal reflection, in which case the
    /// reflectance is one.
    #[must_use]
    pub fn evaluate(&self, cos_incident: f32) -> (f32, bool) {
        let mut cos_i = cos_incident.clamp(-1.0, 1.0);
        let (eta_i, eta_t) = if cos_i >= 0.0 {
            (self.eta_outside, self.eta_inside)
        } else {
            cos_i = -cos_i;
            (self.eta_inside, self.eta_outside)
        };

        // Snell's law, checking for total internal reflection.
        let sin2_t = sqr(eta_i / eta_t) * (1.0 - cos_i * cos_i);
        if sin2_t >= 1.0 {
            return (1.0, true);
        }
        let cos_t = (1.0 - sin2_t).sqrt();

        let parallel = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
        let perpendicular = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
        ((sqr(parallel) + sqr(perpendicular)) * 0.5, false)
    }
}
