use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::accel::{Token, TokenKind};
use crate::math::{luminance, Ray};
use crate::prepared::GeometryView;
use crate::resources::DirectionalTexture;
use crate::sampling::Distribution1D;

/// One draw from a light: the radiance arriving at the shaded point,
/// the direction it arrives from and how far away the emitter is.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub radiance: Vec3,
    /// Unit direction from the shaded point toward the light.
    pub incident: Vec3,
    /// Distance to the emitter; infinite for directional and ambient
    /// lights.
    pub travel: f32,
    /// Solid-angle density of the draw; zero marks an impossible
    /// sample.
    pub pdf: f32,
}

impl LightSample {
    const IMPOSSIBLE: Self = Self {
        radiance: Vec3::ZERO,
        incident: Vec3::Y,
        travel: f32::INFINITY,
        pdf: 0.0,
    };
}

/// A light source in its pressed form.
pub enum PreparedLight {
    Point {
        position: Vec3,
        intensity: Vec3,
    },
    Directional {
        /// Unit direction the light travels, away from the emitter.
        direction: Vec3,
        radiance: Vec3,
    },
    Area {
        /// The emitting primitive.
        token: Token,
        radiance: Vec3,
    },
    Ambient {
        texture: Arc<dyn DirectionalTexture>,
    },
}

impl PreparedLight {
    /// Delta lights cannot be hit by a sampled BSDF direction, so
    /// next-event estimation takes their full contribution unweighted.
    #[must_use]
    pub fn is_delta(&self) -> bool {
        matches!(
            self,
            PreparedLight::Point { .. } | PreparedLight::Directional { .. }
        )
    }

    /// Draws an incident direction at `point`.
    #[must_use]
    pub fn sample(&self, point: Vec3, u: Vec2, geometry: GeometryView<'_>) -> LightSample {
        match self {
            PreparedLight::Point {
                position,
                intensity,
            } => {
                let delta = *position - point;
                let distance_squared = delta.length_squared();
                if distance_squared <= 0.0 {
                    return LightSample::IMPOSSIBLE;
                }
                let travel = distance_squared.sqrt();
                LightSample {
                    radiance: *intensity / distance_squared,
                    incident: delta / travel,
                    travel,
                    pdf: 1.0,
                }
            }
            PreparedLight::Directional {
                direction,
                radiance,
            } => LightSample {
                radiance: *radiance,
                incident: -*direction,
                travel: f32::INFINITY,
                pdf: 1.0,
            },
            PreparedLight::Area { token, radiance } => {
                let (surface, normal) = sample_primitive(*token, u, geometry);
                let delta = surface - point;
                let distance_squared = delta.length_squared();
                if distance_squared <= 0.0 {
                    return LightSample::IMPOSSIBLE;
                }
                let travel = distance_squared.sqrt();
                let incident = delta / travel;
                // Emission is two-sided; the area-to-solid-angle change
                // of variables still needs the geometric cosine.
                let cos_light = normal.dot(-incident).abs();
                let area = primitive_area(*token, geometry);
                if cos_light <= 1e-6 || area <= 0.0 {
                    return LightSample::IMPOSSIBLE;
                }
                LightSample {
                    radiance: *radiance,
                    incident,
                    travel,
                    pdf: distance_squared / (cos_light * area),
                }
            }
            PreparedLight::Ambient { texture } => {
                let sample = texture.sample(u);
                LightSample {
                    radiance: sample.radiance,
                    incident: sample.direction,
                    travel: f32::INFINITY,
                    pdf: sample.pdf,
                }
            }
        }
    }

    /// Solid-angle density [`Self::sample`] would assign the incident
    /// direction at `point`. Zero for delta lights.
    #[must_use]
    pub fn pdf(&self, point: Vec3, incident: Vec3, geometry: GeometryView<'_>) -> f32 {
        match self {
            PreparedLight::Point { .. } | PreparedLight::Directional { .. } => 0.0,
            PreparedLight::Area { token, .. } => {
                let ray = Ray::new(point, incident);
                let hit = match token.kind() {
                    TokenKind::Triangle => geometry.triangles[token.index()].intersect(&ray),
                    TokenKind::Sphere => geometry.spheres[token.index()].intersect(&ray),
                    _ => None,
                };
                let Some((t, _)) = hit else { return 0.0 };
                let normal = match token.kind() {
                    TokenKind::Triangle => geometry.triangles[token.index()].normal,
                    _ => geometry.spheres[token.index()].normal_at(ray.at(t)),
                };
                let cos_light = normal.dot(-incident).abs();
                let area = primitive_area(*token, geometry);
                if cos_light <= 1e-6 || area <= 0.0 {
                    return 0.0;
                }
                t * t / (cos_light * area)
            }
            PreparedLight::Ambient { texture } => texture.pdf(incident),
        }
    }

    /// Scalar emitted power used to weight light selection. The scene
    /// radius converts radiance-over-directions into power for the
    /// unbounded lights.
    #[must_use]
    pub fn power(&self, geometry: GeometryView<'_>, scene_radius: f32) -> f32 {
        let disc = PI * scene_radius * scene_radius;
        match self {
            PreparedLight::Point { intensity, .. } => 4.0 * PI * luminance(*intensity),
            PreparedLight::Directional { radiance, .. } => disc * luminance(*radiance),
            PreparedLight::Area { token, radiance } => {
                PI * primitive_area(*token, geometry) * luminance(*radiance)
            }
            PreparedLight::Ambient { texture } => disc * luminance(texture.average()),
        }
    }
}

fn sample_primitive(token: Token, u: Vec2, geometry: GeometryView<'_>) -> (Vec3, Vec3) {
    match token.kind() {
        TokenKind::Triangle => geometry.triangles[token.index()].sample_point(u),
        TokenKind::Sphere => geometry.spheres[token.index()].sample_point(u),
        _ => unreachable!("area light bound to non-geometry token"),
    }
}

fn primitive_area(token: Token, geometry: GeometryView<'_>) -> f32 {
    match token.kind() {
        TokenKind::Triangle => geometry.triangles[token.index()].area(),
        TokenKind::Sphere => geometry.spheres[token.index()].area(),
        _ => 0.0,
    }
}

/// Discrete distribution over the scene's lights, weighted by power.
pub struct LightDistribution {
    distribution: Option<Distribution1D>,
}

impl LightDistribution {
    #[must_use]
    pub fn build(
        lights: &[PreparedLight],
        geometry: GeometryView<'_>,
        scene_radius: f32,
    ) -> Self {
        if lights.is_empty() {
            return Self { distribution: None };
        }
        let powers: Vec<f32> = lights
            .iter()
            .map(|light| light.power(geometry, scene_radius))
            .collect();
        Self {
            distribution: Some(Distribution1D::new(&powers)),
        }
    }

    /// Picks a light index. Returns the index and its selection
    /// probability.
    #[must_use]
    pub fn sample(&self, u: f32) -> Option<(usize, f32)> {
        let distribution = self.distribution.as_ref()?;
        let (index, pdf, _) = distribution.sample_discrete(u);
        (pdf > 0.0).then_some((index, pdf))
    }

    /// Selection probability of a light index.
    #[must_use]
    pub fn pdf(&self, index: usize) -> f32 {
        self.distribution
            .as_ref()
            .map_or(0.0, |d| d.pdf_discrete(index))
    }
}
