use bumpalo::Bump;
use glam::{Vec3, Vec4};

use super::Evaluator;
use crate::accel::{Token, TraceQuery};
use crate::material::bxdf::FunctionType;
use crate::math::{power_heuristic, Ray, RAY_EPSILON};
use crate::prepared::{PreparedLight, PreparedScene};
use crate::render::RenderProfile;
use crate::sampling::Sampler;

/// The path-tracing integrator.
///
/// One camera path per call. Each bounce combines next-event estimation
/// against a power-sampled light with BSDF sampling, weighted by the
/// power heuristic. Emission is only added when the previous bounce was
/// specular (or on the primary hit), since next-event estimation
/// already accounts for it everywhere else.
pub struct PathTraceEvaluator {
    bounce_limit: u32,
    energy_epsilon: Vec3,
    roulette_start: u32,
}

impl PathTraceEvaluator {
    #[must_use]
    pub fn from_profile(profile: &RenderProfile) -> Self {
        Self {
            bounce_limit: profile.bounce_limit,
            energy_epsilon: profile.energy_epsilon,
            roulette_start: profile.roulette_start,
        }
    }
}

impl Evaluator for PathTraceEvaluator {
    fn evaluate(
        &self,
        scene: &PreparedScene,
        ray: Ray,
        sampler: &mut Sampler,
        arena: &Bump,
    ) -> Vec4 {
        let all = FunctionType::all();
        let mut radiance = Vec3::ZERO;
        let mut energy = Vec3::ONE;
        // The primary hit shows emission directly, like a specular
        // continuation would.
        let mut specular_bounce = true;
        let mut scatter_pdf = 0.0_f32;
        let mut ray = ray;
        let mut ignore = Token::NONE;

        for bounce in 0..self.bounce_limit {
            let mut query = TraceQuery::new(ray);
            query.ignore = ignore;
            scene.trace(&mut query);
            if !query.hit() {
                radiance += energy * self.escaped_radiance(scene, &ray, specular_bounce, scatter_pdf);
                break;
            }

            let touch = scene.interact(&query);
            if scene.pressed_material(touch.material_index).emissive && specular_bounce {
                radiance += energy * touch.material.emission(touch.texcoord);
            }
            let bsdf = touch.material.scatter(&touch, arena);

            // Next-event estimation toward one power-sampled light.
            if let Some((light_index, pick_pdf)) =
                scene.light_distribution().sample(sampler.next_1d())
            {
                let light = &scene.lights()[light_index];
                let light_sample =
                    light.sample(touch.point, sampler.next_2d(), scene.geometry());
                if light_sample.pdf > 0.0 && light_sample.radiance != Vec3::ZERO {
                    let value = bsdf.evaluate(touch.outgoing, light_sample.incident, all)
                        * light_sample.incident.dot(touch.shading_normal).abs();
                    if value != Vec3::ZERO {
                        let shadow = Ray::forward(touch.point, light_sample.incident);
                        let travel = light_sample.travel - RAY_EPSILON;
                        if !scene.occlude(&shadow, travel, touch.token) {
                            let weight = if light.is_delta() {
                                1.0
                            } else {
                                let scatter_pdf =
                                    bsdf.pdf(touch.outgoing, light_sample.incident, all);
                                power_heuristic(
                                    1.0,
                                    light_sample.pdf * pick_pdf,
                                    1.0,
                                    scatter_pdf,
                                )
                            };
                            radiance += energy * light_sample.radiance * value * weight
                                / (pick_pdf * light_sample.pdf);
                        }
                    }
                }
            }

            // Continue the path through the BSDF.
            let scatter = bsdf.sample(touch.outgoing, sampler.next_2d(), all);
            if scatter.is_impossible() || scatter.value == Vec3::ZERO {
                break;
            }
            energy *=
                scatter.value * scatter.incident.dot(touch.shading_normal).abs() / scatter.pdf;
            specular_bounce = scatter.function.contains(FunctionType::SPECULAR);
            scatter_pdf = scatter.pdf;

            if energy.cmple(self.energy_epsilon).all() {
                break;
            }
            if bounce + 1 >= self.roulette_start {
                let survive = energy.max_element().min(1.0);
                if sampler.next_1d() < survive {
                    energy /= survive;
                } else {
                    break;
                }
            }

            ray = Ray::forward(touch.point, scatter.incident);
            // A transmitted ray legitimately re-enters the primitive it
            // came from (the far side of a sphere); only reflected
            // continuations exclude it.
            ignore = if scatter.function.contains(FunctionType::TRANSMISSIVE) {
                Token::NONE
            } else {
                touch.token
            };
        }

        radiance.extend(1.0)
    }
}

impl PathTraceEvaluator {
    /// Environment contribution of an escaped ray. After a specular
    /// bounce the ambient value passes through whole; after anything
    /// else it is the BSDF-sampling half of the multiple importance
    /// estimate, weighted against the next-event strategy that also
    /// samples the environment.
    fn escaped_radiance(
        &self,
        scene: &PreparedScene,
        ray: &Ray,
        specular_bounce: bool,
        scatter_pdf: f32,
    ) -> Vec3 {
        let direction = ray.direction3();
        if specular_bounce {
            return scene.evaluate_ambient(direction);
        }
        let mut radiance = Vec3::ZERO;
        for (index, light) in scene.lights().iter().enumerate() {
            if let PreparedLight::Ambient { texture } = light {
                let light_pdf = texture.pdf(direction) * scene.light_distribution().pdf(index);
                let weight = power_heuristic(1.0, scatter_pdf, 1.0, light_pdf);
                radiance += texture.evaluate(direction) * weight;
            }
        }
        radiance
    }
}
