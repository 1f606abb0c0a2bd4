use bumpalo::Bump;
use glam::Vec4;

use super::Evaluator;
use crate::accel::TraceQuery;
use crate::math::Ray;
use crate::prepared::PreparedScene;
use crate::sampling::Sampler;

/// Pass-through chains longer than this return the environment.
const MAX_SKIPS: u32 = 16;

/// First-hit surface color. Pass-through materials (clear dielectrics)
/// are skipped so the probe reports what sits behind them.
pub struct AlbedoEvaluator;

impl Evaluator for AlbedoEvaluator {
    fn evaluate(
        &self,
        scene: &PreparedScene,
        ray: Ray,
        _sampler: &mut Sampler,
        _arena: &Bump,
    ) -> Vec4 {
        let mut ray = ray;
        let mut query = TraceQuery::new(ray);
        for _ in 0..MAX_SKIPS {
            scene.trace(&mut query);
            if !query.hit() {
                break;
            }
            let touch = scene.interact(&query);
            if !scene.pressed_material(touch.material_index).pass_through {
                let albedo = touch.material.albedo(touch.texcoord);
                return albedo.truncate().extend(1.0);
            }
            ray = Ray::forward(ray.at(query.distance), ray.direction3());
            let ignore = query.token;
            query = TraceQuery::new(ray);
            query.ignore = ignore;
        }
        scene.evaluate_ambient(ray.direction3()).extend(1.0)
    }
}
