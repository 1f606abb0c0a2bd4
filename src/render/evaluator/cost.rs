use std::sync::atomic::{AtomicU64, Ordering};

use bumpalo::Bump;
use glam::Vec4;

use super::Evaluator;
use crate::math::Ray;
use crate::prepared::PreparedScene;
use crate::sampling::Sampler;

/// Renders hierarchy traversal cost instead of radiance.
///
/// The red channel is this ray's cost in box tests; green and blue
/// carry the running totals so a caller can derive the mean cost per
/// ray from any single pixel sample.
#[derive(Default)]
pub struct TraceCostEvaluator {
    cumulative_cost: AtomicU64,
    cumulative_samples: AtomicU64,
}

impl Evaluator for TraceCostEvaluator {
    fn evaluate(
        &self,
        scene: &PreparedScene,
        ray: Ray,
        _sampler: &mut Sampler,
        _arena: &Bump,
    ) -> Vec4 {
        let cost = u64::from(scene.trace_cost(&ray));
        let total = self.cumulative_cost.fetch_add(cost, Ordering::Relaxed) + cost;
        let samples = self.cumulative_samples.fetch_add(1, Ordering::Relaxed) + 1;
        Vec4::new(cost as f32, total as f32, samples as f32, 1.0)
    }
}
