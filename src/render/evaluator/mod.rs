//! Radiance evaluators: given a primary ray, produce one sample of the
//! quantity being rendered.

mod albedo;
mod cost;
mod path;

pub use albedo::AlbedoEvaluator;
pub use cost::TraceCostEvaluator;
pub use path::PathTraceEvaluator;

use std::sync::Arc;

use bumpalo::Bump;
use glam::Vec4;

use crate::math::Ray;
use crate::prepared::PreparedScene;
use crate::render::RenderProfile;
use crate::sampling::Sampler;

/// An estimator of per-pixel radiance.
///
/// The arena is reset by the caller before every invocation; anything
/// an evaluator allocates from it dies with the sample.
pub trait Evaluator: Send + Sync {
    fn evaluate(
        &self,
        scene: &PreparedScene,
        ray: Ray,
        sampler: &mut Sampler,
        arena: &Bump,
    ) -> Vec4;
}

/// Which evaluator a render profile asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluatorKind {
    /// The full path-tracing integrator.
    #[default]
    PathTrace,
    /// First-hit surface color, for previews and denoiser inputs.
    Albedo,
    /// Traversal cost visualization for hierarchy tuning.
    TraceCost,
}

pub(crate) fn create(profile: &RenderProfile) -> Arc<dyn Evaluator> {
    match profile.evaluator {
        EvaluatorKind::PathTrace => Arc::new(PathTraceEvaluator::from_profile(profile)),
        EvaluatorKind::Albedo => Arc::new(AlbedoEvaluator),
        EvaluatorKind::TraceCost => Arc::new(TraceCostEvaluator::default()),
    }
}
