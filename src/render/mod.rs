//! The render side: the profile, the accumulation buffer, tiles,
//! progress counters, the evaluators and the tile workers.

pub mod buffer;
pub mod evaluator;
pub mod progress;
pub mod tile;
pub(crate) mod worker;

pub use buffer::{PixelSample, RenderBuffer};
pub use evaluator::{Evaluator, EvaluatorKind};
pub use progress::{Progress, ProgressSnapshot};
pub use tile::Tile;

use glam::Vec3;

use crate::errors::{PrismError, Result};

/// Everything configurable about one render.
#[derive(Debug, Clone)]
pub struct RenderProfile {
    /// Worker thread count; defaults to one per logical CPU.
    pub worker_size: usize,
    /// Tile edge length in pixels.
    pub tile_size: u32,
    /// Samples every pixel always takes.
    pub base_samples: u32,
    /// Per-pixel sample cap once adaptive sampling engages.
    pub adaptive_samples: u32,
    /// Confidence-interval half-width below which a pixel stops
    /// sampling early.
    pub noise_threshold: f32,
    /// Maximum path length.
    pub bounce_limit: u32,
    /// Paths whose energy drops below this componentwise are cut.
    pub energy_epsilon: Vec3,
    /// First bounce at which Russian roulette may terminate a path.
    pub roulette_start: u32,
    /// Triangles larger than this multiple of the mean area are
    /// fragmented for hierarchy quality.
    pub fragment_ratio: f32,
    /// Cap on fragmentation subdivision levels.
    pub fragment_max_iterations: u32,
    /// Global seed; identical seeds reproduce identical images.
    pub seed: u64,
    pub evaluator: EvaluatorKind,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self {
            worker_size: std::thread::available_parallelism().map_or(1, std::num::NonZero::get),
            tile_size: 32,
            base_samples: 16,
            adaptive_samples: 64,
            noise_threshold: 0.01,
            bounce_limit: 8,
            energy_epsilon: Vec3::splat(1e-3),
            roulette_start: 4,
            fragment_ratio: 4.8,
            fragment_max_iterations: 3,
            seed: 0,
            evaluator: EvaluatorKind::PathTrace,
        }
    }
}

impl RenderProfile {
    /// Checks every field is in range before a render starts.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| Err(PrismError::InvalidProfile(message.into()));
        if self.worker_size == 0 {
            return fail("worker_size must be positive");
        }
        if self.tile_size == 0 {
            return fail("tile_size must be positive");
        }
        if self.base_samples == 0 {
            return fail("base_samples must be positive");
        }
        if self.adaptive_samples < self.base_samples {
            return fail("adaptive_samples must be at least base_samples");
        }
        if !self.noise_threshold.is_finite() || self.noise_threshold < 0.0 {
            return fail("noise_threshold must be non-negative");
        }
        if self.energy_epsilon.cmplt(Vec3::ZERO).any() || !self.energy_epsilon.is_finite() {
            return fail("energy_epsilon components must be non-negative");
        }
        if !self.fragment_ratio.is_finite() || self.fragment_ratio <= 0.0 {
            return fail("fragment_ratio must be positive");
        }
        if self.fragment_max_iterations > 8 {
            return fail("fragment_max_iterations out of range");
        }
        Ok(())
    }
}
