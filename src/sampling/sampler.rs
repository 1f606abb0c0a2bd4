use glam::Vec2;

use super::HashRng;

/// The per-worker sample stream.
///
/// Integrators draw an interleaved sequence of 1D and 2D values from
/// this. A stream is re-seeded with [`Sampler::prepare`] at the start
/// of every pixel sample, so the draws within one radiance estimate are
/// a pure function of the seed.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: HashRng,
}

impl Sampler {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: HashRng::new(seed),
        }
    }

    /// Restarts the stream from a fresh seed.
    pub fn prepare(&mut self, seed: u64) {
        self.rng = HashRng::new(seed);
    }

    #[inline]
    pub fn next_1d(&mut self) -> f32 {
        self.rng.next_f32()
    }

    #[inline]
    pub fn next_2d(&mut self) -> Vec2 {
        // Draw order is part of the deterministic stream contract.
        let x = self.rng.next_f32();
        let y = self.rng.next_f32();
        Vec2::new(x, y)
    }
}
