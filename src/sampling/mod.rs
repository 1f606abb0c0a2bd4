//! Random number generation, sample streams, warps and piecewise
//! distributions.
//!
//! Everything here is deterministic given a seed: the scheduler hashes
//! (tile, pixel, sample, global seed) into a fresh generator per pixel
//! sample, which makes renders reproducible regardless of how tiles are
//! distributed across worker threads.

mod distribution;
mod rng;
mod sampler;
pub mod warp;

pub use distribution::{Distribution1D, Distribution2D};
pub use rng::{pixel_seed, HashRng};
pub use sampler::Sampler;
