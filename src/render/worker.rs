use std::sync::Arc;

use bumpalo::Bump;
use glam::Vec4;
use log::debug;

use crate::engine::RenderControl;
use crate::math::luminance;
use crate::prepared::PreparedScene;
use crate::render::{Evaluator, PixelSample, Progress, RenderBuffer, RenderProfile, Tile};
use crate::sampling::{pixel_seed, Sampler};

/// Everything one worker thread owns or shares.
pub(crate) struct WorkerConfig {
    pub scene: Arc<PreparedScene>,
    pub buffer: Arc<RenderBuffer>,
    pub profile: RenderProfile,
    pub progress: Arc<Progress>,
    pub control: Arc<RenderControl>,
    pub tiles: flume::Receiver<Tile>,
    pub evaluator: Arc<dyn Evaluator>,
}

/// The worker loop: pop tiles until the queue drains or the render is
/// aborted. The sampler and arena are reused across every tile this
/// thread renders; the arena resets per pixel sample so the hot path
/// stops allocating once warm.
pub(crate) fn worker_main(config: &WorkerConfig) {
    let mut sampler = Sampler::seeded(config.profile.seed);
    let mut arena = Bump::new();

    loop {
        if !config.control.checkpoint() {
            return;
        }
        match config.tiles.try_recv() {
            Ok(tile) => {
                if !render_tile(config, &tile, &mut sampler, &mut arena) {
                    return;
                }
            }
            Err(flume::TryRecvError::Empty) => std::thread::yield_now(),
            Err(flume::TryRecvError::Disconnected) => return,
        }
    }
}

/// Renders one tile into a local buffer and commits it whole. Returns
/// false when the render was aborted mid-tile; the partial tile is
/// discarded.
fn render_tile(
    config: &WorkerConfig,
    tile: &Tile,
    sampler: &mut Sampler,
    arena: &mut Bump,
) -> bool {
    let profile = &config.profile;
    let scene = &*config.scene;
    let mut local = vec![PixelSample::default(); tile.area()];
    let sample_cap = profile.adaptive_samples.max(profile.base_samples);

    for p in tile.pixels() {
        let pixel = tile.origin + p;
        let pixel_index = pixel.y * config.buffer.width() + pixel.x;

        // Welford accumulation over sample luminance drives the
        // adaptive stop.
        let mut taken = 0u32;
        let mut mean = 0.0_f32;
        let mut m2 = 0.0_f32;

        while taken < sample_cap {
            if taken >= profile.base_samples {
                let variance = m2 / (taken - 1).max(1) as f32;
                let interval = 1.96 * (variance / taken as f32).sqrt();
                if interval <= profile.noise_threshold {
                    break;
                }
            }
            if !config.control.checkpoint() {
                return false;
            }

            sampler.prepare(pixel_seed(tile.index, pixel_index, taken, profile.seed));
            arena.reset();

            let jitter = sampler.next_2d();
            let uv = (pixel.as_vec2() + jitter) * config.buffer.size_r();
            let ray = scene.camera().spawn_ray(uv);
            let mut value = config.evaluator.evaluate(scene, ray, sampler, arena);
            if !value.is_finite() {
                config.progress.add_nan_clamp();
                value = Vec4::new(0.0, 0.0, 0.0, 1.0);
            }

            local[(p.y * tile.size.x + p.x) as usize].accumulate(value, 1.0);
            taken += 1;
            let lum = luminance(value.truncate());
            let delta = lum - mean;
            mean += delta / taken as f32;
            m2 += delta * (lum - mean);
        }

        config.progress.add_pixel();
        config.progress.add_samples(u64::from(taken));
    }

    config.buffer.commit_tile(tile, &local);
    config.progress.add_tile();
    debug!(
        "tile {} at {},{} committed",
        tile.index, tile.origin.x, tile.origin.y
    );
    true
}
