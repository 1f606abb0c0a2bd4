use std::sync::atomic::{AtomicU64, Ordering};

/// Render progress counters.
///
/// All adds are relaxed; readers may observe slightly stale values but
/// never tear. The trace/occlusion counts live on the prepared scene
/// and are merged into [`ProgressSnapshot`] by the engine.
#[derive(Debug, Default)]
pub struct Progress {
    pixels: AtomicU64,
    samples: AtomicU64,
    tiles: AtomicU64,
    nan_clamps: AtomicU64,
    worker_panics: AtomicU64,
    total_pixels: AtomicU64,
    total_tiles: AtomicU64,
}

impl Progress {
    pub(crate) fn reset(&self, total_pixels: u64, total_tiles: u64) {
        self.pixels.store(0, Ordering::Relaxed);
        self.samples.store(0, Ordering::Relaxed);
        self.tiles.store(0, Ordering::Relaxed);
        self.nan_clamps.store(0, Ordering::Relaxed);
        self.worker_panics.store(0, Ordering::Relaxed);
        self.total_pixels.store(total_pixels, Ordering::Relaxed);
        self.total_tiles.store(total_tiles, Ordering::Relaxed);
    }

    pub(crate) fn add_pixel(&self) {
        self.pixels.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_samples(&self, count: u64) {
        self.samples.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn add_tile(&self) {
        self.tiles.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_nan_clamp(&self) {
        self.nan_clamps.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_worker_panic(&self) {
        self.worker_panics.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn pixels(&self) -> u64 {
        self.pixels.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn tiles(&self) -> u64 {
        self.tiles.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn nan_clamps(&self) -> u64 {
        self.nan_clamps.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn worker_panics(&self) -> u64 {
        self.worker_panics.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_pixels(&self) -> u64 {
        self.total_pixels.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_tiles(&self) -> u64 {
        self.total_tiles.load(Ordering::Relaxed)
    }
}

/// A point-in-time copy of every counter, safe to read while the
/// render keeps going.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSnapshot {
    pub pixels: u64,
    pub samples: u64,
    pub tiles: u64,
    pub total_pixels: u64,
    pub total_tiles: u64,
    pub traces: u64,
    pub occlusions: u64,
    pub nan_clamps: u64,
    pub worker_panics: u64,
}

impl ProgressSnapshot {
    /// Completion in `[0, 1]` by pixels.
    #[must_use]
    pub fn completion(&self) -> f32 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.pixels as f32 / self.total_pixels as f32
        }
    }
}
