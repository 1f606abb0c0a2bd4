use glam::{Vec2, Vec4};
use parking_lot::RwLock;

use crate::errors::{PrismError, Result};
use crate::render::Tile;

/// One pixel's accumulation state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelSample {
    /// Weighted radiance sum; alpha accumulates like the color lanes.
    pub radiance: Vec4,
    pub weight: f32,
    pub count: u32,
}

impl PixelSample {
    pub fn accumulate(&mut self, radiance: Vec4, weight: f32) {
        self.radiance += radiance * weight;
        self.weight += weight;
        self.count += 1;
    }

    /// The current estimate, black while no samples have landed.
    #[must_use]
    pub fn resolve(&self) -> Vec4 {
        if self.weight > 0.0 {
            self.radiance / self.weight
        } else {
            Vec4::ZERO
        }
    }
}

/// The accumulation target of a render.
///
/// Workers gather a whole tile locally and commit it in one locked
/// splice, so the lock is taken once per tile rather than per pixel.
/// The buffer may be reallocated between renders but never during one.
pub struct RenderBuffer {
    width: u32,
    height: u32,
    size_r: Vec2,
    aspects: Vec2,
    pixels: RwLock<Vec<PixelSample>>,
}

impl RenderBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PrismError::InvalidBuffer(format!(
                "render buffer size {width}x{height} is degenerate"
            )));
        }
        let size = Vec2::new(width as f32, height as f32);
        Ok(Self {
            width,
            height,
            size_r: size.recip(),
            aspects: size / size.min_element(),
            pixels: RwLock::new(vec![PixelSample::default(); (width * height) as usize]),
        })
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Componentwise reciprocal of the size.
    #[inline]
    #[must_use]
    pub fn size_r(&self) -> Vec2 {
        self.size_r
    }

    /// Size over the smaller dimension: `(aspect, 1)` for landscape
    /// buffers.
    #[inline]
    #[must_use]
    pub fn aspects(&self) -> Vec2 {
        self.aspects
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Merges a worker-local tile, row by row under one write lock.
    pub fn commit_tile(&self, tile: &Tile, samples: &[PixelSample]) {
        debug_assert_eq!(samples.len(), tile.area());
        let mut pixels = self.pixels.write();
        for row in 0..tile.size.y {
            let src = (row * tile.size.x) as usize;
            let dst = ((tile.origin.y + row) * self.width + tile.origin.x) as usize;
            let width = tile.size.x as usize;
            for (d, s) in pixels[dst..dst + width].iter_mut().zip(&samples[src..src + width]) {
                d.radiance += s.radiance;
                d.weight += s.weight;
                d.count += s.count;
            }
        }
    }

    /// Resolved radiance of a single pixel.
    #[must_use]
    pub fn resolve_pixel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels.read()[(y * self.width + x) as usize].resolve()
    }

    /// Sample count of a single pixel.
    #[must_use]
    pub fn sample_count(&self, x: u32, y: u32) -> u32 {
        self.pixels.read()[(y * self.width + x) as usize].count
    }

    /// Resolves the whole buffer into row-major radiance values.
    #[must_use]
    pub fn resolve(&self) -> Vec<Vec4> {
        self.pixels.read().iter().map(PixelSample::resolve).collect()
    }

    /// Resolved buffer as a flat `[r, g, b, a]` float stream.
    #[must_use]
    pub fn to_rgba_f32(&self) -> Vec<f32> {
        let resolved = self.resolve();
        bytemuck::cast_slice::<Vec4, f32>(&resolved).to_vec()
    }

    /// Zeroes every pixel; called when a new render begins.
    pub fn clear(&self) {
        for pixel in self.pixels.write().iter_mut() {
            *pixel = PixelSample::default();
        }
    }
}
