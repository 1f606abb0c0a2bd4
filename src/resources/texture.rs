use std::sync::Arc;

use glam::{Vec2, Vec4};

/// How texture coordinates outside `[0, 1)` map back into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
}

/// A 2D grid of linear float4 texels with bilinear sampling.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    data: Vec<Vec4>,
    wrap: WrapMode,
}

impl Texture {
    /// Creates a texture from row-major texels.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, data: Vec<Vec4>, wrap: WrapMode) -> Self {
        assert_eq!(data.len(), (width * height) as usize);
        assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            data,
            wrap,
        }
    }

    /// A 1×1 texture holding a single value.
    #[must_use]
    pub fn solid(value: Vec4) -> Self {
        Self::from_pixels(1, 1, vec![value], WrapMode::Repeat)
    }

    /// Decodes an image into linear float texels.
    #[must_use]
    pub fn from_image(image: &image::DynamicImage, wrap: WrapMode) -> Self {
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let data = rgba
            .pixels()
            .map(|p| Vec4::new(p.0[0], p.0[1], p.0[2], p.0[3]))
            .collect();
        Self::from_pixels(width, height, data, wrap)
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }

    fn wrap_coord(&self, v: i64, limit: u32) -> u32 {
        match self.wrap {
            WrapMode::Repeat => v.rem_euclid(i64::from(limit)) as u32,
            WrapMode::Clamp => v.clamp(0, i64::from(limit) - 1) as u32,
        }
    }

    /// Fetches one texel with the wrap policy applied.
    #[must_use]
    pub fn texel(&self, x: i64, y: i64) -> Vec4 {
        let x = self.wrap_coord(x, self.width);
        let y = self.wrap_coord(y, self.height);
        self.data[(y * self.width + x) as usize]
    }

    /// Bilinear sample at a continuous texture coordinate, (0, 0) at
    /// the top-left.
    #[must_use]
    pub fn sample_2d(&self, uv: Vec2) -> Vec4 {
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let x0 = x0 as i64;
        let y0 = y0 as i64;

        let t00 = self.texel(x0, y0);
        let t10 = self.texel(x0 + 1, y0);
        let t01 = self.texel(x0, y0 + 1);
        let t11 = self.texel(x0 + 1, y0 + 1);
        t00.lerp(t10, fx).lerp(t01.lerp(t11, fx), fy)
    }

    /// Mean of all texels.
    #[must_use]
    pub fn average(&self) -> Vec4 {
        let sum: Vec4 = self.data.iter().copied().sum();
        sum / self.data.len() as f32
    }

    /// Whether every texel holds the same value.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.data.windows(2).all(|w| w[0] == w[1])
    }

    /// Row-major texel storage, for callers that build distributions
    /// over the grid.
    #[must_use]
    pub fn texels(&self) -> &[Vec4] {
        &self.data
    }
}

/// A material input: either a constant or a shared texture.
///
/// Pressing detects the constant case so per-hit shading can skip the
/// bilinear fetch.
#[derive(Debug, Clone)]
pub enum TextureRef {
    Constant(Vec4),
    Image(Arc<Texture>),
}

impl TextureRef {
    #[inline]
    #[must_use]
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        match self {
            TextureRef::Constant(value) => *value,
            TextureRef::Image(texture) => texture.sample_2d(uv),
        }
    }

    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            TextureRef::Constant(_) => true,
            TextureRef::Image(texture) => texture.is_constant(),
        }
    }

    #[must_use]
    pub fn average(&self) -> Vec4 {
        match self {
            TextureRef::Constant(value) => *value,
            TextureRef::Image(texture) => texture.average(),
        }
    }
}

impl From<Vec4> for TextureRef {
    fn from(value: Vec4) -> Self {
        TextureRef::Constant(value)
    }
}

impl From<Arc<Texture>> for TextureRef {
    fn from(texture: Arc<Texture>) -> Self {
        TextureRef::Image(texture)
    }
}
