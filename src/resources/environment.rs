//! Directional textures: illumination indexed by direction instead of
//! surface coordinate. Ambient lights evaluate these on ray misses and
//! importance-sample them for next-event estimation.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::math::luminance;
use crate::sampling::{warp, Distribution2D};
use crate::resources::Texture;

/// One draw from a directional texture.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentSample {
    pub radiance: Vec3,
    /// World-space direction pointing away from the shaded point.
    pub direction: Vec3,
    /// Solid-angle density of the draw.
    pub pdf: f32,
}

/// Illumination defined over the sphere of directions.
pub trait DirectionalTexture: Send + Sync {
    /// Radiance arriving from a unit direction.
    fn evaluate(&self, direction: Vec3) -> Vec3;

    /// Draws a direction, preferring bright regions where the
    /// implementation can.
    fn sample(&self, u: Vec2) -> EnvironmentSample;

    /// Solid-angle density [`Self::sample`] would assign a direction.
    fn pdf(&self, direction: Vec3) -> f32;

    /// Mean radiance over all directions.
    fn average(&self) -> Vec3;
}

// ============================================================================
// Constant
// ============================================================================

/// The same radiance from every direction.
#[derive(Debug, Clone, Copy)]
pub struct ConstantEnvironment {
    pub radiance: Vec3,
}

impl ConstantEnvironment {
    #[must_use]
    pub fn new(radiance: Vec3) -> Self {
        Self { radiance }
    }
}

impl DirectionalTexture for ConstantEnvironment {
    fn evaluate(&self, _direction: Vec3) -> Vec3 {
        self.radiance
    }

    fn sample(&self, u: Vec2) -> EnvironmentSample {
        EnvironmentSample {
            radiance: self.radiance,
            direction: warp::square_to_uniform_sphere(u),
            pdf: warp::uniform_sphere_pdf(),
        }
    }

    fn pdf(&self, _direction: Vec3) -> f32 {
        warp::uniform_sphere_pdf()
    }

    fn average(&self) -> Vec3 {
        self.radiance
    }
}

// ============================================================================
// Gradient sky
// ============================================================================

/// A vertical three-stop gradient: ground below the horizon, a blend
/// from horizon to zenith above it.
#[derive(Debug, Clone, Copy)]
pub struct GradientEnvironment {
    pub zenith: Vec3,
    pub horizon: Vec3,
    pub ground: Vec3,
}

impl GradientEnvironment {
    #[must_use]
    pub fn new(zenith: Vec3, horizon: Vec3, ground: Vec3) -> Self {
        Self {
            zenith,
            horizon,
            ground,
        }
    }
}

impl DirectionalTexture for GradientEnvironment {
    fn evaluate(&self, direction: Vec3) -> Vec3 {
        if direction.y < 0.0 {
            self.ground
        } else {
            self.horizon.lerp(self.zenith, direction.y)
        }
    }

    fn sample(&self, u: Vec2) -> EnvironmentSample {
        let direction = warp::square_to_uniform_sphere(u);
        EnvironmentSample {
            radiance: self.evaluate(direction),
            direction,
            pdf: warp::uniform_sphere_pdf(),
        }
    }

    fn pdf(&self, _direction: Vec3) -> f32 {
        warp::uniform_sphere_pdf()
    }

    fn average(&self) -> Vec3 {
        // Hemisphere integral of the linear blend gives the midpoint.
        (self.ground + (self.zenith + self.horizon) * 0.5) * 0.5
    }
}

// ============================================================================
// Equirectangular
// ============================================================================

/// A latitude-longitude radiance map importance-sampled through a 2D
/// piecewise distribution over texel luminance.
pub struct EquirectEnvironment {
    texture: Texture,
    distribution: Distribution2D,
    average: Vec3,
}

impl EquirectEnvironment {
    /// Builds the sampling distribution over the map. Weights carry the
    /// sin(theta) factor of the sphere parametrization so that rows near
    /// the poles are not over-sampled.
    #[must_use]
    pub fn new(texture: Texture) -> Self {
        let (width, height) = texture.size();
        let mut weights = Vec::with_capacity((width * height) as usize);
        let mut average = Vec3::ZERO;
        for y in 0..height {
            let theta = (y as f32 + 0.5) / height as f32 * PI;
            let sin_theta = theta.sin();
            for x in 0..width {
                let texel = texture.texel(i64::from(x), i64::from(y)).truncate();
                weights.push(luminance(texel) * sin_theta);
                average += texel * sin_theta;
            }
        }
        // Normalization: sum of sin(theta) over rows approaches 2/pi of
        // the texel count.
        let sin_total: f32 = (0..height)
            .map(|y| ((y as f32 + 0.5) / height as f32 * PI).sin())
            .sum();
        average /= sin_total * width as f32;
        let distribution = Distribution2D::new(&weights, width as usize, height as usize);
        Self {
            texture,
            distribution,
            average,
        }
    }

    fn direction_to_uv(direction: Vec3) -> Vec2 {
        let phi = direction.x.atan2(-direction.z);
        let theta = direction.y.clamp(-1.0, 1.0).acos();
        Vec2::new(phi / TAU + 0.5, theta / PI)
    }

    fn uv_to_direction(uv: Vec2) -> (Vec3, f32) {
        let phi = (uv.x - 0.5) * TAU;
        let theta = uv.y * PI;
        let sin_theta = theta.sin();
        (
            Vec3::new(sin_theta * phi.sin(), theta.cos(), -sin_theta * phi.cos()),
            sin_theta,
        )
    }
}

impl DirectionalTexture for EquirectEnvironment {
    fn evaluate(&self, direction: Vec3) -> Vec3 {
        self.texture
            .sample_2d(Self::direction_to_uv(direction))
            .truncate()
    }

    fn sample(&self, u: Vec2) -> EnvironmentSample {
        let (uv, map_pdf) = self.distribution.sample_continuous(u);
        let (direction, sin_theta) = Self::uv_to_direction(uv);
        if map_pdf == 0.0 || sin_theta == 0.0 {
            return EnvironmentSample {
                radiance: Vec3::ZERO,
                direction: Vec3::Y,
                pdf: 0.0,
            };
        }
        EnvironmentSample {
            radiance: self.texture.sample_2d(uv).truncate(),
            direction,
            // Jacobian of the lat-long map: dω = 2π² sinθ du dv.
            pdf: map_pdf / (2.0 * PI * PI * sin_theta),
        }
    }

    fn pdf(&self, direction: Vec3) -> f32 {
        let uv = Self::direction_to_uv(direction);
        let sin_theta = (uv.y * PI).sin();
        if sin_theta == 0.0 {
            return 0.0;
        }
        self.distribution.pdf(uv) / (2.0 * PI * PI * sin_theta)
    }

    fn average(&self) -> Vec3 {
        self.average
    }
}

// ============================================================================
// Cubemap
// ============================================================================

/// Face order: +X, -X, +Y, -Y, +Z, -Z.
pub struct CubemapEnvironment {
    faces: [Texture; 6],
    average: Vec3,
}

impl CubemapEnvironment {
    #[must_use]
    pub fn new(faces: [Texture; 6]) -> Self {
        let average = faces
            .iter()
            .map(|f| f.average().truncate())
            .sum::<Vec3>()
            / 6.0;
        Self { faces, average }
    }

    fn face_uv(direction: Vec3) -> (usize, Vec2) {
        let abs = direction.abs();
        let (face, major, u, v) = if abs.x >= abs.y && abs.x >= abs.z {
            if direction.x >= 0.0 {
                (0, abs.x, -direction.z, -direction.y)
            } else {
                (1, abs.x, direction.z, -direction.y)
            }
        } else if abs.y >= abs.z {
            if direction.y >= 0.0 {
                (2, abs.y, direction.x, direction.z)
            } else {
                (3, abs.y, direction.x, -direction.z)
            }
        } else if direction.z >= 0.0 {
            (4, abs.z, direction.x, -direction.y)
        } else {
            (5, abs.z, -direction.x, -direction.y)
        };
        (face, Vec2::new(u / major, v / major) * 0.5 + 0.5)
    }
}

impl DirectionalTexture for CubemapEnvironment {
    fn evaluate(&self, direction: Vec3) -> Vec3 {
        let (face, uv) = Self::face_uv(direction);
        self.faces[face].sample_2d(uv).truncate()
    }

    fn sample(&self, u: Vec2) -> EnvironmentSample {
        let direction = warp::square_to_uniform_sphere(u);
        EnvironmentSample {
            radiance: self.evaluate(direction),
            direction,
            pdf: warp::uniform_sphere_pdf(),
        }
    }

    fn pdf(&self, _direction: Vec3) -> f32 {
        warp::uniform_sphere_pdf()
    }

    fn average(&self) -> Vec3 {
        self.average
    }
}
