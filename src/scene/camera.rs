use glam::{Affine3A, Vec2, Vec3};

use crate::math::Ray;

/// A pinhole perspective camera component.
///
/// The camera looks down its node's -Z axis, +Y up, matching the scene
/// coordinate convention. Aspect comes from the render buffer at press
/// time, not from the component.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Full vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_y_degrees: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
        }
    }

    /// Resolves the component against a world transform and aspect
    /// ratio into the flat form the workers consume.
    #[must_use]
    pub fn press(&self, world: &Affine3A, aspect: f32) -> PressedCamera {
        let position = world.transform_point3(Vec3::ZERO);
        let forward = world.transform_vector3(-Vec3::Z).normalize();
        let up = world.transform_vector3(Vec3::Y).normalize();
        let right = forward.cross(up).normalize();
        let half_height = (self.fov_y * 0.5).tan();
        PressedCamera {
            position,
            forward,
            right_span: right * (2.0 * half_height * aspect),
            up_span: right.cross(forward).normalize() * (2.0 * half_height),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(60.0)
    }
}

/// The flattened camera stored in a prepared scene. Pure stack data;
/// spawning a ray is a handful of fused multiply-adds.
#[derive(Debug, Clone, Copy)]
pub struct PressedCamera {
    position: Vec3,
    forward: Vec3,
    right_span: Vec3,
    up_span: Vec3,
}

impl PressedCamera {
    /// Spawns the primary ray through a raster coordinate in `[0, 1)²`,
    /// with (0, 0) the top-left pixel corner.
    #[must_use]
    pub fn spawn_ray(&self, uv: Vec2) -> Ray {
        let direction =
            self.forward + (uv.x - 0.5) * self.right_span + (0.5 - uv.y) * self.up_span;
        Ray::new(self.position, direction.normalize())
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }
}
