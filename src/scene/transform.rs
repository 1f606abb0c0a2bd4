use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

/// Transform component for scene nodes.
///
/// Encapsulates position, rotation and scale (TRS). Uses a right-handed
/// coordinate system: +X right, +Y up, +Z out of the screen.
///
/// # Example
///
/// ```rust,ignore
/// let mut transform = Transform::new();
/// transform.position = Vec3::new(1.0, 2.0, 3.0);
/// transform.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
/// transform.scale = Vec3::splat(2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Transform {
    /// Local position relative to parent.
    pub position: Vec3,
    /// Local rotation as a unit quaternion.
    pub rotation: Quat,
    /// Local scale factor.
    pub scale: Vec3,
}

impl Transform {
    /// Creates a transform with identity values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Composes the TRS values into the local matrix.
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Sets rotation from Euler angles (XYZ order, radians).
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Orients the transform to face a target point in parent space.
    ///
    /// * `target` - The point to look at in parent-local coordinates
    /// * `up` - The up vector (typically `Vec3::Y`)
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }
        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();
        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }

    /// Whether the rotation is close enough to unit length to compose
    /// into a rigid transform.
    #[must_use]
    pub fn has_unit_rotation(&self) -> bool {
        (self.rotation.length_squared() - 1.0).abs() < 1e-3
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
