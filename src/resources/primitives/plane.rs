use glam::{Vec2, Vec3};

use crate::resources::Mesh;

pub struct PlaneOptions {
    pub width: f32,
    pub height: f32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Creates a planar quad in the XZ plane facing +Y, as two triangles.
#[must_use]
pub fn create_plane(options: PlaneOptions) -> Mesh {
    let hw = options.width * 0.5;
    let hh = options.height * 0.5;

    let mut mesh = Mesh::new();
    mesh.positions = vec![
        Vec3::new(-hw, 0.0, -hh),
        Vec3::new(hw, 0.0, -hh),
        Vec3::new(hw, 0.0, hh),
        Vec3::new(-hw, 0.0, hh),
    ];
    mesh.normals = vec![Vec3::Y; 4];
    mesh.uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    mesh.indices = vec![0, 2, 1, 0, 3, 2];
    mesh
}
