use glam::{Vec2, Vec3};

use crate::resources::Mesh;

pub struct BoxOptions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for BoxOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }
}

/// Creates an axis-aligned box centered on the origin, four vertices
/// per face so normals and uvs stay flat.
#[must_use]
pub fn create_box(options: BoxOptions) -> Mesh {
    let h = Vec3::new(options.width, options.height, options.depth) * 0.5;

    // (normal, tangent u, tangent v) per face
    let faces = [
        (Vec3::X, -Vec3::Z, Vec3::Y),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, -Vec3::Z),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, -Vec3::X, Vec3::Y),
    ];

    let mut mesh = Mesh::new();
    for (normal, tu, tv) in faces {
        let base = mesh.positions.len() as u32;
        for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            mesh.positions.push((normal + tu * sx + tv * sy) * h);
            mesh.normals.push(normal);
            mesh.uvs
                .push(Vec2::new(sx * 0.5 + 0.5, 0.5 - sy * 0.5));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}
