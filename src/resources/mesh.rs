use glam::{Vec2, Vec3};

/// An indexed triangle mesh.
///
/// `normals` and `uvs` are either empty or exactly as long as
/// `positions`; empty attribute arrays mean the prepared triangles fall
/// back to geometric normals and zero texcoords.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Mesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates the index triples of the mesh.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    #[must_use]
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    #[must_use]
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Recomputes per-vertex normals as the area-weighted average of
    /// incident face normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for [a, b, c] in self.triangles().collect::<Vec<_>>() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            // Unnormalized cross product weights by twice the area.
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }
}
