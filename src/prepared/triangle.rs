use glam::{Vec2, Vec3};

use crate::math::{Aabb, Ray};
use crate::sampling::warp;

/// Determinants below this are treated as parallel or degenerate.
const DET_EPSILON: f32 = 1e-12;

/// A triangle pressed for intersection: vertices plus the two edge
/// vectors Möller–Trumbore works on.
#[derive(Debug, Clone)]
pub struct PreparedTriangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// `v1 - v0`.
    pub e1: Vec3,
    /// `v2 - v0`.
    pub e2: Vec3,
    pub t0: Vec2,
    pub t1: Vec2,
    pub t2: Vec2,
    /// Per-vertex shading normals; `None` falls back to the geometric
    /// normal.
    pub shading_normals: Option<[Vec3; 3]>,
    /// Geometric normal; zero for degenerate triangles, which never
    /// report hits.
    pub normal: Vec3,
    pub material: u32,
}

impl PreparedTriangle {
    #[must_use]
    pub fn new(
        vertices: [Vec3; 3],
        texcoords: [Vec2; 3],
        shading_normals: Option<[Vec3; 3]>,
        material: u32,
    ) -> Self {
        let [v0, v1, v2] = vertices;
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            t0: texcoords[0],
            t1: texcoords[1],
            t2: texcoords[2],
            shading_normals,
            normal: e1.cross(e2).normalize_or_zero(),
            material,
        }
    }

    /// Möller–Trumbore. Returns the parametric distance and barycentric
    /// coordinates (u toward v1, v toward v2) of the nearest positive
    /// hit. Degenerate triangles and NaN geometry fall out through the
    /// determinant guard.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, Vec2)> {
        let direction = ray.direction3();
        let p = direction.cross(self.e2);
        let det = self.e1.dot(p);
        if det.abs() <= DET_EPSILON || det.is_nan() {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = ray.origin3() - self.v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(self.e1);
        let v = direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = self.e2.dot(q) * inv_det;
        if t > 0.0 && t.is_finite() {
            Some((t, Vec2::new(u, v)))
        } else {
            None
        }
    }

    #[must_use]
    pub fn area(&self) -> f32 {
        self.e1.cross(self.e2).length() * 0.5
    }

    #[must_use]
    pub fn aabb(&self) -> Aabb {
        let mut bounds = Aabb::point(self.v0);
        bounds.encapsulate(self.v1);
        bounds.encapsulate(self.v2);
        bounds
    }

    /// World position at barycentric coordinates.
    #[inline]
    #[must_use]
    pub fn position(&self, uv: Vec2) -> Vec3 {
        self.v0 + self.e1 * uv.x + self.e2 * uv.y
    }

    /// Interpolated texture coordinate.
    #[inline]
    #[must_use]
    pub fn texcoord(&self, uv: Vec2) -> Vec2 {
        self.t0 * (1.0 - uv.x - uv.y) + self.t1 * uv.x + self.t2 * uv.y
    }

    /// Interpolated shading normal, or the geometric normal when the
    /// mesh carried none.
    #[must_use]
    pub fn shading_normal(&self, uv: Vec2) -> Vec3 {
        match &self.shading_normals {
            Some([n0, n1, n2]) => {
                (*n0 * (1.0 - uv.x - uv.y) + *n1 * uv.x + *n2 * uv.y).normalize_or(self.normal)
            }
            None => self.normal,
        }
    }

    /// Uniform point on the triangle. Returns the position and the
    /// geometric normal; the area density is `1 / area()`.
    #[must_use]
    pub fn sample_point(&self, u: Vec2) -> (Vec3, Vec3) {
        let b = warp::square_to_triangle(u);
        (self.position(b), self.normal)
    }

    /// Splits into four sub-triangles by edge midpoints, interpolating
    /// texcoords and shading normals.
    #[must_use]
    pub fn split4(&self) -> [Self; 4] {
        let m01 = (self.v0 + self.v1) * 0.5;
        let m12 = (self.v1 + self.v2) * 0.5;
        let m02 = (self.v0 + self.v2) * 0.5;
        let t01 = (self.t0 + self.t1) * 0.5;
        let t12 = (self.t1 + self.t2) * 0.5;
        let t02 = (self.t0 + self.t2) * 0.5;
        let mid_normal = |a: usize, b: usize| {
            self.shading_normals
                .map(|n| (n[a] + n[b]).normalize_or(self.normal))
        };
        let n01 = mid_normal(0, 1);
        let n12 = mid_normal(1, 2);
        let n02 = mid_normal(0, 2);
        let corner = |verts: [Vec3; 3], tex: [Vec2; 3], normals: Option<[Vec3; 3]>| {
            Self::new(verts, tex, normals, self.material)
        };
        let n = self.shading_normals;
        [
            corner(
                [self.v0, m01, m02],
                [self.t0, t01, t02],
                n.map(|n| [n[0], n01.unwrap(), n02.unwrap()]),
            ),
            corner(
                [m01, self.v1, m12],
                [t01, self.t1, t12],
                n.map(|n| [n01.unwrap(), n[1], n12.unwrap()]),
            ),
            corner(
                [m02, m12, self.v2],
                [t02, t12, self.t2],
                n.map(|n| [n02.unwrap(), n12.unwrap(), n[2]]),
            ),
            corner(
                [m01, m12, m02],
                [t01, t12, t02],
                n.map(|_| [n01.unwrap(), n12.unwrap(), n02.unwrap()]),
            ),
        ]
    }
}
