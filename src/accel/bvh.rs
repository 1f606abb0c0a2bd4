use glam::Vec2;
use smallvec::SmallVec;

use crate::accel::builder::Builder;
use crate::accel::{BvhNode, Token, TokenKind};
use crate::math::{Aabb, Ray};
use crate::prepared::{PreparedSphere, PreparedTriangle};

/// A ray-trace request and its running result.
///
/// `distance` starts at the caller's upper bound (usually infinity) and
/// shrinks as closer geometry is found; `token` and `uv` are only
/// meaningful when [`TraceQuery::hit`] reports true.
#[derive(Debug, Clone, Copy)]
pub struct TraceQuery {
    pub ray: Ray,
    pub distance: f32,
    pub token: Token,
    pub uv: Vec2,
    /// Geometry excluded from the query, typically the primitive the
    /// ray was spawned from.
    pub ignore: Token,
}

impl TraceQuery {
    #[must_use]
    pub fn new(ray: Ray) -> Self {
        Self::bounded(ray, f32::INFINITY)
    }

    /// A query that only accepts hits closer than `limit`.
    #[must_use]
    pub fn bounded(ray: Ray, limit: f32) -> Self {
        Self {
            ray,
            distance: limit,
            token: Token::NONE,
            uv: Vec2::ZERO,
            ignore: Token::NONE,
        }
    }

    #[inline]
    #[must_use]
    pub fn hit(&self) -> bool {
        self.token != Token::NONE
    }
}

/// Attempts the geometry behind a token and shortens the query on a
/// closer hit.
#[inline]
pub(super) fn intersect_token(
    token: Token,
    triangles: &[PreparedTriangle],
    spheres: &[PreparedSphere],
    query: &mut TraceQuery,
) {
    if token == query.ignore {
        return;
    }
    let hit = match token.kind() {
        TokenKind::Triangle => triangles[token.index()].intersect(&query.ray),
        TokenKind::Sphere => spheres[token.index()].intersect(&query.ray),
        TokenKind::Node | TokenKind::Instance => {
            debug_assert!(false, "geometry token expected, got {token:?}");
            None
        }
    };
    if let Some((t, uv)) = hit {
        if t < query.distance {
            query.distance = t;
            query.token = token;
            query.uv = uv;
        }
    }
}

/// The bounding volume hierarchy.
pub struct Bvh {
    nodes: Vec<BvhNode>,
    max_depth: u32,
}

impl Bvh {
    /// Builds the hierarchy over parallel arrays of bounds and geometry
    /// tokens.
    #[must_use]
    pub fn build(aabbs: &[Aabb], tokens: &[Token]) -> Self {
        let (nodes, max_depth) = Builder::build(aabbs, tokens);
        Self { nodes, max_depth }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Bounds of everything in the hierarchy.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, BvhNode::bounds)
    }

    /// Finds the nearest hit along the query ray.
    ///
    /// Children are visited near-to-far and whole subtrees are pruned
    /// once their entry distance exceeds the best hit so far.
    pub fn trace(
        &self,
        triangles: &[PreparedTriangle],
        spheres: &[PreparedSphere],
        query: &mut TraceQuery,
    ) {
        if self.nodes.is_empty() {
            return;
        }
        let entry = self.nodes[0].intersect(&query.ray);
        if entry >= query.distance {
            return;
        }

        let mut stack: SmallVec<[(u32, f32); 48]> = SmallVec::new();
        stack.push((0, entry));
        while let Some((index, entry)) = stack.pop() {
            if entry >= query.distance {
                continue;
            }
            let node = &self.nodes[index as usize];
            if node.token.kind() == TokenKind::Node {
                let first = node.token.index() as u32;
                let near = self.nodes[first as usize].intersect(&query.ray);
                let far = self.nodes[first as usize + 1].intersect(&query.ray);
                // Push the farther child first so the nearer one pops next.
                let ((near_child, near_t), (far_child, far_t)) = if near <= far {
                    ((first, near), (first + 1, far))
                } else {
                    ((first + 1, far), (first, near))
                };
                if far_t < query.distance {
                    stack.push((far_child, far_t));
                }
                if near_t < query.distance {
                    stack.push((near_child, near_t));
                }
            } else {
                intersect_token(node.token, triangles, spheres, query);
            }
        }
    }

    /// Whether anything lies within `travel` along the ray. Stops at
    /// the first hit without tracking the nearest one.
    #[must_use]
    pub fn occlude(
        &self,
        triangles: &[PreparedTriangle],
        spheres: &[PreparedSphere],
        ray: &Ray,
        travel: f32,
        ignore: Token,
    ) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        if self.nodes[0].intersect(ray) >= travel {
            return false;
        }

        let mut stack: SmallVec<[u32; 48]> = SmallVec::new();
        stack.push(0);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.token.kind() == TokenKind::Node {
                let first = node.token.index() as u32;
                for child in [first, first + 1] {
                    if self.nodes[child as usize].intersect(ray) < travel {
                        stack.push(child);
                    }
                }
            } else if node.token != ignore {
                let mut probe = TraceQuery::bounded(*ray, travel);
                probe.ignore = ignore;
                intersect_token(node.token, triangles, spheres, &mut probe);
                if probe.hit() {
                    return true;
                }
            }
        }
        false
    }

    /// Counts the box tests a trace of this ray performs, as a rough
    /// per-ray work metric.
    #[must_use]
    pub fn trace_cost(&self, ray: &Ray) -> u32 {
        if self.nodes.is_empty() {
            return 0;
        }
        self.cost_of(0, ray)
    }

    fn cost_of(&self, index: usize, ray: &Ray) -> u32 {
        let node = &self.nodes[index];
        if node.intersect(ray).is_infinite() {
            return 1;
        }
        match node.token.kind() {
            TokenKind::Node => {
                let first = node.token.index();
                1 + self.cost_of(first, ray) + self.cost_of(first + 1, ray)
            }
            _ => 1,
        }
    }

    /// The raw node array, for inspection and tests.
    #[must_use]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }
}
