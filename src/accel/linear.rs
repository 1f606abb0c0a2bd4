use crate::accel::bvh::intersect_token;
use crate::accel::{Token, TraceQuery};
use crate::math::Ray;
use crate::prepared::{PreparedSphere, PreparedTriangle};

/// A brute-force aggregate that attempts every primitive.
///
/// Useful for tiny scenes and as the oracle the hierarchy is checked
/// against: both aggregates must report the same token, distance and
/// surface coordinates for any query.
pub struct LinearAggregator {
    tokens: Vec<Token>,
}

impl LinearAggregator {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn trace(
        &self,
        triangles: &[PreparedTriangle],
        spheres: &[PreparedSphere],
        query: &mut TraceQuery,
    ) {
        for &token in &self.tokens {
            intersect_token(token, triangles, spheres, query);
        }
    }

    #[must_use]
    pub fn occlude(
        &self,
        triangles: &[PreparedTriangle],
        spheres: &[PreparedSphere],
        ray: &Ray,
        travel: f32,
        ignore: Token,
    ) -> bool {
        let mut probe = TraceQuery::bounded(*ray, travel);
        probe.ignore = ignore;
        for &token in &self.tokens {
            intersect_token(token, triangles, spheres, &mut probe);
            if probe.hit() {
                return true;
            }
        }
        false
    }
}
