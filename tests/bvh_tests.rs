//! Aggregate tests
//!
//! Tests for:
//! - Token packing round trips
//! - BVH construction shape (node count, depth, 32-byte nodes)
//! - Trace parity between the hierarchy and the linear oracle
//! - Occlusion and trace-cost queries

use glam::{Vec2, Vec3};
use prism::accel::{Bvh, LinearAggregator, Token, TokenKind, TraceQuery};
use prism::math::{Aabb, Ray};
use prism::prepared::{PreparedSphere, PreparedTriangle};
use prism::sampling::HashRng;

fn random_vec3(rng: &mut HashRng, scale: f32) -> Vec3 {
    Vec3::new(
        (rng.next_f32() - 0.5) * scale,
        (rng.next_f32() - 0.5) * scale,
        (rng.next_f32() - 0.5) * scale,
    )
}

fn random_triangles(count: usize, seed: u64) -> Vec<PreparedTriangle> {
    let mut rng = HashRng::new(seed);
    (0..count)
        .map(|_| {
            let anchor = random_vec3(&mut rng, 20.0);
            PreparedTriangle::new(
                [
                    anchor,
                    anchor + random_vec3(&mut rng, 2.0),
                    anchor + random_vec3(&mut rng, 2.0),
                ],
                [Vec2::ZERO, Vec2::X, Vec2::Y],
                None,
                0,
            )
        })
        .collect()
}

fn build_over(triangles: &[PreparedTriangle], spheres: &[PreparedSphere]) -> (Bvh, Vec<Token>) {
    let mut aabbs: Vec<Aabb> = triangles.iter().map(PreparedTriangle::aabb).collect();
    let mut tokens: Vec<Token> = (0..triangles.len()).map(Token::triangle).collect();
    for (index, sphere) in spheres.iter().enumerate() {
        aabbs.push(sphere.aabb());
        tokens.push(Token::sphere(index));
    }
    (Bvh::build(&aabbs, &tokens), tokens)
}

// ============================================================================
// Token
// ============================================================================

#[test]
fn token_round_trips() {
    let t = Token::triangle(12345);
    assert_eq!(t.kind(), TokenKind::Triangle);
    assert_eq!(t.index(), 12345);
    assert!(t.is_geometry());

    let s = Token::sphere(7);
    assert_eq!(s.kind(), TokenKind::Sphere);
    assert_eq!(s.index(), 7);

    let n = Token::node(0);
    assert_eq!(n.kind(), TokenKind::Node);
    assert!(!n.is_geometry());

    assert_ne!(Token::triangle(1), Token::sphere(1));
    assert_ne!(Token::NONE, Token::triangle(0));
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn bvh_node_is_half_a_cache_line() {
    assert_eq!(std::mem::size_of::<prism::accel::BvhNode>(), 32);
}

#[test]
fn bvh_build_shape() {
    let triangles = random_triangles(100, 1);
    let (bvh, _) = build_over(&triangles, &[]);
    // One primitive per leaf: a binary tree over n leaves.
    assert_eq!(bvh.node_count(), 2 * 100 - 1);
    assert!(bvh.max_depth() >= 7);
    assert!(bvh.max_depth() < 64);
    assert!(bvh.bounds().is_valid());
}

#[test]
fn bvh_empty_build() {
    let bvh = Bvh::build(&[], &[]);
    assert_eq!(bvh.node_count(), 0);
    let mut query = TraceQuery::new(Ray::new(Vec3::ZERO, Vec3::Z));
    bvh.trace(&[], &[], &mut query);
    assert!(!query.hit());
    assert_eq!(bvh.trace_cost(&Ray::new(Vec3::ZERO, Vec3::Z)), 0);
}

#[test]
fn bvh_single_primitive() {
    let triangles = random_triangles(1, 2);
    let (bvh, _) = build_over(&triangles, &[]);
    assert_eq!(bvh.node_count(), 1);
    assert_eq!(bvh.max_depth(), 1);
}

// ============================================================================
// Parity with the linear oracle
// ============================================================================

#[test]
fn bvh_matches_linear_tracer() {
    let triangles = random_triangles(500, 3);
    let spheres: Vec<PreparedSphere> = {
        let mut rng = HashRng::new(4);
        (0..50)
            .map(|_| {
                PreparedSphere::new(random_vec3(&mut rng, 20.0), rng.next_f32() * 1.5 + 0.1, 0)
            })
            .collect()
    };
    let (bvh, tokens) = build_over(&triangles, &spheres);
    let linear = LinearAggregator::new(tokens);

    let mut rng = HashRng::new(5);
    let mut hits = 0;
    for _ in 0..100 {
        let origin = random_vec3(&mut rng, 50.0);
        let direction = random_vec3(&mut rng, 2.0).normalize_or(Vec3::Z);
        let ray = Ray::new(origin, direction);

        let mut from_bvh = TraceQuery::new(ray);
        bvh.trace(&triangles, &spheres, &mut from_bvh);
        let mut from_linear = TraceQuery::new(ray);
        linear.trace(&triangles, &spheres, &mut from_linear);

        assert_eq!(from_bvh.hit(), from_linear.hit());
        if from_bvh.hit() {
            hits += 1;
            assert_eq!(from_bvh.token, from_linear.token);
            assert!((from_bvh.distance - from_linear.distance).abs() < 1e-5);
            assert!((from_bvh.uv - from_linear.uv).length() < 1e-5);
        }
    }
    // The cloud is dense enough that a decent share of rays connect.
    assert!(hits > 10, "only {hits} rays hit; scene setup is broken");
}

#[test]
fn bvh_respects_distance_bound_and_ignore() {
    let triangles = vec![
        PreparedTriangle::new(
            [
                Vec3::new(-1.0, -1.0, 2.0),
                Vec3::new(1.0, -1.0, 2.0),
                Vec3::new(0.0, 1.0, 2.0),
            ],
            [Vec2::ZERO, Vec2::X, Vec2::Y],
            None,
            0,
        ),
        PreparedTriangle::new(
            [
                Vec3::new(-1.0, -1.0, 5.0),
                Vec3::new(1.0, -1.0, 5.0),
                Vec3::new(0.0, 1.0, 5.0),
            ],
            [Vec2::ZERO, Vec2::X, Vec2::Y],
            None,
            0,
        ),
    ];
    let (bvh, _) = build_over(&triangles, &[]);
    let ray = Ray::new(Vec3::new(0.0, -0.5, 0.0), Vec3::Z);

    let mut nearest = TraceQuery::new(ray);
    bvh.trace(&triangles, &[], &mut nearest);
    assert_eq!(nearest.token, Token::triangle(0));
    assert!((nearest.distance - 2.0).abs() < 1e-5);

    // Ignoring the near triangle exposes the far one.
    let mut skipped = TraceQuery::new(ray);
    skipped.ignore = Token::triangle(0);
    bvh.trace(&triangles, &[], &mut skipped);
    assert_eq!(skipped.token, Token::triangle(1));

    // A bound tighter than the nearest hit reports a miss.
    let mut bounded = TraceQuery::bounded(ray, 1.5);
    bvh.trace(&triangles, &[], &mut bounded);
    assert!(!bounded.hit());
}

// ============================================================================
// Occlusion and cost
// ============================================================================

#[test]
fn occlude_agrees_with_trace() {
    let triangles = random_triangles(200, 6);
    let (bvh, tokens) = build_over(&triangles, &[]);
    let linear = LinearAggregator::new(tokens);

    let mut rng = HashRng::new(8);
    for _ in 0..200 {
        let origin = random_vec3(&mut rng, 40.0);
        let direction = random_vec3(&mut rng, 2.0).normalize_or(Vec3::Z);
        let travel = rng.next_f32() * 60.0;
        let ray = Ray::new(origin, direction);

        let mut query = TraceQuery::new(ray);
        bvh.trace(&triangles, &[], &mut query);
        let expected = query.hit() && query.distance < travel;

        assert_eq!(
            bvh.occlude(&triangles, &[], &ray, travel, Token::NONE),
            expected
        );
        assert_eq!(
            linear.occlude(&triangles, &[], &ray, travel, Token::NONE),
            expected
        );
    }
}

#[test]
fn trace_cost_grows_into_the_tree() {
    let triangles = random_triangles(256, 9);
    let (bvh, _) = build_over(&triangles, &[]);
    // A ray through the cloud costs more than one that misses the
    // root bounds entirely.
    let through = Ray::new(Vec3::new(-50.0, 0.0, 0.0), Vec3::X);
    let away = Ray::new(Vec3::new(-50.0, 0.0, 0.0), -Vec3::X);
    assert!(bvh.trace_cost(&through) > bvh.trace_cost(&away));
    assert_eq!(bvh.trace_cost(&away), 1);
}
