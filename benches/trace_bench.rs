use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::{Vec2, Vec3};
use prism::accel::{Bvh, Token, TraceQuery};
use prism::math::{Aabb, Ray};
use prism::prepared::PreparedTriangle;
use prism::sampling::HashRng;

fn random_vec3(rng: &mut HashRng, scale: f32) -> Vec3 {
    Vec3::new(
        (rng.next_f32() - 0.5) * scale,
        (rng.next_f32() - 0.5) * scale,
        (rng.next_f32() - 0.5) * scale,
    )
}

fn triangle_cloud(count: usize) -> Vec<PreparedTriangle> {
    let mut rng = HashRng::new(1);
    (0..count)
        .map(|_| {
            let anchor = random_vec3(&mut rng, 30.0);
            PreparedTriangle::new(
                [
                    anchor,
                    anchor + random_vec3(&mut rng, 1.5),
                    anchor + random_vec3(&mut rng, 1.5),
                ],
                [Vec2::ZERO, Vec2::X, Vec2::Y],
                None,
                0,
            )
        })
        .collect()
}

fn bench_trace(c: &mut Criterion) {
    let triangles = triangle_cloud(10_000);
    let aabbs: Vec<Aabb> = triangles.iter().map(PreparedTriangle::aabb).collect();
    let tokens: Vec<Token> = (0..triangles.len()).map(Token::triangle).collect();
    let bvh = Bvh::build(&aabbs, &tokens);

    let mut rng = HashRng::new(2);
    let rays: Vec<Ray> = (0..1024)
        .map(|_| {
            Ray::new(
                random_vec3(&mut rng, 60.0),
                random_vec3(&mut rng, 2.0).normalize_or(Vec3::Z),
            )
        })
        .collect();

    c.bench_function("bvh_trace_10k", |b| {
        let mut cursor = 0;
        b.iter(|| {
            let ray = rays[cursor % rays.len()];
            cursor += 1;
            let mut query = TraceQuery::new(ray);
            bvh.trace(&triangles, &[], &mut query);
            black_box(query.distance)
        });
    });

    c.bench_function("bvh_occlude_10k", |b| {
        let mut cursor = 0;
        b.iter(|| {
            let ray = rays[cursor % rays.len()];
            cursor += 1;
            black_box(bvh.occlude(&triangles, &[], &ray, 40.0, Token::NONE))
        });
    });
}

fn bench_build(c: &mut Criterion) {
    let triangles = triangle_cloud(10_000);
    let aabbs: Vec<Aabb> = triangles.iter().map(PreparedTriangle::aabb).collect();
    let tokens: Vec<Token> = (0..triangles.len()).map(Token::triangle).collect();

    c.bench_function("bvh_build_10k", |b| {
        b.iter(|| black_box(Bvh::build(&aabbs, &tokens).node_count()));
    });
}

criterion_group!(benches, bench_trace, bench_build);
criterion_main!(benches);
