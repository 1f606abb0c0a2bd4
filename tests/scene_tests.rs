//! Scene graph and pressing tests
//!
//! Tests for:
//! - Transform composition and validation failures
//! - World-transform traversal
//! - Primitive extraction, material registry dedup
//! - Large-triangle fragmentation
//! - Light gathering and the power distribution

use std::sync::Arc;

use glam::{Quat, Vec2, Vec3, Vec4};
use prism::accel::TraceQuery;
use prism::math::Ray;
use prism::prepared::{PreparedLight, PreparedScene};
use prism::resources::primitives::{create_plane, PlaneOptions};
use prism::scene::{Camera, Geometry, Light, Node, Scene, Transform};
use prism::{
    ConstantEnvironment, Matte, Mesh, PrismError, RenderProfile, Texture, TextureRef, WrapMode,
};

fn profile() -> RenderProfile {
    RenderProfile {
        worker_size: 1,
        ..RenderProfile::default()
    }
}

fn camera_node() -> Node {
    Node::new("camera").with_camera(Camera::new_perspective(60.0))
}

fn matte() -> Arc<dyn prism::Material> {
    Arc::new(Matte::new(Vec4::new(0.8, 0.8, 0.8, 1.0)))
}

// ============================================================================
// Transform and validation
// ============================================================================

#[test]
fn transform_composes_trs() {
    let mut transform = Transform::new();
    transform.position = Vec3::new(1.0, 2.0, 3.0);
    transform.scale = Vec3::splat(2.0);
    let m = transform.local_matrix();
    let p = m.transform_point3(Vec3::X);
    assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-5);
}

#[test]
fn look_at_faces_target() {
    let mut transform = Transform::from_position(Vec3::new(0.0, 0.0, 5.0));
    transform.look_at(Vec3::ZERO, Vec3::Y);
    let forward = transform.local_matrix().transform_vector3(-Vec3::Z);
    assert!((forward - -Vec3::Z).length() < 1e-4);
}

#[test]
fn non_positive_scale_is_rejected() {
    let mut scene = Scene::new();
    scene.add(camera_node());
    let mut bad = Node::new("bad");
    bad.transform.scale = Vec3::new(1.0, -1.0, 1.0);
    scene.add(bad);
    assert!(matches!(
        PreparedScene::build(&scene, &profile(), 1.0),
        Err(PrismError::InvalidScene(_))
    ));
}

#[test]
fn non_unit_rotation_is_rejected() {
    let mut scene = Scene::new();
    scene.add(camera_node());
    let mut bad = Node::new("bad");
    bad.transform.rotation = Quat::from_xyzw(0.5, 0.5, 0.5, 2.0);
    scene.add(bad);
    assert!(matches!(
        PreparedScene::build(&scene, &profile(), 1.0),
        Err(PrismError::InvalidScene(_))
    ));
}

#[test]
fn missing_camera_is_rejected() {
    let scene = Scene::new();
    assert!(matches!(
        PreparedScene::build(&scene, &profile(), 1.0),
        Err(PrismError::InvalidScene(_))
    ));
}

#[test]
fn world_transforms_accumulate() {
    let mut scene = Scene::new();
    let mut parent = Node::new("parent");
    parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
    let mut child = Node::new("child");
    child.transform.position = Vec3::new(0.0, 2.0, 0.0);
    parent.add_child(child);
    scene.add(parent);

    let mut seen = None;
    scene.visit(|node, world| {
        if node.name == "child" {
            seen = Some(world.transform_point3(Vec3::ZERO));
        }
    });
    assert!((seen.unwrap() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn pressing_extracts_and_transforms_primitives() {
    let mut scene = Scene::new();
    scene.add(camera_node());

    let plane = Arc::new(create_plane(PlaneOptions {
        width: 2.0,
        height: 2.0,
    }));
    let material = matte();
    let mut floor = Node::new("floor").with_renderable(Geometry::Mesh(plane), Arc::clone(&material));
    floor.transform.position = Vec3::new(0.0, -1.0, 0.0);
    scene.add(floor);

    let mut ball = Node::new("ball").with_renderable(Geometry::Sphere { radius: 0.5 }, material);
    ball.transform.position = Vec3::new(0.0, 0.0, -3.0);
    ball.transform.scale = Vec3::splat(2.0);
    scene.add(ball);

    let prepared = PreparedScene::build(&scene, &profile(), 1.0).unwrap();
    assert_eq!(prepared.triangle_count(), 2);
    assert_eq!(prepared.sphere_count(), 1);
    // Shared material registered once.
    let g = prepared.geometry();
    assert_eq!(g.triangles[0].material, g.spheres[0].material);
    // Uniform scale doubles the sphere radius.
    assert!((g.spheres[0].radius - 1.0).abs() < 1e-5);
    assert!((g.spheres[0].center - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);

    // The pressed plane sits at y = -1 in world space.
    let mut query = TraceQuery::new(Ray::new(Vec3::new(0.3, 2.0, 0.3), -Vec3::Y));
    prepared.trace(&mut query);
    assert!(query.hit());
    assert!((query.distance - 3.0).abs() < 1e-4);
}

#[test]
fn non_uniform_sphere_scale_is_rejected() {
    let mut scene = Scene::new();
    scene.add(camera_node());
    let mut squashed = Node::new("squashed").with_renderable(Geometry::Sphere { radius: 1.0 }, matte());
    squashed.transform.scale = Vec3::new(1.0, 2.0, 1.0);
    scene.add(squashed);
    assert!(matches!(
        PreparedScene::build(&scene, &profile(), 1.0),
        Err(PrismError::InvalidScene(_))
    ));
}

#[test]
fn interact_reports_surface_data() {
    let mut scene = Scene::new();
    scene.add(camera_node());
    let plane = Arc::new(create_plane(PlaneOptions::default()));
    scene.add(Node::new("floor").with_renderable(Geometry::Mesh(plane), matte()));
    let prepared = PreparedScene::build(&scene, &profile(), 1.0).unwrap();

    let mut query = TraceQuery::new(Ray::new(Vec3::new(0.1, 1.0, 0.1), -Vec3::Y));
    prepared.trace(&mut query);
    assert!(query.hit());
    let touch = prepared.interact(&query);
    assert!((touch.point - Vec3::new(0.1, 0.0, 0.1)).length() < 1e-4);
    assert!((touch.normal - Vec3::Y).length() < 1e-4);
    assert!((touch.shading_normal - Vec3::Y).length() < 1e-4);
    assert!((touch.outgoing - Vec3::Y).length() < 1e-5);
}

// ============================================================================
// Fragmentation
// ============================================================================

#[test]
fn oversized_triangles_fragment() {
    let mut scene = Scene::new();
    scene.add(camera_node());

    // Many small triangles and one enormous one: the big one is far
    // beyond the mean-area threshold and must subdivide.
    let mut mesh = Mesh::new();
    for i in 0..32 {
        let x = i as f32 * 0.01;
        let base = mesh.positions.len() as u32;
        mesh.positions.extend_from_slice(&[
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(x + 0.005, 0.0, 0.0),
            Vec3::new(x, 0.005, 0.0),
        ]);
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    let base = mesh.positions.len() as u32;
    mesh.positions.extend_from_slice(&[
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::new(10.0, 0.0, 5.0),
        Vec3::new(0.0, 10.0, 5.0),
    ]);
    mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);

    scene.add(Node::new("mesh").with_renderable(Geometry::Mesh(Arc::new(mesh)), matte()));

    let prepared = PreparedScene::build(&scene, &profile(), 1.0).unwrap();
    // Clamped at three levels: the giant becomes 4^3 children.
    assert_eq!(prepared.triangle_count(), 32 + 64);

    // Fragmentation preserves the surface: a ray that hit the big
    // triangle still hits at the same depth.
    let mut query = TraceQuery::new(Ray::new(Vec3::new(2.0, 2.0, 0.0), Vec3::Z));
    prepared.trace(&mut query);
    assert!(query.hit());
    assert!((query.distance - 5.0).abs() < 1e-4);
}

#[test]
fn fragmentation_can_be_disabled() {
    let mut scene = Scene::new();
    scene.add(camera_node());
    let mut mesh = Mesh::new();
    mesh.positions = vec![Vec3::ZERO, Vec3::X * 100.0, Vec3::Y * 100.0];
    mesh.indices = vec![0, 1, 2];
    scene.add(Node::new("big").with_renderable(Geometry::Mesh(Arc::new(mesh)), matte()));

    let mut no_fragment = profile();
    no_fragment.fragment_max_iterations = 0;
    let prepared = PreparedScene::build(&scene, &no_fragment, 1.0).unwrap();
    assert_eq!(prepared.triangle_count(), 1);
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn lights_are_gathered_and_weighted_by_power() {
    let mut scene = Scene::new();
    scene.add(camera_node());
    scene.add(
        Node::new("sun")
            .with_transform(Transform::from_position(Vec3::new(0.0, 10.0, 0.0)))
            .with_light(Light::new_point(Vec3::splat(100.0))),
    );
    scene.add(
        Node::new("spark")
            .with_transform(Transform::from_position(Vec3::new(3.0, 1.0, 0.0)))
            .with_light(Light::new_point(Vec3::splat(0.001))),
    );
    scene.add(Node::new("sky").with_light(Light::new_ambient(Arc::new(
        ConstantEnvironment::new(Vec3::splat(0.0)),
    ))));

    let prepared = PreparedScene::build(&scene, &profile(), 1.0).unwrap();
    assert_eq!(prepared.lights().len(), 3);

    // The bright point light dominates the distribution.
    let mut bright = 0;
    for i in 0..100 {
        let (index, pdf) = prepared
            .light_distribution()
            .sample((i as f32 + 0.5) / 100.0)
            .unwrap();
        assert!(pdf > 0.0);
        if matches!(
            prepared.lights()[index],
            PreparedLight::Point { intensity, .. } if intensity.x > 1.0
        ) {
            bright += 1;
        }
    }
    assert!(bright > 95);
}

#[test]
fn area_light_attaches_to_extracted_primitives() {
    let mut scene = Scene::new();
    scene.add(camera_node());
    let plane = Arc::new(create_plane(PlaneOptions::default()));
    let emissive: Arc<dyn prism::Material> =
        Arc::new(prism::Emissive::new(Vec4::new(5.0, 5.0, 5.0, 1.0)));
    scene.add(
        Node::new("panel")
            .with_renderable(Geometry::Mesh(plane), emissive)
            .with_light(Light::new_area(Vec3::splat(5.0))),
    );

    let prepared = PreparedScene::build(&scene, &profile(), 1.0).unwrap();
    let area_lights = prepared
        .lights()
        .iter()
        .filter(|l| matches!(l, PreparedLight::Area { .. }))
        .count();
    // One per extracted triangle of the quad.
    assert_eq!(area_lights, 2);

    // Sampling the light from above yields a downward incident ray
    // with a finite travel and positive density.
    let light = prepared
        .lights()
        .iter()
        .find(|l| matches!(l, PreparedLight::Area { .. }))
        .unwrap();
    let sample = light.sample(Vec3::new(0.0, 2.0, 0.0), Vec2::new(0.3, 0.4), prepared.geometry());
    assert!(sample.pdf > 0.0);
    assert!(sample.travel.is_finite());
    assert!(sample.incident.y < 0.0);
    assert_eq!(sample.radiance, Vec3::splat(5.0));
}

// ============================================================================
// Textures
// ============================================================================

#[test]
fn texture_wrap_modes() {
    let texels = vec![
        Vec4::new(1.0, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 1.0, 0.0, 1.0),
    ];
    let repeat = Texture::from_pixels(2, 1, texels.clone(), WrapMode::Repeat);
    assert_eq!(repeat.texel(2, 0), repeat.texel(0, 0));
    assert_eq!(repeat.texel(-1, 0), repeat.texel(1, 0));

    let clamp = Texture::from_pixels(2, 1, texels, WrapMode::Clamp);
    assert_eq!(clamp.texel(5, 0), clamp.texel(1, 0));
    assert_eq!(clamp.texel(-5, 0), clamp.texel(0, 0));
}

#[test]
fn texture_bilinear_blends() {
    let texture = Texture::from_pixels(
        2,
        1,
        vec![Vec4::ZERO, Vec4::ONE],
        WrapMode::Clamp,
    );
    let mid = texture.sample_2d(Vec2::new(0.5, 0.5));
    assert!((mid.x - 0.5).abs() < 1e-5);
}

#[test]
fn constant_detection() {
    assert!(Texture::solid(Vec4::ONE).is_constant());
    assert!(TextureRef::Constant(Vec4::ONE).is_constant());
    let varied = Texture::from_pixels(2, 1, vec![Vec4::ZERO, Vec4::ONE], WrapMode::Repeat);
    assert!(!varied.is_constant());
}

#[test]
fn normal_map_identity_texel_keeps_the_normal() {
    let flat = Arc::new(Texture::solid(Vec4::new(0.5, 0.5, 1.0, 1.0)));
    let map = prism::NormalMap::new(flat);
    let normal = Vec3::new(0.3, -0.2, 0.933).normalize();
    let mapped = map.apply(Vec2::new(0.5, 0.5), normal);
    assert!((mapped - normal).length() < 1e-4);
}

// ============================================================================
// Environments
// ============================================================================

#[test]
fn equirect_environment_importance_samples_bright_texels() {
    use prism::resources::DirectionalTexture;

    // 4x2 map with a single bright texel on the upper row.
    let mut texels = vec![Vec4::ZERO; 8];
    texels[1] = Vec4::new(10.0, 10.0, 10.0, 1.0);
    let env = prism::EquirectEnvironment::new(Texture::from_pixels(
        4,
        2,
        texels,
        WrapMode::Repeat,
    ));
    assert!(env.average().x > 0.0);

    let mut rng = prism::sampling::HashRng::new(71);
    for _ in 0..64 {
        let sample = env.sample(Vec2::new(rng.next_f32(), rng.next_f32()));
        assert!(sample.pdf > 0.0);
        assert!(sample.radiance.max_element() > 0.0);
        assert!((sample.direction.length() - 1.0).abs() < 1e-4);
        // The standalone density query agrees with the draw.
        let pdf = env.pdf(sample.direction);
        assert!((pdf - sample.pdf).abs() / sample.pdf.max(1.0) < 2e-2);
    }
}

#[test]
fn cubemap_environment_picks_major_axis_face() {
    use prism::resources::{CubemapEnvironment, DirectionalTexture};

    let face = |v: f32| Texture::solid(Vec4::new(v, 0.0, 0.0, 1.0));
    let env = CubemapEnvironment::new([
        face(1.0),
        face(2.0),
        face(3.0),
        face(4.0),
        face(5.0),
        face(6.0),
    ]);
    assert!((env.evaluate(Vec3::X).x - 1.0).abs() < 1e-6);
    assert!((env.evaluate(-Vec3::X).x - 2.0).abs() < 1e-6);
    assert!((env.evaluate(Vec3::Y).x - 3.0).abs() < 1e-6);
    assert!((env.evaluate(-Vec3::Y).x - 4.0).abs() < 1e-6);
    assert!((env.evaluate(Vec3::Z).x - 5.0).abs() < 1e-6);
    assert!((env.evaluate(-Vec3::Z).x - 6.0).abs() < 1e-6);
    assert!((env.average().x - 3.5).abs() < 1e-5);
}
