//! Engine and scheduler tests
//!
//! Tests for:
//! - Profile validation
//! - End-to-end renders against analytical expectations
//! - Bit-exact determinism across runs
//! - The state machine: legal and illegal transitions, pause/resume
//! - Tile coverage and progress accounting

use std::sync::Arc;
use std::time::Duration;

use glam::{Vec3, Vec4};
use prism::render::tile;
use prism::scene::{Camera, Geometry, Light, Node, Scene, Transform};
use prism::{
    ConstantEnvironment, Engine, EngineState, Matte, PrismError, RenderBuffer, RenderProfile,
    Sampler,
};

fn camera_node() -> Node {
    Node::new("camera").with_camera(Camera::new_perspective(60.0))
}

fn ambient_scene(radiance: Vec3) -> Scene {
    let mut scene = Scene::new();
    scene.add(camera_node());
    scene.add(Node::new("sky").with_light(Light::new_ambient(Arc::new(
        ConstantEnvironment::new(radiance),
    ))));
    scene
}

fn quick_profile(samples: u32) -> RenderProfile {
    RenderProfile {
        worker_size: 2,
        base_samples: samples,
        adaptive_samples: samples,
        noise_threshold: 0.0,
        bounce_limit: 2,
        ..RenderProfile::default()
    }
}

fn build_engine(scene: &Scene, profile: &RenderProfile, width: u32, height: u32) -> Engine {
    let buffer = Arc::new(RenderBuffer::new(width, height).unwrap());
    let aspect = width as f32 / height as f32;
    let prepared = Arc::new(prism::PreparedScene::build(scene, profile, aspect).unwrap());
    Engine::new(prepared, buffer)
}

// ============================================================================
// Profile validation
// ============================================================================

#[test]
fn profile_rejects_bad_fields() {
    let ok = RenderProfile::default();
    assert!(ok.validate().is_ok());

    let zero_workers = RenderProfile {
        worker_size: 0,
        ..RenderProfile::default()
    };
    assert!(matches!(
        zero_workers.validate(),
        Err(PrismError::InvalidProfile(_))
    ));

    let inverted = RenderProfile {
        adaptive_samples: ok.base_samples - 1,
        ..RenderProfile::default()
    };
    assert!(inverted.validate().is_err());

    let negative_epsilon = RenderProfile {
        energy_epsilon: Vec3::new(-1.0, 0.0, 0.0),
        ..RenderProfile::default()
    };
    assert!(negative_epsilon.validate().is_err());

    let bad_fragment = RenderProfile {
        fragment_ratio: 0.0,
        ..RenderProfile::default()
    };
    assert!(bad_fragment.validate().is_err());
}

#[test]
fn buffer_rejects_zero_size() {
    assert!(matches!(
        RenderBuffer::new(0, 16),
        Err(PrismError::InvalidBuffer(_))
    ));
    assert!(matches!(
        RenderBuffer::new(16, 0),
        Err(PrismError::InvalidBuffer(_))
    ));
}

// ============================================================================
// End-to-end renders
// ============================================================================

#[test]
fn empty_scene_renders_flat_white() {
    let scene = ambient_scene(Vec3::ONE);
    let profile = quick_profile(1);
    let mut engine = build_engine(&scene, &profile, 16, 16);
    engine.begin(profile).unwrap();
    assert_eq!(engine.wait_for_render(), EngineState::Completed);

    let buffer = Arc::clone(engine.buffer());
    for pixel in buffer.resolve() {
        assert!((pixel - Vec4::ONE).length() < 1e-6, "pixel {pixel}");
    }
    let progress = engine.progress();
    assert_eq!(progress.pixels, 256);
    assert_eq!(progress.samples, 256);
    assert_eq!(progress.tiles, progress.total_tiles);
    assert!(progress.traces >= 256);
}

#[test]
fn lambert_sphere_under_point_light_matches_analytic_value() {
    // Sphere at (0, 0, -5), unit radius, albedo 0.8; point light at
    // (5, 5, 0) with intensity 100; no ambient. The center pixel sees
    // the sphere head on, so its value is the direct-lighting term
    // albedo/pi * intensity/d^2 * cos(theta).
    let mut scene = Scene::new();
    scene.add(camera_node());
    scene.add(
        Node::new("ball")
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -5.0)))
            .with_renderable(
                Geometry::Sphere { radius: 1.0 },
                Arc::new(Matte::new(Vec4::new(0.8, 0.8, 0.8, 1.0))),
            ),
    );
    scene.add(
        Node::new("light")
            .with_transform(Transform::from_position(Vec3::new(5.0, 5.0, 0.0)))
            .with_light(Light::new_point(Vec3::splat(100.0))),
    );

    let profile = RenderProfile {
        worker_size: 2,
        base_samples: 64,
        adaptive_samples: 64,
        noise_threshold: 0.0,
        bounce_limit: 3,
        ..RenderProfile::default()
    };
    let mut engine = build_engine(&scene, &profile, 64, 64);
    engine.begin(profile).unwrap();
    assert_eq!(engine.wait_for_render(), EngineState::Completed);

    // Hit point (0, 0, -4), normal (0, 0, 1), light direction toward
    // (5, 5, 0): distance^2 = 66, cos = 4 / sqrt(66).
    let expected = 0.8 / std::f32::consts::PI * (100.0 / 66.0) * (4.0 / 66.0_f32.sqrt());
    let center = engine.buffer().resolve_pixel(32, 32);
    assert!(
        (center.x - expected).abs() < expected * 0.06,
        "center {center}, expected {expected}"
    );
    assert!((center.x - center.y).abs() < 1e-6);
}

#[test]
fn lambert_sphere_under_white_ambient_converges_to_albedo() {
    // A diffuse sphere in a uniform white environment reflects its
    // albedo; the estimator must converge there without bias.
    let mut scene = ambient_scene(Vec3::ONE);
    scene.add(
        Node::new("ball")
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -4.0)))
            .with_renderable(
                Geometry::Sphere { radius: 1.0 },
                Arc::new(Matte::new(Vec4::new(0.5, 0.5, 0.5, 1.0))),
            ),
    );
    // Narrow field of view keeps every pixel on the sphere.
    scene.root.children[0].camera = Some(Camera::new_perspective(15.0));

    let profile = RenderProfile {
        worker_size: 4,
        base_samples: 1024,
        adaptive_samples: 1024,
        noise_threshold: 0.0,
        bounce_limit: 6,
        ..RenderProfile::default()
    };
    let mut engine = build_engine(&scene, &profile, 4, 4);
    engine.begin(profile).unwrap();
    assert_eq!(engine.wait_for_render(), EngineState::Completed);

    let resolved = engine.buffer().resolve();
    let mean = resolved.iter().map(|p| p.x).sum::<f32>() / resolved.len() as f32;
    assert!((mean - 0.5).abs() < 0.01, "mean {mean}");
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn identical_seeds_render_identical_images() {
    let mut scene = ambient_scene(Vec3::new(0.9, 0.7, 0.5));
    scene.add(
        Node::new("ball")
            .with_transform(Transform::from_position(Vec3::new(0.2, -0.1, -4.0)))
            .with_renderable(
                Geometry::Sphere { radius: 1.0 },
                Arc::new(Matte::new(Vec4::new(0.6, 0.5, 0.4, 1.0))),
            ),
    );
    let profile = RenderProfile {
        worker_size: 4,
        base_samples: 8,
        adaptive_samples: 16,
        noise_threshold: 0.05,
        seed: 99,
        ..RenderProfile::default()
    };

    let render = |workers: usize| {
        let mut profile = profile.clone();
        profile.worker_size = workers;
        let mut engine = build_engine(&scene, &profile, 32, 32);
        engine.begin(profile).unwrap();
        assert_eq!(engine.wait_for_render(), EngineState::Completed);
        engine.buffer().to_rgba_f32()
    };

    let first = render(4);
    let second = render(4);
    assert_eq!(first, second);

    // Scheduling must not matter either: one worker, same image.
    let serial = render(1);
    assert_eq!(first, serial);
}

// ============================================================================
// State machine
// ============================================================================

#[test]
fn illegal_transitions_are_rejected() {
    let scene = ambient_scene(Vec3::ONE);
    let profile = quick_profile(1);
    let mut engine = build_engine(&scene, &profile, 8, 8);

    assert_eq!(engine.state(), EngineState::Ready);
    assert!(matches!(
        engine.pause(),
        Err(PrismError::InvalidState { operation: "pause", .. })
    ));
    assert!(matches!(
        engine.resume(),
        Err(PrismError::InvalidState { .. })
    ));
    assert!(matches!(
        engine.abort(),
        Err(PrismError::InvalidState { .. })
    ));

    engine.begin(profile.clone()).unwrap();
    engine.wait_for_render();
    assert_eq!(engine.state(), EngineState::Completed);
    assert!(matches!(
        engine.pause(),
        Err(PrismError::InvalidState { .. })
    ));

    // A finished engine may begin again.
    engine.begin(profile).unwrap();
    assert_eq!(engine.wait_for_render(), EngineState::Completed);
}

#[test]
fn begin_while_rendering_is_rejected() {
    let scene = ambient_scene(Vec3::ONE);
    let profile = RenderProfile {
        worker_size: 1,
        base_samples: 256,
        adaptive_samples: 256,
        noise_threshold: 0.0,
        ..RenderProfile::default()
    };
    let mut engine = build_engine(&scene, &profile, 128, 128);
    engine.begin(profile.clone()).unwrap();

    let result = engine.begin(profile);
    // Either the render is still going (rejected) or it finished
    // already on a fast machine (accepted); both are legal outcomes.
    if let Err(error) = result {
        assert!(matches!(error, PrismError::InvalidState { .. }));
    }
    engine.abort().ok();
    engine.wait_for_render();
}

#[test]
fn abort_stops_promptly() {
    let scene = ambient_scene(Vec3::ONE);
    let profile = RenderProfile {
        worker_size: 2,
        base_samples: 4096,
        adaptive_samples: 4096,
        noise_threshold: 0.0,
        ..RenderProfile::default()
    };
    let mut engine = build_engine(&scene, &profile, 256, 256);
    engine.begin(profile).unwrap();
    std::thread::sleep(Duration::from_millis(20));
    if engine.abort().is_ok() {
        assert_eq!(engine.wait_for_render(), EngineState::Aborted);
        let progress = engine.progress();
        assert!(progress.pixels < progress.total_pixels);
    }
}

#[test]
fn pause_freezes_progress_and_resume_completes() {
    let scene = ambient_scene(Vec3::new(0.3, 0.6, 0.9));
    let profile = RenderProfile {
        worker_size: 2,
        base_samples: 64,
        adaptive_samples: 64,
        noise_threshold: 0.0,
        seed: 7,
        ..RenderProfile::default()
    };

    // Reference run without interruptions.
    let reference = {
        let mut engine = build_engine(&scene, &profile, 64, 64);
        engine.begin(profile.clone()).unwrap();
        assert_eq!(engine.wait_for_render(), EngineState::Completed);
        engine.buffer().to_rgba_f32()
    };

    let mut engine = build_engine(&scene, &profile, 64, 64);
    engine.begin(profile.clone()).unwrap();
    std::thread::sleep(Duration::from_millis(10));

    if engine.pause().is_ok() {
        // Workers drain to their checkpoints, then the counters hold.
        std::thread::sleep(Duration::from_millis(30));
        let frozen = engine.progress();
        std::thread::sleep(Duration::from_millis(30));
        let still = engine.progress();
        assert_eq!(frozen.samples, still.samples);
        assert_eq!(frozen.tiles, still.tiles);
        engine.resume().unwrap();
    }

    assert_eq!(engine.wait_for_render(), EngineState::Completed);
    assert_eq!(engine.buffer().to_rgba_f32(), reference);
}

// ============================================================================
// Tiles
// ============================================================================

#[test]
fn tile_grid_covers_every_pixel_once() {
    let tiles = tile::tile_grid(70, 35, 32);
    let mut seen = vec![0u32; 70 * 35];
    for t in &tiles {
        for p in t.pixels() {
            let pixel = t.origin + p;
            seen[(pixel.y * 70 + pixel.x) as usize] += 1;
        }
    }
    assert!(seen.iter().all(|&c| c == 1));
}

#[test]
fn morton_order_starts_at_the_corner() {
    let tiles = tile::tile_grid(64, 64, 32);
    let first = tiles[0].pixels().next().unwrap();
    assert_eq!(first, glam::UVec2::ZERO);
}

// ============================================================================
// Sampler determinism across the public surface
// ============================================================================

#[test]
fn sampler_streams_are_pure_functions_of_seed() {
    let mut a = Sampler::seeded(5);
    let mut b = Sampler::seeded(5);
    for _ in 0..32 {
        assert_eq!(a.next_1d().to_bits(), b.next_1d().to_bits());
        assert_eq!(a.next_2d(), b.next_2d());
    }
}
