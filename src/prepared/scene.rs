use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Affine3A, Vec2, Vec3};
use log::warn;

use crate::accel::{Bvh, LinearAggregator, Token, TokenKind, TraceQuery};
use crate::errors::{PrismError, Result};
use crate::material::{MaterialRegistry, PressedMaterial};
use crate::math::{Aabb, Ray};
use crate::prepared::{
    GeometryView, Interaction, LightDistribution, PreparedLight, PreparedSphere, PreparedTriangle,
};
use crate::render::RenderProfile;
use crate::resources::{DirectionalTexture, Mesh};
use crate::scene::camera::PressedCamera;
use crate::scene::{Geometry, LightKind, Scene};

/// Trace and occlusion counters, instrumented by the scene itself.
/// Relaxed adds: the numbers are statistical, not load-bearing.
#[derive(Debug, Default)]
pub struct SceneStats {
    traces: AtomicU64,
    occlusions: AtomicU64,
}

impl SceneStats {
    #[must_use]
    pub fn traces(&self) -> u64 {
        self.traces.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn occlusions(&self) -> u64 {
        self.occlusions.load(Ordering::Relaxed)
    }
}

/// The compact, immutable scene the workers render from.
///
/// Built once from a source [`Scene`]; construction is fail-fast and
/// everything afterwards is read-only, so the whole structure is shared
/// across worker threads behind one `Arc`.
pub struct PreparedScene {
    triangles: Vec<PreparedTriangle>,
    spheres: Vec<PreparedSphere>,
    materials: Vec<PressedMaterial>,
    lights: Vec<PreparedLight>,
    ambients: Vec<Arc<dyn DirectionalTexture>>,
    light_distribution: LightDistribution,
    camera: PressedCamera,
    bvh: Bvh,
    bounds: Aabb,
    scene_radius: f32,
    stats: SceneStats,
}

impl PreparedScene {
    /// Presses a source scene. `aspect` is the width-over-height ratio
    /// of the render target the camera will feed.
    pub fn build(scene: &Scene, profile: &RenderProfile, aspect: f32) -> Result<Self> {
        scene.validate()?;

        let mut registry = MaterialRegistry::new();
        let mut triangles: Vec<(PreparedTriangle, Option<Vec3>)> = Vec::new();
        let mut spheres: Vec<(PreparedSphere, Option<Vec3>)> = Vec::new();
        let mut lights: Vec<PreparedLight> = Vec::new();
        let mut ambients: Vec<Arc<dyn DirectionalTexture>> = Vec::new();
        let mut camera: Option<PressedCamera> = None;
        let mut failure: Option<String> = None;

        scene.visit(|node, world| {
            if failure.is_some() {
                return;
            }
            if let Some(component) = &node.camera {
                if camera.is_some() {
                    warn!("scene has more than one camera; `{}` ignored", node.name);
                } else {
                    camera = Some(component.press(world, aspect));
                }
            }

            // Area lights attach to the primitives extracted below.
            let area_radiance = node.light.as_ref().and_then(|light| match &light.kind {
                LightKind::Area { radiance } => Some(*radiance),
                _ => None,
            });

            if let Some(renderable) = &node.renderable {
                let material = registry.register(&renderable.material);
                match &renderable.geometry {
                    Geometry::Mesh(mesh) => {
                        extract_mesh(mesh, world, material, area_radiance, &mut triangles);
                    }
                    Geometry::Sphere { radius } => {
                        match press_sphere(*radius, world, material, &node.name) {
                            Ok(sphere) => spheres.push((sphere, area_radiance)),
                            Err(message) => failure = Some(message),
                        }
                    }
                }
            } else if area_radiance.is_some() {
                warn!(
                    "area light on `{}` has no renderable to attach to",
                    node.name
                );
            }

            if let Some(light) = &node.light {
                match &light.kind {
                    LightKind::Point { intensity } => lights.push(PreparedLight::Point {
                        position: world.transform_point3(Vec3::ZERO),
                        intensity: *intensity,
                    }),
                    LightKind::Directional { radiance } => {
                        lights.push(PreparedLight::Directional {
                            direction: world.transform_vector3(-Vec3::Z).normalize(),
                            radiance: *radiance,
                        });
                    }
                    LightKind::Ambient { texture } => {
                        ambients.push(Arc::clone(texture));
                        lights.push(PreparedLight::Ambient {
                            texture: Arc::clone(texture),
                        });
                    }
                    LightKind::Area { .. } => {}
                }
            }
        });

        if let Some(message) = failure {
            return Err(PrismError::InvalidScene(message));
        }
        let camera = camera.ok_or_else(|| PrismError::InvalidScene("scene has no camera".into()))?;

        let triangles = fragment_triangles(
            triangles,
            profile.fragment_ratio,
            profile.fragment_max_iterations,
        );

        // Emitting primitives become area lights now that indices are
        // final.
        for (index, (_, radiance)) in triangles.iter().enumerate() {
            if let Some(radiance) = radiance {
                lights.push(PreparedLight::Area {
                    token: Token::triangle(index),
                    radiance: *radiance,
                });
            }
        }
        for (index, (_, radiance)) in spheres.iter().enumerate() {
            if let Some(radiance) = radiance {
                lights.push(PreparedLight::Area {
                    token: Token::sphere(index),
                    radiance: *radiance,
                });
            }
        }
        let triangles: Vec<PreparedTriangle> = triangles.into_iter().map(|(t, _)| t).collect();
        let spheres: Vec<PreparedSphere> = spheres.into_iter().map(|(s, _)| s).collect();

        let mut aabbs = Vec::with_capacity(triangles.len() + spheres.len());
        let mut tokens = Vec::with_capacity(aabbs.capacity());
        let mut bounds = Aabb::EMPTY;
        for (index, triangle) in triangles.iter().enumerate() {
            let aabb = triangle.aabb();
            bounds.encapsulate_box(&aabb);
            aabbs.push(aabb);
            tokens.push(Token::triangle(index));
        }
        for (index, sphere) in spheres.iter().enumerate() {
            let aabb = sphere.aabb();
            bounds.encapsulate_box(&aabb);
            aabbs.push(aabb);
            tokens.push(Token::sphere(index));
        }

        let bvh = Bvh::build(&aabbs, &tokens);
        let scene_radius = if bounds.is_valid() {
            (bounds.extent().length() * 0.5).max(1.0)
        } else {
            1.0
        };

        let geometry = GeometryView {
            triangles: &triangles,
            spheres: &spheres,
        };
        let light_distribution = LightDistribution::build(&lights, geometry, scene_radius);

        Ok(Self {
            triangles,
            spheres,
            materials: registry.press(),
            lights,
            ambients,
            light_distribution,
            camera,
            bvh,
            bounds,
            scene_radius,
            stats: SceneStats::default(),
        })
    }

    /// Finds the nearest hit for the query.
    pub fn trace(&self, query: &mut TraceQuery) {
        self.stats.traces.fetch_add(1, Ordering::Relaxed);
        self.bvh.trace(&self.triangles, &self.spheres, query);
    }

    /// Whether anything blocks the ray within `travel`.
    #[must_use]
    pub fn occlude(&self, ray: &Ray, travel: f32, ignore: Token) -> bool {
        self.stats.occlusions.fetch_add(1, Ordering::Relaxed);
        self.bvh
            .occlude(&self.triangles, &self.spheres, ray, travel, ignore)
    }

    /// Approximate traversal work for a ray, in box tests.
    #[must_use]
    pub fn trace_cost(&self, ray: &Ray) -> u32 {
        self.bvh.trace_cost(ray)
    }

    /// Resolves a successful query into the surface interaction packet.
    #[must_use]
    pub fn interact(&self, query: &TraceQuery) -> Interaction<'_> {
        debug_assert!(query.hit());
        let outgoing = -query.ray.direction3();
        let (point, normal, shading, texcoord, material_index) = match query.token.kind() {
            TokenKind::Triangle => {
                let triangle = &self.triangles[query.token.index()];
                (
                    triangle.position(query.uv),
                    triangle.normal,
                    triangle.shading_normal(query.uv),
                    triangle.texcoord(query.uv),
                    triangle.material,
                )
            }
            TokenKind::Sphere => {
                let sphere = &self.spheres[query.token.index()];
                let point = query.ray.at(query.distance);
                let normal = sphere.normal_at(point);
                (point, normal, normal, query.uv, sphere.material)
            }
            TokenKind::Node | TokenKind::Instance => {
                unreachable!("query resolved to a non-geometry token")
            }
        };
        let material = &*self.materials[material_index as usize].material;
        let shading_normal = material.apply_normal_mapping(texcoord, shading);
        Interaction {
            point,
            normal,
            shading_normal,
            outgoing,
            texcoord,
            material_index,
            material,
            token: query.token,
        }
    }

    /// Radiance arriving from the environment along a direction.
    #[must_use]
    pub fn evaluate_ambient(&self, direction: Vec3) -> Vec3 {
        self.ambients
            .iter()
            .map(|a| a.evaluate(direction))
            .sum()
    }

    #[must_use]
    pub fn geometry(&self) -> GeometryView<'_> {
        GeometryView {
            triangles: &self.triangles,
            spheres: &self.spheres,
        }
    }

    /// A brute-force aggregate over the same primitives, for parity
    /// checking.
    #[must_use]
    pub fn linear_aggregator(&self) -> LinearAggregator {
        let tokens = (0..self.triangles.len())
            .map(Token::triangle)
            .chain((0..self.spheres.len()).map(Token::sphere))
            .collect();
        LinearAggregator::new(tokens)
    }

    #[must_use]
    pub fn camera(&self) -> &PressedCamera {
        &self.camera
    }

    #[must_use]
    pub fn lights(&self) -> &[PreparedLight] {
        &self.lights
    }

    #[must_use]
    pub fn light_distribution(&self) -> &LightDistribution {
        &self.light_distribution
    }

    #[must_use]
    pub fn pressed_material(&self, index: u32) -> &PressedMaterial {
        &self.materials[index as usize]
    }

    #[must_use]
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    #[must_use]
    pub fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn sphere_count(&self) -> usize {
        self.spheres.len()
    }

    #[must_use]
    pub fn stats(&self) -> &SceneStats {
        &self.stats
    }
}

fn extract_mesh(
    mesh: &Mesh,
    world: &Affine3A,
    material: u32,
    emission: Option<Vec3>,
    out: &mut Vec<(PreparedTriangle, Option<Vec3>)>,
) {
    let normal_matrix = world.matrix3.inverse().transpose();
    for [a, b, c] in mesh.triangles() {
        let indices = [a as usize, b as usize, c as usize];
        let positions = indices.map(|i| world.transform_point3(mesh.positions[i]));
        let texcoords = if mesh.has_uvs() {
            indices.map(|i| mesh.uvs[i])
        } else {
            [Vec2::ZERO; 3]
        };
        let normals = mesh.has_normals().then(|| {
            indices.map(|i| Vec3::from(normal_matrix * mesh.normals[i]).normalize_or_zero())
        });
        out.push((
            PreparedTriangle::new(positions, texcoords, normals, material),
            emission,
        ));
    }
}

fn press_sphere(
    radius: f32,
    world: &Affine3A,
    material: u32,
    name: &str,
) -> std::result::Result<PreparedSphere, String> {
    let scale = Vec3::new(
        world.matrix3.x_axis.length(),
        world.matrix3.y_axis.length(),
        world.matrix3.z_axis.length(),
    );
    let mean = (scale.x + scale.y + scale.z) / 3.0;
    if (scale.max_element() - scale.min_element()) > mean * 1e-3 {
        return Err(format!(
            "sphere on `{name}` is under non-uniform scale {scale:?}"
        ));
    }
    if radius * mean <= 0.0 || !(radius * mean).is_finite() {
        return Err(format!("sphere on `{name}` has invalid radius"));
    }
    Ok(PreparedSphere::new(
        world.transform_point3(Vec3::ZERO),
        radius * mean,
        material,
    ))
}

/// Splits triangles much larger than the scene's mean area so the
/// hierarchy does not degenerate over long thin geometry. A triangle
/// `levels` splits deep yields `4^levels` children.
fn fragment_triangles(
    triangles: Vec<(PreparedTriangle, Option<Vec3>)>,
    ratio: f32,
    max_iterations: u32,
) -> Vec<(PreparedTriangle, Option<Vec3>)> {
    if triangles.is_empty() || ratio <= 0.0 || max_iterations == 0 {
        return triangles;
    }
    let mean = triangles.iter().map(|(t, _)| t.area()).sum::<f32>() / triangles.len() as f32;
    let threshold = ratio * mean;
    if threshold <= 0.0 || !threshold.is_finite() {
        return triangles;
    }

    let mut out = Vec::with_capacity(triangles.len());
    for (triangle, emission) in triangles {
        let area = triangle.area();
        let levels = if area > threshold {
            ((area / threshold).log2().ceil() as u32).min(max_iterations)
        } else {
            0
        };
        subdivide_into(triangle, levels, emission, &mut out);
    }
    out
}

fn subdivide_into(
    triangle: PreparedTriangle,
    levels: u32,
    emission: Option<Vec3>,
    out: &mut Vec<(PreparedTriangle, Option<Vec3>)>,
) {
    if levels == 0 {
        out.push((triangle, emission));
        return;
    }
    for child in triangle.split4() {
        subdivide_into(child, levels - 1, emission, out);
    }
}
