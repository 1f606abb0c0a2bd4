use std::borrow::Cow;
use std::sync::Arc;

use crate::material::Material;
use crate::resources::Mesh;
use crate::scene::{Camera, Light, Transform};

/// The geometry a renderable node carries.
#[derive(Clone)]
pub enum Geometry {
    /// An indexed triangle mesh.
    Mesh(Arc<Mesh>),
    /// An analytic sphere of the given radius, centered on the node.
    Sphere { radius: f32 },
}

/// A geometry plus the material that shades it.
#[derive(Clone)]
pub struct Renderable {
    pub geometry: Geometry,
    pub material: Arc<dyn Material>,
}

/// A node in the source scene tree.
///
/// Every node has a transform; the component slots are optional. A node
/// with both a renderable and an area light turns each extracted
/// primitive into an emitter.
pub struct Node {
    pub name: Cow<'static, str>,
    pub transform: Transform,
    pub renderable: Option<Renderable>,
    pub light: Option<Light>,
    pub camera: Option<Camera>,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            renderable: None,
            light: None,
            camera: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_renderable(mut self, geometry: Geometry, material: Arc<dyn Material>) -> Self {
        self.renderable = Some(Renderable { geometry, material });
        self
    }

    #[must_use]
    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn add_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        self.children.last_mut().unwrap()
    }
}
