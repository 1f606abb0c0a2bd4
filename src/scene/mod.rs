//! The source scene: a mutable tree of nodes carrying transforms,
//! renderables, lights and cameras.
//!
//! The tree is cheap to edit and free to alias materials and meshes;
//! nothing here is touched by worker threads. Rendering operates on the
//! compact form produced by [`crate::prepared::PreparedScene::build`],
//! after which the source scene may be mutated freely again.

pub mod camera;
pub mod light;
pub mod node;
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use light::{Light, LightKind};
pub use node::{Geometry, Node, Renderable};
pub use scene::Scene;
pub use transform::Transform;
