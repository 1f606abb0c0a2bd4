//! CPU-side resources: triangle meshes, float textures and environment
//! maps. All of these are plain data; the prepared scene holds them
//! behind `Arc` and worker threads only ever read them.

pub mod environment;
pub mod mesh;
pub mod primitives;
pub mod texture;

pub use environment::{
    ConstantEnvironment, CubemapEnvironment, DirectionalTexture, EnvironmentSample,
    EquirectEnvironment, GradientEnvironment,
};
pub use mesh::Mesh;
pub use texture::{Texture, TextureRef, WrapMode};
