#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod accel;
pub mod engine;
pub mod errors;
pub mod material;
pub mod math;
pub mod prepared;
pub mod render;
pub mod resources;
pub mod sampling;
pub mod scene;

pub use accel::{Bvh, Token, TraceQuery};
pub use engine::{Engine, EngineState};
pub use errors::{PrismError, Result};
pub use material::{Bsdf, Emissive, Glass, Glossy, Material, Matte, Mirror, NormalMap};
pub use math::{Aabb, Frame, Ray};
pub use prepared::{PreparedScene, PreparedSphere, PreparedTriangle};
pub use render::{EvaluatorKind, ProgressSnapshot, RenderBuffer, RenderProfile};
pub use resources::primitives::*;
pub use resources::{
    ConstantEnvironment, CubemapEnvironment, DirectionalTexture, EquirectEnvironment,
    GradientEnvironment, Mesh, Texture, TextureRef, WrapMode,
};
pub use sampling::Sampler;
pub use scene::{Camera, Geometry, Light, Node, Scene, Transform};
