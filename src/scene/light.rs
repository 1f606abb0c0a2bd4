use std::sync::Arc;

use glam::Vec3;

use crate::resources::DirectionalTexture;

/// Light component in the source scene.
#[derive(Clone)]
pub enum LightKind {
    /// An isotropic point emitter. `intensity` is radiant intensity,
    /// i.e. power per solid angle.
    Point { intensity: Vec3 },
    /// A light infinitely far away along the node's -Z axis.
    Directional { radiance: Vec3 },
    /// An emitter attached to the primitives of the node's renderable.
    Area { radiance: Vec3 },
    /// Environment illumination arriving from every direction.
    Ambient {
        texture: Arc<dyn DirectionalTexture>,
    },
}

#[derive(Clone)]
pub struct Light {
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn new_point(intensity: Vec3) -> Self {
        Self {
            kind: LightKind::Point { intensity },
        }
    }

    #[must_use]
    pub fn new_directional(radiance: Vec3) -> Self {
        Self {
            kind: LightKind::Directional { radiance },
        }
    }

    #[must_use]
    pub fn new_area(radiance: Vec3) -> Self {
        Self {
            kind: LightKind::Area { radiance },
        }
    }

    #[must_use]
    pub fn new_ambient(texture: Arc<dyn DirectionalTexture>) -> Self {
        Self {
            kind: LightKind::Ambient { texture },
        }
    }
}
