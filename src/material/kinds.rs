//! The concrete material types.

use bumpalo::Bump;
use glam::{Vec2, Vec3, Vec4};

use crate::material::bxdf::{
    DielectricFresnel, GlossyReflection, GlossyTransmission, Lambert, Lobe, SpecularReflection,
    SpecularTransmission, TrowbridgeReitz,
};
use crate::material::{Bsdf, Material, NormalMap};
use crate::math::luminance;
use crate::prepared::Interaction;
use crate::resources::TextureRef;

/// Ideal diffuse surface.
pub struct Matte {
    pub albedo: TextureRef,
    pub normal_map: Option<NormalMap>,
}

impl Matte {
    #[must_use]
    pub fn new(albedo: impl Into<TextureRef>) -> Self {
        Self {
            albedo: albedo.into(),
            normal_map: None,
        }
    }

    #[must_use]
    pub fn with_normal_map(mut self, map: NormalMap) -> Self {
        self.normal_map = Some(map);
        self
    }
}

impl Material for Matte {
    fn scatter<'a>(&self, interaction: &Interaction<'_>, arena: &'a Bump) -> Bsdf<'a> {
        let mut bsdf = Bsdf::new(arena, interaction, 1.0);
        bsdf.add(Lobe::Lambert(Lambert {
            albedo: self.albedo.sample(interaction.texcoord).truncate(),
        }));
        bsdf
    }

    fn albedo(&self, texcoord: Vec2) -> Vec4 {
        self.albedo.sample(texcoord)
    }

    fn apply_normal_mapping(&self, texcoord: Vec2, normal: Vec3) -> Vec3 {
        match &self.normal_map {
            Some(map) => map.apply(texcoord, normal),
            None => normal,
        }
    }
}

/// Perfect mirror.
pub struct Mirror {
    pub tint: TextureRef,
}

impl Mirror {
    #[must_use]
    pub fn new(tint: impl Into<TextureRef>) -> Self {
        Self { tint: tint.into() }
    }
}

impl Material for Mirror {
    fn scatter<'a>(&self, interaction: &Interaction<'_>, arena: &'a Bump) -> Bsdf<'a> {
        let mut bsdf = Bsdf::new(arena, interaction, 1.0);
        bsdf.add(Lobe::SpecularReflection(SpecularReflection {
            albedo: self.tint.sample(interaction.texcoord).truncate(),
            fresnel: None,
        }));
        bsdf
    }

    fn albedo(&self, texcoord: Vec2) -> Vec4 {
        self.tint.sample(texcoord)
    }
}

/// Clear or frosted dielectric with Fresnel-weighted reflection and
/// refraction.
pub struct Glass {
    pub tint: TextureRef,
    /// Interior index of refraction; the exterior is vacuum.
    pub eta: f32,
    /// Zero renders a polished interface; positive values switch to
    /// the rough microfacet pair.
    pub roughness: f32,
}

impl Glass {
    #[must_use]
    pub fn new(tint: impl Into<TextureRef>, eta: f32) -> Self {
        Self {
            tint: tint.into(),
            eta,
            roughness: 0.0,
        }
    }

    #[must_use]
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }
}

impl Material for Glass {
    fn scatter<'a>(&self, interaction: &Interaction<'_>, arena: &'a Bump) -> Bsdf<'a> {
        let tint = self.tint.sample(interaction.texcoord).truncate();
        let mut bsdf = Bsdf::new(arena, interaction, self.eta);
        if self.roughness > 0.0 {
            let distribution = TrowbridgeReitz::from_roughness(self.roughness);
            bsdf.add(Lobe::GlossyReflection(GlossyReflection {
                albedo: tint,
                distribution,
                fresnel: DielectricFresnel::new(1.0, self.eta),
            }));
            bsdf.add(Lobe::GlossyTransmission(GlossyTransmission {
                albedo: tint,
                distribution,
                eta_outside: 1.0,
                eta_inside: self.eta,
            }));
        } else {
            bsdf.add(Lobe::SpecularReflection(SpecularReflection {
                albedo: tint,
                fresnel: Some(DielectricFresnel::new(1.0, self.eta)),
            }));
            bsdf.add(Lobe::SpecularTransmission(SpecularTransmission {
                albedo: tint,
                eta_outside: 1.0,
                eta_inside: self.eta,
            }));
        }
        bsdf
    }

    fn albedo(&self, texcoord: Vec2) -> Vec4 {
        self.tint.sample(texcoord)
    }

    fn is_pass_through(&self) -> bool {
        true
    }
}

/// Rough dielectric reflection over a diffuse base.
pub struct Glossy {
    pub albedo: TextureRef,
    pub roughness: TextureRef,
    pub eta: f32,
    pub normal_map: Option<NormalMap>,
}

impl Glossy {
    #[must_use]
    pub fn new(albedo: impl Into<TextureRef>, roughness: impl Into<TextureRef>) -> Self {
        Self {
            albedo: albedo.into(),
            roughness: roughness.into(),
            eta: 1.5,
            normal_map: None,
        }
    }

    #[must_use]
    pub fn with_normal_map(mut self, map: NormalMap) -> Self {
        self.normal_map = Some(map);
        self
    }
}

impl Material for Glossy {
    fn scatter<'a>(&self, interaction: &Interaction<'_>, arena: &'a Bump) -> Bsdf<'a> {
        let albedo = self.albedo.sample(interaction.texcoord).truncate();
        let roughness = self.roughness.sample(interaction.texcoord).x;
        let mut bsdf = Bsdf::new(arena, interaction, 1.0);
        bsdf.add(Lobe::Lambert(Lambert { albedo }));
        bsdf.add(Lobe::GlossyReflection(GlossyReflection {
            albedo: Vec3::ONE,
            distribution: TrowbridgeReitz::from_roughness(roughness),
            fresnel: DielectricFresnel::new(1.0, self.eta),
        }));
        bsdf
    }

    fn albedo(&self, texcoord: Vec2) -> Vec4 {
        self.albedo.sample(texcoord)
    }

    fn apply_normal_mapping(&self, texcoord: Vec2, normal: Vec3) -> Vec3 {
        match &self.normal_map {
            Some(map) => map.apply(texcoord, normal),
            None => normal,
        }
    }
}

/// Pure emitter. Carries no scattering lobes, so paths end on it.
pub struct Emissive {
    pub radiance: TextureRef,
}

impl Emissive {
    #[must_use]
    pub fn new(radiance: impl Into<TextureRef>) -> Self {
        Self {
            radiance: radiance.into(),
        }
    }
}

impl Material for Emissive {
    fn scatter<'a>(&self, interaction: &Interaction<'_>, arena: &'a Bump) -> Bsdf<'a> {
        Bsdf::new(arena, interaction, 1.0)
    }

    fn albedo(&self, texcoord: Vec2) -> Vec4 {
        self.radiance.sample(texcoord)
    }

    fn emission(&self, texcoord: Vec2) -> Vec3 {
        self.radiance.sample(texcoord).truncate()
    }

    fn is_emissive(&self) -> bool {
        luminance(self.radiance.average().truncate()) > 0.0
    }
}
