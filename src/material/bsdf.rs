use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use glam::{Vec2, Vec3};

use crate::material::bxdf::{FunctionType, Lobe};
use crate::math::Frame;
use crate::prepared::Interaction;

/// One draw from a full BSDF, expressed in world space.
#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    pub value: Vec3,
    /// World-space incident direction.
    pub incident: Vec3,
    pub pdf: f32,
    /// Classification of the lobe the draw came from.
    pub function: FunctionType,
}

impl BsdfSample {
    pub const IMPOSSIBLE: Self = Self {
        value: Vec3::ZERO,
        incident: Vec3::Z,
        pdf: 0.0,
        function: FunctionType::empty(),
    };

    #[inline]
    #[must_use]
    pub fn is_impossible(&self) -> bool {
        self.pdf == 0.0
    }
}

/// The per-hit sum of scattering lobes.
///
/// Lives entirely in the worker's arena; dropping it is free and the
/// arena reset between pixel samples reclaims the storage. The local
/// frame is built from the shading normal, while reflect-versus-
/// transmit classification uses the geometric normal so shading-normal
/// tricks cannot leak light through surfaces.
pub struct Bsdf<'a> {
    frame: Frame,
    geometric_normal: Vec3,
    /// Relative index of refraction of the interior, for callers
    /// spawning refracted paths.
    pub eta: f32,
    lobes: BumpVec<'a, Lobe>,
}

impl<'a> Bsdf<'a> {
    /// Starts an empty BSDF for a surface interaction.
    #[must_use]
    pub fn new(arena: &'a Bump, interaction: &Interaction<'_>, eta: f32) -> Self {
        Self {
            frame: Frame::from_normal(interaction.shading_normal),
            geometric_normal: interaction.normal,
            eta,
            lobes: BumpVec::new_in(arena),
        }
    }

    pub fn add(&mut self, lobe: Lobe) {
        self.lobes.push(lobe);
    }

    #[must_use]
    pub fn lobe_count(&self, mask: FunctionType) -> usize {
        self.lobes.iter().filter(|l| l.matches(mask)).count()
    }

    #[inline]
    fn transmits(&self, outgoing_world: Vec3, incident_world: Vec3) -> bool {
        outgoing_world.dot(self.geometric_normal) * incident_world.dot(self.geometric_normal) < 0.0
    }

    /// Side-aware filter: a lobe only contributes when its transport
    /// direction matches which side of the true surface the incident
    /// direction lies on.
    fn side_flag(&self, outgoing_world: Vec3, incident_world: Vec3) -> FunctionType {
        if self.transmits(outgoing_world, incident_world) {
            FunctionType::TRANSMISSIVE
        } else {
            FunctionType::REFLECTIVE
        }
    }

    /// Sums the matching lobes for a pair of world directions.
    #[must_use]
    pub fn evaluate(
        &self,
        outgoing_world: Vec3,
        incident_world: Vec3,
        mask: FunctionType,
    ) -> Vec3 {
        let outgoing = self.frame.to_local(outgoing_world);
        let incident = self.frame.to_local(incident_world);
        if outgoing.z == 0.0 {
            return Vec3::ZERO;
        }
        let side = self.side_flag(outgoing_world, incident_world);
        self.lobes
            .iter()
            .filter(|l| l.matches(mask) && l.function_type().contains(side))
            .map(|l| l.evaluate(outgoing, incident))
            .sum()
    }

    /// Mean density over the lobes matching the mask.
    #[must_use]
    pub fn pdf(&self, outgoing_world: Vec3, incident_world: Vec3, mask: FunctionType) -> f32 {
        let outgoing = self.frame.to_local(outgoing_world);
        let incident = self.frame.to_local(incident_world);
        let mut sum = 0.0;
        let mut count = 0;
        for lobe in self.lobes.iter().filter(|l| l.matches(mask)) {
            sum += lobe.pdf(outgoing, incident);
            count += 1;
        }
        if count == 0 { 0.0 } else { sum / count as f32 }
    }

    /// Draws an incident direction by uniformly picking one matching
    /// lobe, then folding the remaining lobes into the returned value
    /// and density.
    #[must_use]
    pub fn sample(&self, outgoing_world: Vec3, u: Vec2, mask: FunctionType) -> BsdfSample {
        let count = self.lobe_count(mask);
        if count == 0 {
            return BsdfSample::IMPOSSIBLE;
        }
        let pick = ((u.x * count as f32) as usize).min(count - 1);
        // Reuse the selection coordinate: stretched back to [0, 1) it
        // is uniform again.
        let remapped = Vec2::new(u.x * count as f32 - pick as f32, u.y);

        let chosen = self
            .lobes
            .iter()
            .filter(|l| l.matches(mask))
            .nth(pick)
            .expect("lobe count changed underfoot");

        let outgoing = self.frame.to_local(outgoing_world);
        let mut sample = chosen.sample(remapped, outgoing);
        if sample.is_impossible() {
            return BsdfSample::IMPOSSIBLE;
        }
        let incident_world = self.frame.to_world(sample.incident);

        if !sample.function.contains(FunctionType::SPECULAR) && count > 1 {
            let side = self.side_flag(outgoing_world, incident_world);
            for lobe in self.lobes.iter().filter(|l| l.matches(mask)) {
                if std::ptr::eq(lobe, chosen) {
                    continue;
                }
                sample.pdf += lobe.pdf(outgoing, sample.incident);
                if lobe.function_type().contains(side) {
                    sample.value += lobe.evaluate(outgoing, sample.incident);
                }
            }
        }
        BsdfSample {
            value: sample.value,
            incident: incident_world,
            pdf: sample.pdf / count as f32,
            function: sample.function,
        }
    }

    /// The shading frame's normal.
    #[must_use]
    pub fn shading_normal(&self) -> Vec3 {
        self.frame.normal
    }
}
