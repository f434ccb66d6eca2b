//! A cube of particles that jitter in place and slowly turn as a whole.

use cgmath::{Rad, Vector3};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleParams {
    /// Particles stay within `[-half_extent, half_extent]` on every axis.
    pub half_extent: f32,
    /// Largest per-axis jump of one particle in one frame.
    pub step: f32,
    /// Radians per second the whole field turns about +Y.
    pub spin_speed: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            half_extent: 300.0,
            step: 0.4,
            spin_speed: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    pub positions: Vec<Vector3<f32>>,
    pub rotation: Rad<f32>,
}

impl ParticleField {
    pub fn scatter(count: usize, half_extent: f32, rng: &mut impl Rng) -> Self {
        let half_extent = half_extent.abs();
        let positions = (0..count)
            .map(|_| {
                Vector3::new(
                    rng.gen_range(-half_extent..=half_extent),
                    rng.gen_range(-half_extent..=half_extent),
                    rng.gen_range(-half_extent..=half_extent),
                )
            })
            .collect();
        Self {
            positions,
            rotation: Rad(0.0),
        }
    }

    /// Random walk step for every particle, clamped back into the field.
    pub fn perturb(&mut self, params: &ParticleParams, dt: f32, rng: &mut impl Rng) {
        let bound = params.half_extent.abs();
        let step = params.step.abs();
        for p in &mut self.positions {
            if step > 0.0 {
                p.x += rng.gen_range(-step..=step);
                p.y += rng.gen_range(-step..=step);
                p.z += rng.gen_range(-step..=step);
            }
            p.x = p.x.clamp(-bound, bound);
            p.y = p.y.clamp(-bound, bound);
            p.z = p.z.clamp(-bound, bound);
        }
        self.rotation = Rad((self.rotation.0 + params.spin_speed * dt) % std::f32::consts::TAU);
    }
}
