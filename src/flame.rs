//! Fire-like particle decay effect.
//!
//! A flame is a fixed pool of ten particles, each cycling through a one
//! second life independently. Particles activate in a staggered startup
//! sequence (one every 100 ms) so the pool never pulses in sync; once
//! active, a particle loops forever until the whole effect is torn down by
//! its owner.
//!
//! At every cycle boundary a particle redraws its trajectory (an
//! upward-biased direction, a speed, an angular speed) and snapshots the
//! effect's current strength multiplier for the whole upcoming cycle. The
//! boundary is detected purely by the phase wrapping below its previous
//! value, which makes [`Flame::set_strength`] safe to call at any time: the
//! change lands at each particle's next redraw, never mid-cycle, so an
//! externally driven fade reads as smooth shrinking rather than popping.
//!
//! Per-frame output is a fixed array of [`ParticleInstance`] values, laid
//! out for direct upload by an instanced renderer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

use crate::scene::{NodeId, NodeKind, Scene};
use crate::visuals::lerp_rgb;

/// Particles in the pool.
pub const PARTICLE_COUNT: usize = 10;

/// One particle cycle, in milliseconds.
pub const CYCLE_MS: f64 = 1000.0;

/// Delay between successive particle activations at startup.
pub const STAGGER_MS: f64 = 100.0;

/// Color at the start of a cycle.
pub const HOT_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

/// Color at the end of a cycle.
pub const COOL_COLOR: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Per-particle render state, in the flame's local space.
///
/// `repr(C)` and `Pod` so a renderer can upload the instance array as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Offset from the flame anchor.
    pub position: [f32; 3],
    /// Uniform scale; zero hides the particle.
    pub scale: f32,
    /// RGB color.
    pub color: [f32; 3],
    /// Rotation about the vertical axis, in radians.
    pub spin: f32,
}

impl ParticleInstance {
    const HIDDEN: Self = Self {
        position: [0.0; 3],
        scale: 0.0,
        color: [0.0; 3],
        spin: 0.0,
    };
}

/// Per-cycle trajectory, redrawn when the phase wraps.
#[derive(Debug, Clone, Copy)]
struct Trajectory {
    direction: Vec3,
    speed: f32,
    angular_speed: f32,
    /// Strength multiplier snapshotted at the cycle boundary.
    strength: f32,
}

#[derive(Debug)]
struct Particle {
    born_ms: f64,
    /// Phase from the previous frame; a new phase below this value marks a
    /// cycle boundary.
    alpha: f32,
    trajectory: Trajectory,
}

/// A decaying particle effect anchored at a scene node.
pub struct Flame {
    node: NodeId,
    spawned_ms: f64,
    particles: Vec<Particle>,
    instances: [ParticleInstance; PARTICLE_COUNT],
    strength: f32,
    rng: SmallRng,
}

impl Flame {
    /// Ignite a flame at a world position, anchored by a new scene node.
    pub fn new(scene: &mut Scene, position: Vec3, now_ms: f64, seed: u64) -> Self {
        let node = scene.add_at_root(NodeKind::Flame);
        if let Some(n) = scene.get_mut(node) {
            n.position = position;
        }
        Self {
            node,
            spawned_ms: now_ms,
            particles: Vec::with_capacity(PARTICLE_COUNT),
            instances: [ParticleInstance::HIDDEN; PARTICLE_COUNT],
            strength: 1.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The flame's anchor node; removing it is the owner's teardown step.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The current strength multiplier.
    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Set the strength multiplier.
    ///
    /// Takes effect at each particle's next cycle boundary, not mid-cycle.
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength;
    }

    /// Per-particle render state for an instanced renderer. Slots not yet
    /// activated by the startup stagger stay at zero scale.
    #[inline]
    pub fn instances(&self) -> &[ParticleInstance; PARTICLE_COUNT] {
        &self.instances
    }

    /// Advance every particle to the given absolute time.
    pub fn update(&mut self, now_ms: f64) {
        // Staggered activation: one particle per STAGGER_MS until the pool
        // is full.
        while self.particles.len() < PARTICLE_COUNT
            && now_ms - self.spawned_ms >= self.particles.len() as f64 * STAGGER_MS
        {
            let trajectory = Self::draw(&mut self.rng, self.strength);
            self.particles.push(Particle {
                born_ms: now_ms,
                alpha: 1.0,
                trajectory,
            });
        }

        for (index, particle) in self.particles.iter_mut().enumerate() {
            let age = (now_ms - particle.born_ms).rem_euclid(CYCLE_MS);
            let alpha = (age / CYCLE_MS) as f32;
            if alpha < particle.alpha {
                particle.trajectory = Self::draw(&mut self.rng, self.strength);
            }
            particle.alpha = alpha;

            let Trajectory {
                direction,
                speed,
                angular_speed,
                strength,
            } = particle.trajectory;

            let position = direction * (alpha * speed * strength);
            let color = lerp_rgb(HOT_COLOR, COOL_COLOR, alpha);
            self.instances[index] = ParticleInstance {
                position: position.to_array(),
                scale: (alpha * PI).sin() * strength,
                color: color.to_array(),
                spin: alpha * angular_speed,
            };
        }
    }

    /// Draw a fresh per-cycle trajectory: upward-biased direction, speed in
    /// [1, 2), angular speed in [0, 2), strength snapshotted now.
    fn draw(rng: &mut SmallRng, strength: f32) -> Trajectory {
        let direction = Vec3::new(
            rng.gen::<f32>() - 0.5,
            2.0,
            rng.gen::<f32>() - 0.5,
        )
        .normalize();
        Trajectory {
            direction,
            speed: rng.gen::<f32>() + 1.0,
            angular_speed: rng.gen::<f32>() * 2.0,
            strength,
        }
    }
}
