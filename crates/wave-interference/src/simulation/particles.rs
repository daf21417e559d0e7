//! Particle view of the sound medium.
//!
//! Each air particle is tied to its home position by a spring, jittered by
//! a small random force and pushed down the local pressure gradient.

use rand::prelude::*;
use rand::rngs::StdRng;

use super::lattice::Lattice;

/// Tuning constants for the particle integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    /// Spring constant pulling particles home (1/s²).
    pub spring: f32,
    /// Peak random acceleration (cells/s²).
    pub randomness: f32,
    /// Velocity multiplier applied every step.
    pub friction: f32,
    /// Acceleration per unit pressure gradient (cells²/s²).
    pub gradient_force: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            spring: 25.0,
            randomness: 2.0,
            friction: 0.95,
            gradient_force: 50.0,
        }
    }
}

/// A single air particle in lattice cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundParticle {
    pub home: (f32, f32),
    pub position: (f32, f32),
    pub velocity: (f32, f32),
}

impl SoundParticle {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            home: (x, y),
            position: (x, y),
            velocity: (0.0, 0.0),
        }
    }

    /// Distance from home.
    pub fn displacement(&self) -> f32 {
        let dx = self.position.0 - self.home.0;
        let dy = self.position.1 - self.home.1;
        (dx * dx + dy * dy).sqrt()
    }

    fn reset(&mut self) {
        self.position = self.home;
        self.velocity = (0.0, 0.0);
    }
}

/// Fixed pool of sound particles laid out on a grid over the visible region.
pub struct SoundParticles {
    particles: Vec<SoundParticle>,
    params: ParticleParams,
    rng: StdRng,
}

impl SoundParticles {
    /// Create particles every `spacing` cells across the visible region.
    pub fn new(lattice: &Lattice, spacing: usize, seed: Option<u64>) -> Self {
        let spacing = spacing.max(1);
        let bounds = lattice.visible_bounds();
        let offset = spacing as f32 / 2.0;

        let mut particles = Vec::new();
        for j in (bounds.min_y..bounds.max_y).step_by(spacing) {
            for i in (bounds.min_x..bounds.max_x).step_by(spacing) {
                let x = (i as f32 + offset).min(bounds.max_x as f32 - 1.0);
                let y = (j as f32 + offset).min(bounds.max_y as f32 - 1.0);
                particles.push(SoundParticle::new(x, y));
            }
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            particles,
            params: ParticleParams::default(),
            rng,
        }
    }

    /// Replace the tuning constants.
    pub fn with_params(mut self, params: ParticleParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &ParticleParams {
        &self.params
    }

    pub fn particles(&self) -> &[SoundParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Integrate every particle over `dt` simulated seconds.
    pub fn step(&mut self, lattice: &Lattice, dt: f32) {
        let params = self.params;
        for particle in self.particles.iter_mut() {
            let (gx, gy) = gradient(lattice, particle.position.0, particle.position.1);

            let mut random = || {
                if params.randomness > 0.0 {
                    self.rng.gen_range(-params.randomness..=params.randomness)
                } else {
                    0.0
                }
            };
            let ax = params.spring * (particle.home.0 - particle.position.0) + random()
                - params.gradient_force * gx;
            let ay = params.spring * (particle.home.1 - particle.position.1) + random()
                - params.gradient_force * gy;

            // Semi-implicit Euler with friction on velocity
            particle.velocity.0 = (particle.velocity.0 + ax * dt) * params.friction;
            particle.velocity.1 = (particle.velocity.1 + ay * dt) * params.friction;
            particle.position.0 += particle.velocity.0 * dt;
            particle.position.1 += particle.velocity.1 * dt;
        }
    }

    /// Send every particle home at rest.
    pub fn reset(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.reset();
        }
    }
}

/// Central-difference gradient at the nearest cell; missing neighbours
/// contribute no force.
fn gradient(lattice: &Lattice, x: f32, y: f32) -> (f32, f32) {
    let i = x.round() as i32;
    let j = y.round() as i32;
    let difference = |a: f32, b: f32| {
        let d = (a - b) / 2.0;
        if d.is_finite() {
            d
        } else {
            0.0
        }
    };
    (
        difference(lattice.current_value(i + 1, j), lattice.current_value(i - 1, j)),
        difference(lattice.current_value(i, j + 1), lattice.current_value(i, j - 1)),
    )
}
