//! Presentation-side particle field
//!
//! Particles are visual only. The simulation requests bursts through
//! `GameEvent::ParticleBurst`; this field owns the particles and their
//! own RNG so visuals never perturb the gameplay stream.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::sim::GameEvent;

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// 0-1, decreases over time (doubles as alpha)
    pub life: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleField {
    particles: VecDeque<Particle>,
    #[serde(skip)]
    rng: Pcg32,
    pub enabled: bool,
}

impl ParticleField {
    pub fn new(seed: u64, enabled: bool) -> Self {
        Self {
            particles: VecDeque::with_capacity(MAX_PARTICLES),
            rng: Pcg32::seed_from_u64(seed),
            enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.particles.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// React to a simulation event
    pub fn handle(&mut self, event: &GameEvent) {
        if let GameEvent::ParticleBurst { pos, color, count } = event {
            self.burst(*pos, *color, *count);
        }
    }

    /// Spray `count` particles from `pos`. The oldest are evicted past the cap.
    pub fn burst(&mut self, pos: Vec2, color: u32, count: u32) {
        if !self.enabled {
            return;
        }
        for _ in 0..count {
            let angle = self.rng.random::<f32>() * TAU;
            let speed = 60.0 + self.rng.random::<f32>() * 120.0;
            let particle = Particle {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                color,
                life: 1.0,
                size: 2.0 + self.rng.random::<f32>() * 2.0,
            };
            if self.particles.len() == MAX_PARTICLES {
                self.particles.pop_front();
            }
            self.particles.push_back(particle);
        }
    }

    /// Advance particles by `dt` seconds (real frame time)
    pub fn update(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel * dt;
            // Light gravity and drag
            particle.vel.y += 200.0 * dt;
            particle.vel *= 0.98;
            particle.life -= dt * 1.5;
            particle.size *= 0.995;
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}
