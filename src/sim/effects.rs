//! Visual effect requests
//!
//! The core only appends effects and ages them; the renderer reads the list
//! each frame. Nothing in the simulation reads an effect back.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::per_frame_decay;

/// Downward pull on burst particles
const PARTICLE_GRAVITY: f32 = 980.0;
/// Horizontal drag on burst particles, per reference frame
const PARTICLE_DRAG: f32 = 0.98;
/// Ring radius at spawn and its growth rate
const RING_BASE_RADIUS: f32 = 18.0;
const RING_GROWTH: f32 = 260.0;

/// Variant-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Spark from a burst
    Particle { vel: Vec2 },
    /// Weapon trail, `dir` is the attacker's facing
    Slash { dir: f32 },
    /// Expanding shockwave ring
    Ring,
    /// Floating text (damage numbers)
    Text { text: String, vy: f32 },
}

/// One visual effect request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub pos: Vec2,
    /// Seconds left before removal
    pub life: f32,
    /// Seconds since spawn
    pub age: f32,
    /// Life at spawn, for fade curves
    pub initial_life: f32,
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl Effect {
    pub fn new(pos: Vec2, life: f32, kind: EffectKind) -> Self {
        Self {
            pos,
            life,
            age: 0.0,
            initial_life: life,
            kind,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.life <= 0.0
    }

    /// Advance by `dt` simulated seconds; drag follows `frames` of real time
    pub fn age_by(&mut self, dt: f32, frames: f32) {
        self.age += dt;
        self.life -= dt;
        match &mut self.kind {
            EffectKind::Particle { vel } => {
                self.pos += *vel * dt;
                vel.y += PARTICLE_GRAVITY * dt;
                vel.x *= per_frame_decay(PARTICLE_DRAG, frames);
            }
            EffectKind::Text { vy, .. } => {
                self.pos.y += *vy * dt;
            }
            EffectKind::Slash { .. } | EffectKind::Ring => {}
        }
    }

    /// Current ring radius (rings only)
    pub fn ring_radius(&self) -> Option<f32> {
        match self.kind {
            EffectKind::Ring => Some(RING_BASE_RADIUS + self.age * RING_GROWTH),
            _ => None,
        }
    }

    /// Fade factor for the renderer.
    ///
    /// Particles and text fade on absolute remaining life; slashes and rings
    /// fade over their own lifetime.
    pub fn opacity(&self) -> f32 {
        let alpha = match self.kind {
            EffectKind::Particle { .. } | EffectKind::Text { .. } => self.life,
            EffectKind::Slash { .. } | EffectKind::Ring => {
                if self.initial_life > 0.0 {
                    self.life / self.initial_life
                } else {
                    0.0
                }
            }
        };
        alpha.clamp(0.0, 1.0)
    }
}

/// Bounded list of live effects; the oldest entry is dropped when full
#[derive(Debug, Clone)]
pub struct EffectQueue {
    items: Vec<Effect>,
    capacity: usize,
}

impl EffectQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub fn push(&mut self, effect: Effect) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() >= self.capacity {
            self.items.remove(0);
        }
        self.items.push(effect);
    }

    /// Scatter `count` particles in random directions from `at`
    pub fn burst<R: Rng>(&mut self, rng: &mut R, at: Vec2, count: usize) {
        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = 180.0 + rng.random::<f32>() * 420.0;
            let life = 0.5 + rng.random::<f32>() * 0.4;
            let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            self.push(Effect::new(at, life, EffectKind::Particle { vel }));
        }
    }

    pub fn slash(&mut self, at: Vec2, dir: f32, life: f32) {
        self.push(Effect::new(at, life, EffectKind::Slash { dir }));
    }

    pub fn ring(&mut self, at: Vec2, life: f32) {
        self.push(Effect::new(at, life, EffectKind::Ring));
    }

    pub fn text(&mut self, at: Vec2, text: impl Into<String>, life: f32, vy: f32) {
        self.push(Effect::new(
            at,
            life,
            EffectKind::Text {
                text: text.into(),
                vy,
            },
        ));
    }

    /// Change the budget, dropping the oldest entries if over it
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        if self.items.len() > capacity {
            let excess = self.items.len() - capacity;
            self.items.drain(..excess);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Age every effect and drop the expired ones
    pub fn step(&mut self, dt: f32, frames: f32) {
        for effect in &mut self.items {
            effect.age_by(dt, frames);
        }
        self.items.retain(|e| !e.is_expired());
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[Effect] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
