//! Match state and ephemeral combat entities
//!
//! `MatchState` is the single owner of everything that changes during a
//! fight. Hitboxes and projectiles refer to their owner by `Team` only, and
//! are cleared together with the fighters on reset.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{Effect, EffectQueue};
use super::feedback::Feedback;
use super::fighter::{Fighter, Fighters, Team};
use super::geometry::Rect;
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::{HitboxSpec, Tuning};

/// Short-lived melee damage region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub id: u32,
    pub owner: Team,
    pub rect: Rect,
    /// Seconds left; forced to zero after the first hit
    pub life: f32,
    pub damage: f32,
    pub knockback: Vec2,
}

impl Hitbox {
    /// Place `spec` in front of `owner`, mirrored by its facing
    pub fn from_spec(id: u32, owner: &Fighter, spec: &HitboxSpec) -> Self {
        let dir = owner.facing;
        let origin = owner.pos + Vec2::new(spec.offset.x * dir, spec.offset.y);
        Self {
            id,
            owner: owner.team,
            rect: Rect::from_origin_size(origin, spec.size),
            life: spec.life,
            damage: spec.damage,
            knockback: Vec2::new(spec.knockback.x * dir, spec.knockback.y),
        }
    }

    pub fn is_spent(&self) -> bool {
        self.life <= 0.0
    }
}

/// Ranged attack in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: Team,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub life: f32,
}

impl Projectile {
    pub fn is_spent(&self) -> bool {
        self.life <= 0.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::around_circle(self.pos, self.radius)
    }

    /// Past the despawn margin around the arena (the top stays open)
    pub fn is_out_of_bounds(&self) -> bool {
        self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > ARENA_WIDTH + OFFSCREEN_MARGIN
            || self.pos.y > ARENA_HEIGHT + OFFSCREEN_MARGIN
    }
}

/// Terminal state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub loser: Team,
}

impl Outcome {
    pub fn winner(&self) -> Team {
        self.loser.opponent()
    }
}

/// Seed plus stream selector for one of the match's RNGs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    /// Visual effects (burst scatter)
    pub const EFFECTS: u64 = 1;
    /// Opponent decisions
    pub const AI: u64 = 2;
    /// Camera jitter
    pub const CAMERA: u64 = 3;
    /// Player-side decisions when the AI plays both fighters
    pub const DEMO: u64 = 4;

    pub fn new(seed: u64, stream: u64) -> Self {
        Self { seed, stream }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }

    /// Independent 64-bit seed for consumers that seed themselves
    pub fn derive_seed(&self) -> u64 {
        self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Read-only view of a match handed to the renderer each frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time: f32,
    pub player: Fighter,
    pub enemy: Fighter,
    pub hitboxes: Vec<Hitbox>,
    pub projectiles: Vec<Projectile>,
    pub effects: Vec<Effect>,
    pub shake: f32,
    pub shake_hold: f32,
    pub slow_motion: f32,
    pub outcome: Option<Outcome>,
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct MatchState {
    pub seed: u64,
    pub tuning: Tuning,
    pub fighters: Fighters,
    pub hitboxes: Vec<Hitbox>,
    pub projectiles: Vec<Projectile>,
    pub effects: EffectQueue,
    pub feedback: Feedback,
    /// Scatter for bursts; kept apart from AI and camera randomness
    pub fx_rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
}

impl MatchState {
    /// Create a match with shipped balance and default settings
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), &Settings::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, settings: &Settings) -> Self {
        Self {
            seed,
            tuning,
            fighters: Fighters::default(),
            hitboxes: Vec::new(),
            projectiles: Vec::new(),
            effects: EffectQueue::new(settings.max_effects()),
            feedback: Feedback::default(),
            fx_rng: RngState::new(seed, RngState::EFFECTS).to_rng(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Replace both fighters and drop every transient entity and timer
    pub fn reset(&mut self) {
        self.fighters = Fighters::default();
        self.hitboxes.clear();
        self.projectiles.clear();
        self.effects.clear();
        self.feedback.clear();
        self.time_ticks = 0;
        log::info!("Match reset");
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Some once either fighter is down; the player loses a double knockout
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.fighters.player.is_alive() {
            Some(Outcome { loser: Team::Player })
        } else if !self.fighters.enemy.is_alive() {
            Some(Outcome { loser: Team::Enemy })
        } else {
            None
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.feedback.time,
            player: self.fighters.player.clone(),
            enemy: self.fighters.enemy.clone(),
            hitboxes: self.hitboxes.clone(),
            projectiles: self.projectiles.clone(),
            effects: self.effects.as_slice().to_vec(),
            shake: self.feedback.shake,
            shake_hold: self.feedback.shake_hold,
            slow_motion: self.feedback.slow_motion,
            outcome: self.outcome(),
        }
    }
}
