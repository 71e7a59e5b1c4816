//! Fighter records and their per-tick state machine
//!
//! Pose, cooldowns, invulnerability and combo all decay here. Movement is
//! integrated separately in `physics`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::*;

/// Which side a fighter is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Human-aligned side; the only side that builds combos
    Player,
    Enemy,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }

    /// Short tag used in logs and the web bridge
    pub fn tag(self) -> &'static str {
        match self {
            Team::Player => "P",
            Team::Enemy => "E",
        }
    }
}

/// Animation pose (presentation only, never gates actions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pose {
    #[default]
    Idle,
    Attack1,
    Attack2,
    Attack3,
    Dash,
    Shock,
    Cast,
    Jump,
}

impl Pose {
    /// Pose for basic-combo step 1..=3
    pub fn attack(step: u32) -> Pose {
        match step {
            1 => Pose::Attack1,
            2 => Pose::Attack2,
            _ => Pose::Attack3,
        }
    }
}

/// Remaining time on each ability
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub dash: f32,
    pub shock: f32,
    pub fire: f32,
}

impl Cooldowns {
    pub fn decay(&mut self, dt: f32) {
        self.dash = (self.dash - dt).max(0.0);
        self.shock = (self.shock - dt).max(0.0);
        self.fire = (self.fire - dt).max(0.0);
    }

    pub fn all_ready(&self) -> bool {
        self.dash <= 0.0 && self.shock <= 0.0 && self.fire <= 0.0
    }
}

/// One combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub team: Team,
    /// Feet position
    pub pos: Vec2,
    pub vel: Vec2,
    /// +1.0 facing right, -1.0 facing left
    pub facing: f32,
    pub on_ground: bool,

    pub health: f32,
    /// Seconds of hit immunity left
    pub invulnerable: f32,

    pub pose: Pose,
    pub pose_timer: f32,

    /// Consecutive landed hits
    pub combo: u32,
    /// Seconds until the combo drops
    pub combo_timer: f32,

    pub cooldowns: Cooldowns,

    /// Countdown to the next AI decision (unused for human control)
    pub ai_timer: f32,
}

impl Fighter {
    /// Fresh fighter standing on the floor at `x`, facing the arena center
    pub fn new(team: Team, x: f32) -> Self {
        Self {
            team,
            pos: Vec2::new(x, FLOOR_Y),
            vel: Vec2::ZERO,
            facing: match team {
                Team::Player => 1.0,
                Team::Enemy => -1.0,
            },
            on_ground: true,
            health: MAX_HEALTH,
            invulnerable: 0.0,
            pose: Pose::Idle,
            pose_timer: 0.0,
            combo: 0,
            combo_timer: 0.0,
            cooldowns: Cooldowns::default(),
            ai_timer: 0.0,
        }
    }

    /// Fighter at its team's starting mark
    pub fn spawn(team: Team) -> Self {
        match team {
            Team::Player => Self::new(team, PLAYER_START_X),
            Team::Enemy => Self::new(team, ENEMY_START_X),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    pub fn hurtbox(&self) -> Rect {
        Rect::hurtbox(self.pos)
    }

    /// Switch pose, replacing whatever was playing
    pub fn enter_pose(&mut self, pose: Pose, duration: f32) {
        self.pose = pose;
        self.pose_timer = duration;
    }

    /// Next basic-combo step (1..=3), driven by the running combo count
    pub fn combo_step(&self) -> u32 {
        self.combo % 3 + 1
    }

    /// Subtract health (floored at zero), returning the damage actually taken
    pub fn take_damage(&mut self, damage: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - damage).max(0.0);
        before - self.health
    }

    /// Credit a landed hit; the window is refreshed, not extended
    pub fn register_combo_hit(&mut self, window: f32) {
        self.combo += 1;
        self.combo_timer = window;
    }

    /// Decay every timer by `dt` and apply the resulting transitions
    pub fn step_timers(&mut self, dt: f32) {
        self.cooldowns.decay(dt);
        self.invulnerable = (self.invulnerable - dt).max(0.0);

        self.pose_timer = (self.pose_timer - dt).max(0.0);
        if self.pose_timer == 0.0 && self.pose != Pose::Idle {
            self.pose = Pose::Idle;
        }

        self.combo_timer = (self.combo_timer - dt).max(0.0);
        if self.combo_timer == 0.0 && self.combo != 0 {
            log::trace!("{} combo dropped at {}", self.team.tag(), self.combo);
            self.combo = 0;
        }
    }

    /// Health and timers stay in range
    pub fn check_invariants(&self) {
        debug_assert!(
            (0.0..=MAX_HEALTH).contains(&self.health),
            "health out of range: {}",
            self.health
        );
        debug_assert!(self.invulnerable >= 0.0);
        debug_assert!(self.pose_timer >= 0.0);
        debug_assert!(self.combo_timer >= 0.0);
        debug_assert!(self.cooldowns.dash >= 0.0);
        debug_assert!(self.cooldowns.shock >= 0.0);
        debug_assert!(self.cooldowns.fire >= 0.0);
    }
}

/// Both combatants, addressed by team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighters {
    pub player: Fighter,
    pub enemy: Fighter,
}

impl Default for Fighters {
    fn default() -> Self {
        Self {
            player: Fighter::spawn(Team::Player),
            enemy: Fighter::spawn(Team::Enemy),
        }
    }
}

impl Fighters {
    pub fn get(&self, team: Team) -> &Fighter {
        match team {
            Team::Player => &self.player,
            Team::Enemy => &self.enemy,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut Fighter {
        match team {
            Team::Player => &mut self.player,
            Team::Enemy => &mut self.enemy,
        }
    }

    /// `(team's fighter, its opponent)`
    pub fn pair_mut(&mut self, team: Team) -> (&mut Fighter, &mut Fighter) {
        match team {
            Team::Player => (&mut self.player, &mut self.enemy),
            Team::Enemy => (&mut self.enemy, &mut self.player),
        }
    }

    pub fn both_alive(&self) -> bool {
        self.player.is_alive() && self.enemy.is_alive()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fighter> {
        [&self.player, &self.enemy].into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Fighter> {
        [&mut self.player, &mut self.enemy].into_iter()
    }
}
