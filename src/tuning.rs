//! Data-driven game balance
//!
//! Every number that shapes how a fight feels lives here: action geometry,
//! damage, knockback, cooldowns, AI aggression and feedback strength.
//! `Tuning::default()` is the shipped balance; a JSON document can override
//! any subset of it.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a balance table
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Camera shake request: peak magnitude and minimum hold time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeSpec {
    pub power: f32,
    pub hold: f32,
}

impl ShakeSpec {
    pub const fn new(power: f32, hold: f32) -> Self {
        Self { power, hold }
    }
}

/// Melee hitbox geometry, relative to the attacker's feet.
///
/// `offset.x` and `knockback.x` are mirrored by the attacker's facing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxSpec {
    pub offset: Vec2,
    pub size: Vec2,
    pub life: f32,
    pub damage: f32,
    pub knockback: Vec2,
}

/// Walking, jumping and world forces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSpec {
    pub gravity: f32,
    /// Horizontal velocity multiplier applied each grounded tick
    pub ground_friction: f32,
    pub run_speed: f32,
    pub run_blend: f32,
    pub stop_blend: f32,
    pub jump_velocity: f32,
    pub jump_pose_time: f32,
}

impl Default for MovementSpec {
    fn default() -> Self {
        Self {
            gravity: 2200.0,
            ground_friction: 0.90,
            run_speed: 620.0,
            run_blend: 0.18,
            stop_blend: 0.22,
            jump_velocity: -920.0,
            jump_pose_time: 0.12,
        }
    }
}

/// What happens to a fighter when a hit lands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HurtSpec {
    pub invulnerability: f32,
    pub combo_window: f32,
    pub burst_offset_y: f32,
    pub burst_count: usize,
    pub text_offset_y: f32,
    pub text_life: f32,
    pub text_rise_speed: f32,
    pub shake: ShakeSpec,
    /// Damage at or above this triggers a cinematic moment
    pub cinematic_threshold: f32,
    pub cinematic_slow_motion: f32,
    pub cinematic_shake: ShakeSpec,
}

impl Default for HurtSpec {
    fn default() -> Self {
        Self {
            invulnerability: 0.25,
            combo_window: 1.2,
            burst_offset_y: -60.0,
            burst_count: 14,
            text_offset_y: -120.0,
            text_life: 0.6,
            text_rise_speed: -80.0,
            shake: ShakeSpec::new(10.0, 0.15),
            cinematic_threshold: 18.0,
            cinematic_slow_motion: 0.18,
            cinematic_shake: ShakeSpec::new(18.0, 0.25),
        }
    }
}

/// Three-step basic combo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAttackSpec {
    pub pose_time: f32,
    /// Steps 1 and 2
    pub light: HitboxSpec,
    /// Step 3
    pub finisher: HitboxSpec,
    pub slash_offset: Vec2,
    pub finisher_shake: ShakeSpec,
    pub finisher_slow_motion: f32,
}

impl Default for BasicAttackSpec {
    fn default() -> Self {
        Self {
            pose_time: 0.12,
            light: HitboxSpec {
                offset: Vec2::new(30.0, -140.0),
                size: Vec2::new(70.0, 120.0),
                life: 0.10,
                damage: 14.0,
                knockback: Vec2::new(340.0, -220.0),
            },
            finisher: HitboxSpec {
                offset: Vec2::new(30.0, -140.0),
                size: Vec2::new(90.0, 120.0),
                life: 0.10,
                damage: 22.0,
                knockback: Vec2::new(520.0, -520.0),
            },
            slash_offset: Vec2::new(34.0, -82.0),
            finisher_shake: ShakeSpec::new(16.0, 0.22),
            finisher_slow_motion: 0.12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashSpec {
    pub cooldown: f32,
    pub pose_time: f32,
    pub impulse: f32,
    pub hitbox: HitboxSpec,
    pub slash_offset: Vec2,
    pub shake: ShakeSpec,
    pub slow_motion: f32,
}

impl Default for DashSpec {
    fn default() -> Self {
        Self {
            cooldown: 2.4,
            pose_time: 0.18,
            impulse: 980.0,
            hitbox: HitboxSpec {
                offset: Vec2::new(40.0, -150.0),
                size: Vec2::new(120.0, 140.0),
                life: 0.12,
                damage: 18.0,
                knockback: Vec2::new(720.0, -280.0),
            },
            slash_offset: Vec2::new(45.0, -95.0),
            shake: ShakeSpec::new(12.0, 0.18),
            slow_motion: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShockwaveSpec {
    pub cooldown: f32,
    pub pose_time: f32,
    pub hitbox: HitboxSpec,
    pub ring_life: f32,
    pub shake: ShakeSpec,
    pub slow_motion: f32,
}

impl Default for ShockwaveSpec {
    fn default() -> Self {
        Self {
            cooldown: 5.0,
            pose_time: 0.22,
            hitbox: HitboxSpec {
                offset: Vec2::new(40.0, -22.0),
                size: Vec2::new(220.0, 40.0),
                life: 0.16,
                damage: 20.0,
                knockback: Vec2::new(520.0, -420.0),
            },
            ring_life: 0.35,
            shake: ShakeSpec::new(18.0, 0.25),
            slow_motion: 0.14,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireballSpec {
    pub cooldown: f32,
    pub pose_time: f32,
    pub spawn_offset: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub life: f32,
    /// Downward pull on projectiles in flight
    pub gravity: f32,
    pub cast_burst_offset: Vec2,
    pub cast_burst_count: usize,
    pub hit_damage: f32,
    pub hit_knockback: Vec2,
    pub hit_burst_count: usize,
    pub hit_shake: ShakeSpec,
}

impl Default for FireballSpec {
    fn default() -> Self {
        Self {
            cooldown: 3.8,
            pose_time: 0.18,
            spawn_offset: Vec2::new(42.0, -100.0),
            velocity: Vec2::new(760.0, -40.0),
            radius: 12.0,
            life: 1.5,
            gravity: 260.0,
            cast_burst_offset: Vec2::new(36.0, -100.0),
            cast_burst_count: 10,
            hit_damage: 16.0,
            hit_knockback: Vec2::new(520.0, -420.0),
            hit_burst_count: 24,
            hit_shake: ShakeSpec::new(14.0, 0.18),
        }
    }
}

/// Opponent heuristic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSpec {
    pub approach_speed: f32,
    /// Closer than this the AI stops walking in
    pub approach_distance: f32,
    pub approach_blend: f32,
    pub hold_blend: f32,
    pub retime_min: f32,
    pub retime_jitter: f32,
    pub shockwave_range: f32,
    pub dash_range: f32,
    pub fireball_min_range: f32,
    pub basic_range: f32,
    pub ability_chance: f32,
    pub basic_chance: f32,
}

impl Default for AiSpec {
    fn default() -> Self {
        Self {
            approach_speed: 420.0,
            approach_distance: 120.0,
            approach_blend: 0.08,
            hold_blend: 0.12,
            retime_min: 0.25,
            retime_jitter: 0.35,
            shockwave_range: 200.0,
            dash_range: 220.0,
            fireball_min_range: 260.0,
            basic_range: 140.0,
            ability_chance: 0.25,
            basic_chance: 0.65,
        }
    }
}

/// Slow motion and shake decay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSpec {
    /// Time scale while slow motion is active
    pub slow_motion_scale: f32,
    /// Shake magnitude lost per second once the hold expires
    pub shake_decay: f32,
    pub slash_life: f32,
}

impl Default for FeedbackSpec {
    fn default() -> Self {
        Self {
            slow_motion_scale: 0.55,
            shake_decay: 40.0,
            slash_life: 0.18,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementSpec,
    pub hurt: HurtSpec,
    pub basic: BasicAttackSpec,
    pub dash: DashSpec,
    pub shockwave: ShockwaveSpec,
    pub fireball: FireballSpec,
    pub ai: AiSpec,
    pub feedback: FeedbackSpec,
}

impl Tuning {
    /// Parse a (possibly partial) JSON balance table and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the simulation's timer invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, v: f32) -> Result<(), TuningError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be positive",
                })
            }
        }
        fn non_negative(field: &'static str, v: f32) -> Result<(), TuningError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must not be negative",
                })
            }
        }
        fn unit(field: &'static str, v: f32) -> Result<(), TuningError> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be within 0..=1",
                })
            }
        }
        fn hitbox(field: &'static str, spec: &HitboxSpec) -> Result<(), TuningError> {
            positive(field, spec.life)?;
            positive(field, spec.size.x)?;
            positive(field, spec.size.y)?;
            non_negative(field, spec.damage)
        }

        unit("movement.ground_friction", self.movement.ground_friction)?;
        unit("movement.run_blend", self.movement.run_blend)?;
        unit("movement.stop_blend", self.movement.stop_blend)?;

        positive("hurt.invulnerability", self.hurt.invulnerability)?;
        positive("hurt.combo_window", self.hurt.combo_window)?;
        positive("hurt.text_life", self.hurt.text_life)?;

        hitbox("basic.light", &self.basic.light)?;
        hitbox("basic.finisher", &self.basic.finisher)?;
        hitbox("dash.hitbox", &self.dash.hitbox)?;
        hitbox("shockwave.hitbox", &self.shockwave.hitbox)?;

        non_negative("dash.cooldown", self.dash.cooldown)?;
        non_negative("shockwave.cooldown", self.shockwave.cooldown)?;
        non_negative("fireball.cooldown", self.fireball.cooldown)?;
        positive("shockwave.ring_life", self.shockwave.ring_life)?;
        positive("fireball.life", self.fireball.life)?;
        positive("fireball.radius", self.fireball.radius)?;
        non_negative("fireball.hit_damage", self.fireball.hit_damage)?;

        unit("ai.ability_chance", self.ai.ability_chance)?;
        unit("ai.basic_chance", self.ai.basic_chance)?;
        non_negative("ai.retime_min", self.ai.retime_min)?;
        non_negative("ai.retime_jitter", self.ai.retime_jitter)?;

        positive("feedback.slow_motion_scale", self.feedback.slow_motion_scale)?;
        unit("feedback.slow_motion_scale", self.feedback.slow_motion_scale)?;
        non_negative("feedback.shake_decay", self.feedback.shake_decay)?;
        positive("feedback.slash_life", self.feedback.slash_life)?;
        Ok(())
    }
}
