//! Fighter movement integration
//!
//! Fighters never collide with each other; only hitboxes and projectiles
//! interact with a hurtbox.

use super::fighter::Fighter;
use crate::consts::*;
use crate::{clamp, per_frame_decay};
use crate::tuning::MovementSpec;

/// Gravity, integration, wall clamp, floor contact, then ground friction.
///
/// `dt` is simulated time; `frames` is the real time elapsed in reference
/// frames, which is what friction is measured in (slow motion does not
/// weaken it).
///
/// Knockback lands on `vel` additively elsewhere; friction only bleeds it off
/// while grounded, so airborne hits carry further than grounded ones.
pub fn step_fighter(f: &mut Fighter, spec: &MovementSpec, dt: f32, frames: f32) {
    f.vel.y += spec.gravity * dt;
    f.pos += f.vel * dt;

    f.pos.x = clamp(f.pos.x, WALL_MARGIN, ARENA_WIDTH - WALL_MARGIN);

    if f.pos.y >= FLOOR_Y {
        f.pos.y = FLOOR_Y;
        f.vel.y = 0.0;
        f.on_ground = true;
    } else {
        f.on_ground = false;
    }

    if f.on_ground {
        f.vel.x *= per_frame_decay(spec.ground_friction, frames);
    }
}
