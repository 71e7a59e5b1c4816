//! Action resolution
//!
//! Turns an action request into pose, cooldown, hitbox/projectile spawns,
//! visual effects and feedback. Requests on cooldown are dropped silently.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fighter::{Pose, Team};
use super::state::{Hitbox, MatchState, Projectile};

/// Everything a controller can ask a fighter to do besides moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Three-step melee combo
    Basic,
    Dash,
    Shockwave,
    Fireball,
}

/// Resolve `action` for `team`'s fighter.
///
/// Returns false when the action was rejected (ability on cooldown).
pub fn perform(state: &mut MatchState, team: Team, action: Action) -> bool {
    let performed = match action {
        Action::Basic => {
            basic_attack(state, team);
            true
        }
        Action::Dash => dash(state, team),
        Action::Shockwave => shockwave(state, team),
        Action::Fireball => fireball(state, team),
    };
    if performed {
        log::trace!("{} {:?}", team.tag(), action);
    }
    performed
}

/// Step 1 and 2 are quick jabs; step 3 is a heavier finisher that always
/// punctuates with shake and slow motion, hit or miss.
fn basic_attack(state: &mut MatchState, team: Team) {
    let spec = state.tuning.basic;
    let id = state.next_entity_id();
    let slash_life = state.tuning.feedback.slash_life;

    let fighter = state.fighters.get_mut(team);
    let step = fighter.combo_step();
    fighter.enter_pose(Pose::attack(step), spec.pose_time);

    let finisher = step == 3;
    let hitbox_spec = if finisher { spec.finisher } else { spec.light };
    let dir = fighter.facing;
    let slash_at = fighter.pos + Vec2::new(spec.slash_offset.x * dir, spec.slash_offset.y);
    let hitbox = Hitbox::from_spec(id, fighter, &hitbox_spec);

    state.effects.slash(slash_at, dir, slash_life);
    state.hitboxes.push(hitbox);

    if finisher {
        state.feedback.add_shake(spec.finisher_shake);
        state.feedback.request_slow_motion(spec.finisher_slow_motion);
    }
}

fn dash(state: &mut MatchState, team: Team) -> bool {
    let spec = state.tuning.dash;
    if state.fighters.get(team).cooldowns.dash > 0.0 {
        return false;
    }
    let id = state.next_entity_id();
    let slash_life = state.tuning.feedback.slash_life;

    let fighter = state.fighters.get_mut(team);
    fighter.cooldowns.dash = spec.cooldown;
    fighter.enter_pose(Pose::Dash, spec.pose_time);

    let dir = fighter.facing;
    fighter.vel.x = dir * spec.impulse;
    let slash_at = fighter.pos + Vec2::new(spec.slash_offset.x * dir, spec.slash_offset.y);
    let hitbox = Hitbox::from_spec(id, fighter, &spec.hitbox);

    state.effects.slash(slash_at, dir, slash_life);
    state.hitboxes.push(hitbox);
    state.feedback.add_shake(spec.shake);
    state.feedback.request_slow_motion(spec.slow_motion);
    true
}

/// Low, wide ground wave in front of the caster
fn shockwave(state: &mut MatchState, team: Team) -> bool {
    let spec = state.tuning.shockwave;
    if state.fighters.get(team).cooldowns.shock > 0.0 {
        return false;
    }
    let id = state.next_entity_id();

    let fighter = state.fighters.get_mut(team);
    fighter.cooldowns.shock = spec.cooldown;
    fighter.enter_pose(Pose::Shock, spec.pose_time);
    let hitbox = Hitbox::from_spec(id, fighter, &spec.hitbox);

    state.effects.ring(Vec2::new(hitbox.rect.x, hitbox.rect.y), spec.ring_life);
    state.hitboxes.push(hitbox);
    state.feedback.add_shake(spec.shake);
    state.feedback.request_slow_motion(spec.slow_motion);
    true
}

fn fireball(state: &mut MatchState, team: Team) -> bool {
    let spec = state.tuning.fireball;
    if state.fighters.get(team).cooldowns.fire > 0.0 {
        return false;
    }
    let id = state.next_entity_id();

    let fighter = state.fighters.get_mut(team);
    fighter.cooldowns.fire = spec.cooldown;
    fighter.enter_pose(Pose::Cast, spec.pose_time);

    let dir = fighter.facing;
    let projectile = Projectile {
        id,
        owner: team,
        pos: fighter.pos + Vec2::new(spec.spawn_offset.x * dir, spec.spawn_offset.y),
        vel: Vec2::new(spec.velocity.x * dir, spec.velocity.y),
        radius: spec.radius,
        life: spec.life,
    };
    let burst_at = fighter.pos + Vec2::new(spec.cast_burst_offset.x * dir, spec.cast_burst_offset.y);

    state.projectiles.push(projectile);
    state
        .effects
        .burst(&mut state.fx_rng, burst_at, spec.cast_burst_count);
    true
}
