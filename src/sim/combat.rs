//! Hit resolution
//!
//! Each sweep ages its entities first, then tests the survivors against the
//! opposing hurtbox. A hitbox or projectile is spent the moment it connects,
//! so it can never land twice. Spent entries are purged at the end of the sweep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fighter::Team;
use super::state::MatchState;

/// What a landed hit did
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReport {
    pub target: Team,
    pub attacker: Team,
    /// Health actually removed (less than requested if the target bottomed out)
    pub damage: f32,
    /// Damage crossed the cinematic threshold
    pub cinematic: bool,
}

/// Apply a hit to `target`.
///
/// Returns `None` when the target is invulnerable; such a hit is discarded
/// entirely: no damage, no combo credit, no effects.
pub fn hurt(
    state: &mut MatchState,
    target: Team,
    damage: f32,
    knockback: Vec2,
    attacker: Team,
) -> Option<HitReport> {
    let spec = state.tuning.hurt;
    let victim = state.fighters.get_mut(target);
    if victim.is_invulnerable() {
        return None;
    }

    let dealt = victim.take_damage(damage);
    victim.invulnerable = spec.invulnerability;
    victim.vel += knockback;
    let at = victim.pos;

    if attacker == Team::Player {
        state
            .fighters
            .get_mut(attacker)
            .register_combo_hit(spec.combo_window);
    }

    state.effects.burst(
        &mut state.fx_rng,
        at + Vec2::new(0.0, spec.burst_offset_y),
        spec.burst_count,
    );
    state.effects.text(
        at + Vec2::new(0.0, spec.text_offset_y),
        format!("-{damage}"),
        spec.text_life,
        spec.text_rise_speed,
    );
    state.feedback.add_shake(spec.shake);

    let cinematic = damage >= spec.cinematic_threshold;
    if cinematic {
        state.feedback.request_slow_motion(spec.cinematic_slow_motion);
        state.feedback.add_shake(spec.cinematic_shake);
    }

    log::debug!(
        "{} hit {} for {} ({} left){}",
        attacker.tag(),
        target.tag(),
        damage,
        state.fighters.get(target).health,
        if cinematic { " [cinematic]" } else { "" }
    );

    Some(HitReport {
        target,
        attacker,
        damage: dealt,
        cinematic,
    })
}

/// Age melee hitboxes, resolve contacts, purge spent ones
pub fn step_hitboxes(state: &mut MatchState, dt: f32) -> Vec<HitReport> {
    for hb in &mut state.hitboxes {
        hb.life -= dt;
    }

    let mut reports = Vec::new();
    for i in 0..state.hitboxes.len() {
        let hb = state.hitboxes[i];
        if hb.is_spent() {
            continue;
        }
        let target = hb.owner.opponent();
        if !hb.rect.overlaps(&state.fighters.get(target).hurtbox()) {
            continue;
        }
        // Spent before resolving: a blocked hit still consumes the hitbox
        state.hitboxes[i].life = 0.0;
        reports.extend(hurt(state, target, hb.damage, hb.knockback, hb.owner));
    }

    state.hitboxes.retain(|hb| !hb.is_spent());
    reports
}

/// Age and move projectiles, resolve contacts, purge spent ones
pub fn step_projectiles(state: &mut MatchState, dt: f32) -> Vec<HitReport> {
    let spec = state.tuning.fireball;
    let mut reports = Vec::new();

    for i in 0..state.projectiles.len() {
        if state.projectiles[i].is_spent() {
            continue;
        }

        let p = &mut state.projectiles[i];
        p.life -= dt;
        p.pos += p.vel * dt;
        p.vel.y += spec.gravity * dt;
        let p = *p;

        let target = p.owner.opponent();
        if !p.is_spent() && p.bounds().overlaps(&state.fighters.get(target).hurtbox()) {
            state.projectiles[i].life = 0.0;
            state
                .effects
                .burst(&mut state.fx_rng, p.pos, spec.hit_burst_count);
            state.feedback.add_shake(spec.hit_shake);
            let facing = state.fighters.get(p.owner).facing;
            let knockback = Vec2::new(spec.hit_knockback.x * facing, spec.hit_knockback.y);
            reports.extend(hurt(state, target, spec.hit_damage, knockback, p.owner));
        }

        if state.projectiles[i].is_out_of_bounds() {
            state.projectiles[i].life = 0.0;
        }
    }

    state.projectiles.retain(|p| !p.is_spent());
    reports
}
