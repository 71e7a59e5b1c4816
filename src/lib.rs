//! Stick Duel - A two-fighter arena brawler
//!
//! Core modules:
//! - `sim`: Simulation core (fighters, actions, physics, hit resolution, feedback)
//! - `tuning`: Data-driven balance table
//! - `settings`: Presentation preferences (shake, effect budget)
//! - `web`: Browser bridge (wasm32 only)

pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the session will try to catch up on
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Upper bound on a single tick's elapsed time
    pub const MAX_TICK_DT: f32 = 0.033;
    /// Frame rate that per-frame balance factors (friction, steering blends,
    /// particle drag) are expressed at
    pub const REFERENCE_HZ: f32 = 60.0;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 960.0;
    pub const ARENA_HEIGHT: f32 = 540.0;
    /// Floor line (feet rest here)
    pub const FLOOR_Y: f32 = ARENA_HEIGHT - 70.0;
    /// Fighters are kept this far from either side wall
    pub const WALL_MARGIN: f32 = 80.0;
    /// Projectiles may travel this far past the arena before despawning
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Spawn positions
    pub const PLAYER_START_X: f32 = 220.0;
    pub const ENEMY_START_X: f32 = 740.0;

    /// Vitality
    pub const MAX_HEALTH: f32 = 100.0;

    /// Hurtbox, anchored above the feet
    pub const HURTBOX_HALF_WIDTH: f32 = 18.0;
    pub const HURTBOX_HEIGHT: f32 = 150.0;
}

/// Clamp `v` into `[lo, hi]`
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Linear interpolation from `a` toward `b` by `t`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Multiplier equivalent to applying `factor` once per reference frame,
/// `frames` times over
#[inline]
pub fn per_frame_decay(factor: f32, frames: f32) -> f32 {
    factor.powf(frames)
}

/// Lerp weight equivalent to blending by `weight` once per reference frame,
/// `frames` times over
#[inline]
pub fn per_frame_blend(weight: f32, frames: f32) -> f32 {
    1.0 - (1.0 - weight).powf(frames)
}
