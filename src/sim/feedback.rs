//! Slow motion, screen shake and camera placement
//!
//! `Feedback` is the match clock: it owns elapsed time, the slow-motion
//! window and the shake accumulator. `Camera` turns it into a per-frame
//! view offset using its own RNG, so jitter never touches simulation state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::fighter::Fighters;
use crate::consts::ARENA_WIDTH;
use crate::lerp;
use crate::settings::Settings;
use crate::tuning::{FeedbackSpec, ShakeSpec};

/// How far the camera leans toward the fighters' midpoint
const CAMERA_FOCUS_BLEND: f32 = 0.08;
/// Fraction of the focus offset applied to the view
const CAMERA_PAN_SCALE: f32 = 0.12;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Simulated seconds since the match started
    pub time: f32,
    /// Real seconds of slow motion left
    pub slow_motion: f32,
    /// Current shake magnitude in pixels
    pub shake: f32,
    /// Seconds the shake is held at full strength before decaying
    pub shake_hold: f32,
}

impl Feedback {
    /// Raise shake to at least `spec`; never weakens an active shake
    pub fn add_shake(&mut self, spec: ShakeSpec) {
        self.shake = self.shake.max(spec.power);
        self.shake_hold = self.shake_hold.max(spec.hold);
    }

    /// Extend the slow-motion window to at least `seconds`
    pub fn request_slow_motion(&mut self, seconds: f32) {
        self.slow_motion = self.slow_motion.max(seconds);
    }

    pub fn is_slow_motion(&self) -> bool {
        self.slow_motion > 0.0
    }

    /// Scale a tick's elapsed time by the slow-motion window.
    ///
    /// The window itself drains in unscaled time.
    pub fn dilate(&mut self, dt: f32, spec: &FeedbackSpec) -> f32 {
        if self.slow_motion > 0.0 {
            self.slow_motion = (self.slow_motion - dt).max(0.0);
            dt * spec.slow_motion_scale
        } else {
            dt
        }
    }

    /// End-of-tick bookkeeping: advance the clock and decay the shake
    pub fn settle(&mut self, dt: f32, spec: &FeedbackSpec) {
        self.time += dt;
        if self.shake_hold > 0.0 {
            self.shake_hold = (self.shake_hold - dt).max(0.0);
        } else {
            self.shake = (self.shake - spec.shake_decay * dt).max(0.0);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Per-frame view placement for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    /// Translation to apply to the whole scene
    pub offset: Vec2,
    /// World x the camera is centered on
    pub focus_x: f32,
}

#[derive(Debug, Clone)]
pub struct Camera {
    rng: Pcg32,
}

impl Camera {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Lean toward the fighters and jitter by the current shake
    pub fn frame(&mut self, fighters: &Fighters, feedback: &Feedback, settings: &Settings) -> CameraView {
        let center = ARENA_WIDTH / 2.0;
        let focus_x = if settings.camera_drift() {
            let midpoint = (fighters.player.pos.x + fighters.enemy.pos.x) * 0.5;
            lerp(center, midpoint, CAMERA_FOCUS_BLEND)
        } else {
            center
        };

        let shake = settings.effective_shake(feedback.shake);
        let jitter = if shake > 0.0 {
            Vec2::new(
                self.rng.random_range(-1.0..=1.0_f32) * shake,
                self.rng.random_range(-1.0..=1.0_f32) * shake,
            )
        } else {
            Vec2::ZERO
        };

        CameraView {
            offset: Vec2::new((center - focus_x) * CAMERA_PAN_SCALE, 0.0) + jitter,
            focus_x,
        }
    }
}
