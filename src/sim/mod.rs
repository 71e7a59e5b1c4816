//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Fixed processing order (player before enemy, spawn order within a sweep)
//! - No rendering or platform dependencies

pub mod actions;
pub mod combat;
pub mod control;
pub mod effects;
pub mod feedback;
pub mod fighter;
pub mod geometry;
pub mod physics;
pub mod state;
pub mod tick;

pub use actions::{Action, perform};
pub use combat::{HitReport, hurt};
pub use control::{AiController, Controller, HumanController, Intent, Key, KeyState, Steer};
pub use effects::{Effect, EffectKind, EffectQueue};
pub use feedback::{Camera, CameraView, Feedback};
pub use fighter::{Cooldowns, Fighter, Fighters, Pose, Team};
pub use geometry::Rect;
pub use state::{Hitbox, MatchState, Outcome, Projectile, RngState, Snapshot};
pub use tick::{Session, tick};
