//! Fixed timestep simulation tick
//!
//! `tick` advances a match by one step. `Session` owns a match plus its
//! controllers and feeds it wall-clock frames through a fixed accumulator.

use super::actions::perform;
use super::combat;
use super::control::{AiController, Controller, HumanController, Intent, Key, KeyState};
use super::feedback::{Camera, CameraView};
use super::fighter::{Pose, Team};
use super::physics;
use super::state::{MatchState, RngState, Snapshot};
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::Tuning;
use crate::{clamp, lerp, per_frame_blend};

/// Advance the match by one step of (at most) `dt` seconds
pub fn tick(
    state: &mut MatchState,
    player: &mut dyn Controller,
    enemy: &mut dyn Controller,
    keys: &mut KeyState,
    dt: f32,
) {
    let dt = clamp(dt, 0.0, MAX_TICK_DT);
    // Per-frame factors follow real time, so measure before slow motion
    let frames = dt * REFERENCE_HZ;
    let feedback_spec = state.tuning.feedback;
    let dt = state.feedback.dilate(dt, &feedback_spec);
    state.time_ticks += 1;

    let live = state.fighters.both_alive();
    if live {
        drive(state, Team::Player, player, keys, dt, frames);
        drive(state, Team::Enemy, enemy, keys, dt, frames);
    }

    let movement = state.tuning.movement;
    for fighter in state.fighters.iter_mut() {
        fighter.step_timers(dt);
        physics::step_fighter(fighter, &movement, dt, frames);
        fighter.check_invariants();
    }

    combat::step_hitboxes(state, dt);
    combat::step_projectiles(state, dt);
    state.effects.step(dt, frames);
    state.feedback.settle(dt, &feedback_spec);

    if live {
        if let Some(outcome) = state.outcome() {
            log::info!(
                "Match over after {} ticks: {:?} wins",
                state.time_ticks,
                outcome.winner()
            );
        }
    }
}

fn drive(
    state: &mut MatchState,
    team: Team,
    controller: &mut dyn Controller,
    keys: &mut KeyState,
    dt: f32,
    frames: f32,
) {
    let (me, opponent) = state.fighters.pair_mut(team);
    let intent = controller.decide(me, opponent, keys, dt);
    apply_intent(state, team, intent, frames);
}

/// Movement first, then actions in the order they were requested
fn apply_intent(state: &mut MatchState, team: Team, intent: Intent, frames: f32) {
    let movement = state.tuning.movement;
    let fighter = state.fighters.get_mut(team);

    if let Some(steer) = intent.steer {
        fighter.vel.x = lerp(
            fighter.vel.x,
            steer.target_vx,
            per_frame_blend(steer.blend, frames),
        );
    }
    if let Some(facing) = intent.facing {
        fighter.facing = facing;
    }
    if intent.jump && fighter.on_ground {
        fighter.vel.y = movement.jump_velocity;
        fighter.on_ground = false;
        fighter.enter_pose(Pose::Jump, movement.jump_pose_time);
    }

    for action in intent.actions {
        perform(state, team, action);
    }
}

/// A running match with its controllers and frame accumulator
pub struct Session {
    pub state: MatchState,
    pub keys: KeyState,
    player: Box<dyn Controller>,
    enemy: Box<dyn Controller>,
    camera: Camera,
    accumulator: f32,
}

impl Session {
    /// Keyboard player against the AI
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), &Settings::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, settings: &Settings) -> Self {
        let state = MatchState::with_config(seed, tuning, settings);
        let player = HumanController::new(state.tuning.movement);
        let enemy = AiController::new(state.tuning.ai, RngState::new(seed, RngState::AI).to_rng());
        Self::with_controllers(state, Box::new(player), Box::new(enemy))
    }

    /// AI on both sides
    pub fn demo(seed: u64, tuning: Tuning, settings: &Settings) -> Self {
        let state = MatchState::with_config(seed, tuning, settings);
        let player = AiController::new(state.tuning.ai, RngState::new(seed, RngState::DEMO).to_rng());
        let enemy = AiController::new(state.tuning.ai, RngState::new(seed, RngState::AI).to_rng());
        Self::with_controllers(state, Box::new(player), Box::new(enemy))
    }

    pub fn with_controllers(
        state: MatchState,
        player: Box<dyn Controller>,
        enemy: Box<dyn Controller>,
    ) -> Self {
        let camera = Camera::new(RngState::new(state.seed, RngState::CAMERA).derive_seed());
        log::info!("Match started with seed: {}", state.seed);
        Self {
            state,
            keys: KeyState::new(),
            player,
            enemy,
            camera,
            accumulator: 0.0,
        }
    }

    /// Run as many fixed ticks as `elapsed` seconds of wall time allow.
    ///
    /// Returns the number of ticks run.
    pub fn frame(&mut self, elapsed: f32) -> u32 {
        if self.keys.consume(Key::Reset) {
            self.reset();
        }

        self.accumulator += clamp(elapsed, 0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(
                &mut self.state,
                self.player.as_mut(),
                self.enemy.as_mut(),
                &mut self.keys,
                SIM_DT,
            );
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        // Drop whatever backlog the substep cap left behind
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Presses latched while the match was over are dropped; held keys stay
    pub fn reset(&mut self) {
        self.state.reset();
        self.keys.clear_pressed();
        self.accumulator = 0.0;
    }

    /// Apply presentation settings that affect the running match
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.state.effects.set_capacity(settings.max_effects());
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn camera(&mut self, settings: &Settings) -> CameraView {
        self.camera
            .frame(&self.state.fighters, &self.state.feedback, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fighter::Fighters;
    use crate::sim::state::Outcome;
    use glam::Vec2;
    use proptest::prelude::*;

    /// Stands still and never acts
    struct Dummy;

    impl Controller for Dummy {
        fn decide(
            &mut self,
            _me: &mut crate::sim::fighter::Fighter,
            _opponent: &crate::sim::fighter::Fighter,
            _keys: &mut KeyState,
            _dt: f32,
        ) -> Intent {
            Intent::default()
        }
    }

    fn human() -> HumanController {
        HumanController::new(Tuning::default().movement)
    }

    fn tap(keys: &mut KeyState, key: Key) {
        keys.press(key);
        keys.release(key);
    }

    fn run(
        state: &mut MatchState,
        player: &mut dyn Controller,
        keys: &mut KeyState,
        ticks: usize,
    ) {
        for _ in 0..ticks {
            tick(state, player, &mut Dummy, keys, SIM_DT);
        }
    }

    fn park_enemy(state: &mut MatchState) {
        let e = &mut state.fighters.enemy;
        e.pos = Vec2::new(290.0, FLOOR_Y);
        e.vel = Vec2::ZERO;
        e.on_ground = true;
    }

    #[test]
    fn test_three_hit_combo() {
        let mut state = MatchState::new(1);
        let mut player = human();
        let mut keys = KeyState::new();

        for expected in [86.0, 72.0, 50.0] {
            park_enemy(&mut state);
            assert_eq!(state.fighters.enemy.invulnerable, 0.0);

            tap(&mut keys, Key::Attack);
            run(&mut state, &mut player, &mut keys, 1);
            assert_eq!(state.fighters.enemy.health, expected);

            // Outlast invulnerability, stay inside the combo window
            run(&mut state, &mut player, &mut keys, 40);
        }

        assert_eq!(state.fighters.player.combo, 3);
    }

    #[test]
    fn test_finisher_triggers_slow_motion() {
        let mut state = MatchState::new(1);
        let mut player = human();
        let mut keys = KeyState::new();
        state.fighters.player.combo = 2;
        state.fighters.player.combo_timer = 1.0;
        park_enemy(&mut state);

        tap(&mut keys, Key::Attack);
        run(&mut state, &mut player, &mut keys, 1);

        assert_eq!(state.fighters.enemy.health, 78.0);
        assert!(state.feedback.is_slow_motion());
        assert!(state.feedback.shake >= 10.0);
    }

    #[test]
    fn test_combo_drops_after_window() {
        let mut state = MatchState::new(1);
        let mut player = human();
        let mut keys = KeyState::new();
        park_enemy(&mut state);

        tap(&mut keys, Key::Attack);
        run(&mut state, &mut player, &mut keys, 1);
        assert_eq!(state.fighters.player.combo, 1);

        run(&mut state, &mut player, &mut keys, 130);
        assert_eq!(state.fighters.player.combo, 1);

        run(&mut state, &mut player, &mut keys, 20);
        assert_eq!(state.fighters.player.combo, 0);

        // Next swing starts the chain over
        park_enemy(&mut state);
        tap(&mut keys, Key::Attack);
        run(&mut state, &mut player, &mut keys, 1);
        assert_eq!(state.fighters.player.pose, Pose::Attack1);
        assert_eq!(state.fighters.enemy.health, 72.0);
    }

    #[test]
    fn test_missed_fireball_leaves_arena() {
        let mut state = MatchState::new(3);
        let mut player = human();
        let mut keys = KeyState::new();
        // Behind the caster
        state.fighters.enemy.pos.x = 100.0;

        tap(&mut keys, Key::Fireball);
        run(&mut state, &mut player, &mut keys, 1);
        assert_eq!(state.projectiles.len(), 1);

        let mut ticks = 0;
        while !state.projectiles.is_empty() && ticks < 500 {
            run(&mut state, &mut player, &mut keys, 1);
            ticks += 1;
        }

        assert!(state.projectiles.is_empty());
        // Out the right edge well before its 1.5s lifetime
        assert!(ticks < 150, "took {ticks} ticks");
        assert_eq!(state.fighters.enemy.health, 100.0);
        assert_eq!(state.fighters.player.health, 100.0);
        assert_eq!(state.feedback.shake, 0.0);
    }

    #[test]
    fn test_dash_on_cooldown_through_tick() {
        let mut state = MatchState::new(1);
        let mut player = human();
        let mut keys = KeyState::new();

        tap(&mut keys, Key::Dash);
        run(&mut state, &mut player, &mut keys, 1);
        let after_dash = state.fighters.player.vel.x;
        assert!(after_dash > 800.0);
        assert_eq!(state.hitboxes.len(), 1);

        tap(&mut keys, Key::Dash);
        run(&mut state, &mut player, &mut keys, 1);
        assert!(state.fighters.player.vel.x < after_dash);
        assert_eq!(state.hitboxes.len(), 1);
        assert!(state.fighters.player.cooldowns.dash < 2.4);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut state = MatchState::new(1);
        let mut player = human();
        let mut keys = KeyState::new();

        keys.press(Key::Jump);
        run(&mut state, &mut player, &mut keys, 1);
        let f = &state.fighters.player;
        assert!(!f.on_ground);
        assert_eq!(f.pose, Pose::Jump);
        let vy = f.vel.y;
        assert!(vy < -880.0);

        // Holding jump in the air does not re-launch
        run(&mut state, &mut player, &mut keys, 1);
        assert!(state.fighters.player.vel.y > vy);
    }

    #[test]
    fn test_controllers_idle_once_match_is_over() {
        let mut state = MatchState::new(1);
        let mut player = human();
        let mut keys = KeyState::new();
        state.fighters.enemy.health = 0.0;

        tap(&mut keys, Key::Shockwave);
        run(&mut state, &mut player, &mut keys, 1);

        assert!(state.hitboxes.is_empty());
        assert_eq!(state.fighters.player.cooldowns.shock, 0.0);
        assert_eq!(state.outcome(), Some(Outcome { loser: Team::Enemy }));
    }

    #[test]
    fn test_slow_motion_scales_time() {
        let mut state = MatchState::new(1);
        state.feedback.request_slow_motion(1.0);
        run(&mut state, &mut Dummy, &mut KeyState::new(), 1);
        assert!((state.feedback.time - SIM_DT * 0.55).abs() < 1e-6);
        assert!((state.feedback.slow_motion - (1.0 - SIM_DT)).abs() < 1e-6);
    }

    #[test]
    fn test_tick_clamps_long_steps() {
        let mut state = MatchState::new(1);
        tick(&mut state, &mut Dummy, &mut Dummy, &mut KeyState::new(), 1.0);
        assert!((state.feedback.time - MAX_TICK_DT).abs() < 1e-6);
    }

    #[test]
    fn test_session_substeps() {
        let mut session = Session::with_controllers(
            MatchState::new(2),
            Box::new(Dummy),
            Box::new(Dummy),
        );
        assert_eq!(session.frame(0.0), 0);
        assert_eq!(session.frame(SIM_DT * 3.5), 3);
        // Huge hitch is clamped and capped
        assert_eq!(session.frame(5.0), MAX_SUBSTEPS);
        assert_eq!(session.state.time_ticks, 3 + MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_held_attack_fires_once() {
        let mut session = Session::with_controllers(
            MatchState::new(4),
            Box::new(human()),
            Box::new(Dummy),
        );
        session.keys.press(Key::Attack);
        session.frame(0.05);
        assert_eq!(session.state.fighters.player.pose, Pose::Attack1);

        // Still held: the pose runs out and nothing re-triggers
        session.frame(0.1);
        assert_eq!(session.state.fighters.player.pose, Pose::Idle);

        session.keys.release(Key::Attack);
        session.keys.press(Key::Attack);
        session.frame(0.05);
        assert_eq!(session.state.fighters.player.pose, Pose::Attack1);
    }

    #[test]
    fn test_reset_key_restarts_match() {
        let mut session = Session::new(8);
        session.keys.press(Key::Fireball);
        session.frame(0.05);
        assert!(!session.state.projectiles.is_empty());
        session.state.fighters.player.health = 30.0;
        session.state.feedback.shake = 12.0;

        session.keys.press(Key::Reset);
        assert_eq!(session.frame(0.0), 0);

        let state = &session.state;
        assert_eq!(state.fighters, Fighters::default());
        assert!(state.hitboxes.is_empty());
        assert!(state.projectiles.is_empty());
        assert!(state.effects.is_empty());
        assert_eq!(state.feedback.shake, 0.0);
        assert_eq!(state.outcome(), None);
    }

    #[test]
    fn test_demo_match_finishes() {
        let mut session = Session::demo(2024, Tuning::default(), &Settings::default());
        let mut frames = 0;
        while !session.state.is_over() && frames < 60 * 300 {
            session.frame(1.0 / 60.0);
            frames += 1;
        }
        assert!(session.state.is_over(), "no winner after {frames} frames");
    }

    #[test]
    fn test_same_seed_same_match() {
        let mut a = Session::demo(77, Tuning::default(), &Settings::default());
        let mut b = Session::demo(77, Tuning::default(), &Settings::default());
        for _ in 0..600 {
            a.frame(1.0 / 60.0);
            b.frame(1.0 / 60.0);
        }
        assert_eq!(a.state.fighters, b.state.fighters);
        assert_eq!(a.state.hitboxes, b.state.hitboxes);
        assert_eq!(a.state.projectiles, b.state.projectiles);
    }

    #[test]
    fn test_camera_is_steady_without_shake() {
        let mut session = Session::new(5);
        let settings = Settings::default();
        let view = session.camera(&settings);
        // Fighters are centered at spawn
        assert_eq!(view.offset, Vec2::ZERO);
        assert_eq!(view.focus_x, ARENA_WIDTH / 2.0);
    }

    /// Distance a standing dash slides over one second ticked at `dt`
    fn dash_travel(dt: f32) -> f32 {
        let mut state = MatchState::new(1);
        let mut player = human();
        let mut keys = KeyState::new();
        tap(&mut keys, Key::Dash);
        let steps = (1.0 / dt).round() as usize;
        for _ in 0..steps {
            tick(&mut state, &mut player, &mut Dummy, &mut keys, dt);
        }
        state.fighters.player.pos.x - PLAYER_START_X
    }

    #[test]
    fn test_dash_travel_matches_across_tick_rates() {
        let at_60 = dash_travel(1.0 / REFERENCE_HZ);
        let at_sim = dash_travel(SIM_DT);
        assert!(at_60 > 40.0, "dash slid {at_60}px");
        // Friction and steering are measured in reference frames, so only
        // integration error separates the two rates
        assert!(
            (at_60 - at_sim).abs() / at_60 < 0.12,
            "60Hz {at_60}px vs sim rate {at_sim}px"
        );
    }

    #[test]
    fn test_reset_drops_presses_from_game_over() {
        let mut session = Session::with_controllers(
            MatchState::new(6),
            Box::new(human()),
            Box::new(Dummy),
        );
        session.state.fighters.enemy.health = 0.0;

        // Pressed on the game-over screen: controllers are idle
        session.keys.press(Key::Shockwave);
        session.keys.press(Key::Right);
        session.frame(0.05);
        assert!(session.state.hitboxes.is_empty());

        session.keys.press(Key::Reset);
        session.frame(0.05);

        assert!(session.state.hitboxes.is_empty());
        assert_eq!(session.state.fighters.player.cooldowns.shock, 0.0);
        assert_eq!(session.state.fighters.player.pose, Pose::Idle);
        // Still held, so the player keeps walking
        assert!(session.keys.is_held(Key::Right));
        assert!(session.state.fighters.player.vel.x > 0.0);
    }

    #[test]
    fn test_apply_settings_resizes_effect_budget() {
        let mut session = Session::new(9);
        for _ in 0..300 {
            session.state.effects.ring(Vec2::ZERO, 5.0);
        }
        assert_eq!(session.state.effects.len(), 300);

        session.apply_settings(&Settings::from_preset(crate::QualityPreset::Low));
        assert_eq!(session.state.effects.len(), 128);

        for _ in 0..10 {
            session.state.effects.ring(Vec2::ZERO, 5.0);
        }
        assert_eq!(session.state.effects.len(), 128);
    }

    const KEYS: [Key; 8] = [
        Key::Left,
        Key::Right,
        Key::Jump,
        Key::Attack,
        Key::Dash,
        Key::Shockwave,
        Key::Fireball,
        Key::Reset,
    ];

    proptest! {
        #[test]
        fn prop_fighters_stay_in_bounds(
            seed in any::<u64>(),
            events in prop::collection::vec((0usize..KEYS.len(), any::<bool>(), 1u32..6), 0..150),
        ) {
            let mut session = Session::new(seed);
            for (key, down, frames) in events {
                if down {
                    session.keys.press(KEYS[key]);
                } else {
                    session.keys.release(KEYS[key]);
                }
                for _ in 0..frames {
                    session.frame(1.0 / 60.0);
                }

                for f in session.state.fighters.iter() {
                    prop_assert!((0.0..=MAX_HEALTH).contains(&f.health));
                    prop_assert!(f.invulnerable >= 0.0);
                    prop_assert!(f.cooldowns.dash >= 0.0);
                    prop_assert!(f.cooldowns.shock >= 0.0);
                    prop_assert!(f.cooldowns.fire >= 0.0);
                    prop_assert!(f.pos.x >= WALL_MARGIN && f.pos.x <= ARENA_WIDTH - WALL_MARGIN);
                    prop_assert!(f.pos.y <= FLOOR_Y);
                }
                prop_assert!(session.state.feedback.shake >= 0.0);
                prop_assert!(session.state.feedback.slow_motion >= 0.0);
            }
        }
    }
}
