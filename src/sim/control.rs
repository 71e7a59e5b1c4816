//! Input routing
//!
//! Both fighters are driven through the same `Controller` seam: the human
//! reads a `KeyState`, the AI reads the opponent and rolls its own RNG. A
//! controller only expresses an `Intent`; the tick applies it.

use std::collections::HashSet;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actions::Action;
use super::fighter::{Cooldowns, Fighter};
use crate::clamp;
use crate::tuning::{AiSpec, MovementSpec};

/// Logical inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Jump,
    Attack,
    Dash,
    Shockwave,
    Fireball,
    Reset,
}

impl Key {
    /// Map a keyboard key name to a logical input (case-insensitive)
    pub fn from_code(code: &str) -> Option<Key> {
        match code.to_ascii_lowercase().as_str() {
            "a" => Some(Key::Left),
            "d" => Some(Key::Right),
            "w" => Some(Key::Jump),
            "j" => Some(Key::Attack),
            "k" => Some(Key::Dash),
            "l" => Some(Key::Shockwave),
            "i" => Some(Key::Fireball),
            "r" => Some(Key::Reset),
            _ => None,
        }
    }
}

/// Held keys plus presses waiting to be consumed.
///
/// Presses are latched separately from the held set, so a tap that is
/// released before the next tick still fires exactly once.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<Key>,
    pressed: HashSet<Key>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down; auto-repeat while held is ignored
    pub fn press(&mut self, key: Key) {
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Take the latched press for `key`, if any
    pub fn consume(&mut self, key: Key) -> bool {
        self.pressed.remove(&key)
    }

    /// Forget presses nobody consumed; held keys are untouched
    pub fn clear_pressed(&mut self) {
        self.pressed.clear();
    }
}

/// Blend horizontal velocity toward `target_vx`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Steer {
    pub target_vx: f32,
    pub blend: f32,
}

/// What a controller wants its fighter to do this tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub steer: Option<Steer>,
    pub facing: Option<f32>,
    /// Jump if standing
    pub jump: bool,
    /// Resolved in order
    pub actions: Vec<Action>,
}

pub trait Controller {
    fn decide(
        &mut self,
        me: &mut Fighter,
        opponent: &Fighter,
        keys: &mut KeyState,
        dt: f32,
    ) -> Intent;
}

/// Keyboard-driven fighter
#[derive(Debug, Clone, Default)]
pub struct HumanController {
    movement: MovementSpec,
}

impl HumanController {
    pub fn new(movement: MovementSpec) -> Self {
        Self { movement }
    }
}

impl Controller for HumanController {
    fn decide(
        &mut self,
        _me: &mut Fighter,
        _opponent: &Fighter,
        keys: &mut KeyState,
        _dt: f32,
    ) -> Intent {
        let spec = &self.movement;
        let mut intent = Intent::default();

        if keys.is_held(Key::Left) {
            intent.steer = Some(Steer {
                target_vx: -spec.run_speed,
                blend: spec.run_blend,
            });
            intent.facing = Some(-1.0);
        } else if keys.is_held(Key::Right) {
            intent.steer = Some(Steer {
                target_vx: spec.run_speed,
                blend: spec.run_blend,
            });
            intent.facing = Some(1.0);
        } else {
            intent.steer = Some(Steer {
                target_vx: 0.0,
                blend: spec.stop_blend,
            });
        }

        intent.jump = keys.is_held(Key::Jump);

        for (key, action) in [
            (Key::Attack, Action::Basic),
            (Key::Dash, Action::Dash),
            (Key::Shockwave, Action::Shockwave),
            (Key::Fireball, Action::Fireball),
        ] {
            if keys.consume(key) {
                intent.actions.push(action);
            }
        }

        intent
    }
}

/// Computer opponent: walks in, then rolls for an action every few
/// hundred milliseconds.
#[derive(Debug, Clone)]
pub struct AiController<R: Rng = Pcg32> {
    spec: AiSpec,
    rng: R,
}

impl<R: Rng> AiController<R> {
    pub fn new(spec: AiSpec, rng: R) -> Self {
        Self { spec, rng }
    }

    fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Pick an action for the current distance, or nothing.
    ///
    /// Branches are tried in priority order and a branch only draws its
    /// random number once its other conditions hold.
    pub fn choose(&mut self, dist: f32, cooldowns: &Cooldowns) -> Option<Action> {
        let spec = self.spec;

        if dist < spec.shockwave_range && cooldowns.shock <= 0.0 && self.roll() < spec.ability_chance {
            return Some(Action::Shockwave);
        }
        if dist < spec.dash_range && cooldowns.dash <= 0.0 && self.roll() < spec.ability_chance {
            return Some(Action::Dash);
        }
        if dist > spec.fireball_min_range && cooldowns.fire <= 0.0 && self.roll() < spec.ability_chance
        {
            return Some(Action::Fireball);
        }
        if dist < spec.basic_range && self.roll() < spec.basic_chance {
            return Some(Action::Basic);
        }
        None
    }
}

impl<R: Rng> Controller for AiController<R> {
    fn decide(
        &mut self,
        me: &mut Fighter,
        opponent: &Fighter,
        _keys: &mut KeyState,
        dt: f32,
    ) -> Intent {
        let spec = self.spec;
        let mut intent = Intent::default();

        me.ai_timer -= dt;

        let dx = opponent.pos.x - me.pos.x;
        let dist = dx.abs();
        intent.facing = Some(if dx >= 0.0 { 1.0 } else { -1.0 });
        intent.steer = Some(if dist > spec.approach_distance {
            Steer {
                target_vx: clamp(dx, -1.0, 1.0) * spec.approach_speed,
                blend: spec.approach_blend,
            }
        } else {
            Steer {
                target_vx: 0.0,
                blend: spec.hold_blend,
            }
        });

        if me.ai_timer <= 0.0 {
            me.ai_timer = spec.retime_min + self.roll() * spec.retime_jitter;
            if let Some(action) = self.choose(dist, &me.cooldowns) {
                intent.actions.push(action);
            }
        }

        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fighter::Team;
    use rand::SeedableRng;

    const N: usize = 10_000;

    fn ai(seed: u64) -> AiController<Pcg32> {
        AiController::new(AiSpec::default(), Pcg32::seed_from_u64(seed))
    }

    fn frequencies(dist: f32, cooldowns: Cooldowns, seed: u64) -> [f32; 5] {
        let mut ai = ai(seed);
        let mut counts = [0usize; 5];
        for _ in 0..N {
            let slot = match ai.choose(dist, &cooldowns) {
                Some(Action::Shockwave) => 0,
                Some(Action::Dash) => 1,
                Some(Action::Fireball) => 2,
                Some(Action::Basic) => 3,
                None => 4,
            };
            counts[slot] += 1;
        }
        counts.map(|c| c as f32 / N as f32)
    }

    fn close(actual: f32, expected: f32) -> bool {
        (actual - expected).abs() < 0.02
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("a"), Some(Key::Left));
        assert_eq!(Key::from_code("D"), Some(Key::Right));
        assert_eq!(Key::from_code("w"), Some(Key::Jump));
        assert_eq!(Key::from_code("J"), Some(Key::Attack));
        assert_eq!(Key::from_code("k"), Some(Key::Dash));
        assert_eq!(Key::from_code("l"), Some(Key::Shockwave));
        assert_eq!(Key::from_code("i"), Some(Key::Fireball));
        assert_eq!(Key::from_code("r"), Some(Key::Reset));
        assert_eq!(Key::from_code("x"), None);
        assert_eq!(Key::from_code("ArrowLeft"), None);
    }

    #[test]
    fn test_press_is_consumed_once() {
        let mut keys = KeyState::new();
        keys.press(Key::Attack);
        // Auto-repeat
        keys.press(Key::Attack);
        assert!(keys.consume(Key::Attack));
        assert!(!keys.consume(Key::Attack));
        assert!(keys.is_held(Key::Attack));

        keys.press(Key::Attack);
        assert!(!keys.consume(Key::Attack));

        keys.release(Key::Attack);
        keys.press(Key::Attack);
        assert!(keys.consume(Key::Attack));
    }

    #[test]
    fn test_clear_pressed_keeps_held() {
        let mut keys = KeyState::new();
        keys.press(Key::Left);
        keys.press(Key::Fireball);
        keys.release(Key::Fireball);
        keys.clear_pressed();
        assert!(!keys.consume(Key::Left));
        assert!(!keys.consume(Key::Fireball));
        assert!(keys.is_held(Key::Left));
    }

    #[test]
    fn test_quick_tap_survives_release() {
        let mut keys = KeyState::new();
        keys.press(Key::Dash);
        keys.release(Key::Dash);
        assert!(!keys.is_held(Key::Dash));
        assert!(keys.consume(Key::Dash));
        assert!(!keys.consume(Key::Dash));
    }

    #[test]
    fn test_human_movement() {
        let mut human = HumanController::default();
        let mut me = Fighter::spawn(Team::Player);
        let opp = Fighter::spawn(Team::Enemy);
        let mut keys = KeyState::new();

        let idle = human.decide(&mut me, &opp, &mut keys, 0.01);
        assert_eq!(
            idle.steer,
            Some(Steer {
                target_vx: 0.0,
                blend: 0.22
            })
        );
        assert_eq!(idle.facing, None);
        assert!(!idle.jump);
        assert!(idle.actions.is_empty());

        keys.press(Key::Left);
        keys.press(Key::Right);
        let left = human.decide(&mut me, &opp, &mut keys, 0.01);
        assert_eq!(left.steer.map(|s| s.target_vx), Some(-620.0));
        assert_eq!(left.facing, Some(-1.0));

        keys.release(Key::Left);
        keys.press(Key::Jump);
        let right = human.decide(&mut me, &opp, &mut keys, 0.01);
        assert_eq!(
            right.steer,
            Some(Steer {
                target_vx: 620.0,
                blend: 0.18
            })
        );
        assert_eq!(right.facing, Some(1.0));
        assert!(right.jump);
    }

    #[test]
    fn test_human_actions_in_order() {
        let mut human = HumanController::default();
        let mut me = Fighter::spawn(Team::Player);
        let opp = Fighter::spawn(Team::Enemy);
        let mut keys = KeyState::new();

        keys.press(Key::Fireball);
        keys.press(Key::Attack);
        keys.press(Key::Shockwave);
        keys.press(Key::Dash);
        let intent = human.decide(&mut me, &opp, &mut keys, 0.01);
        assert_eq!(
            intent.actions,
            vec![
                Action::Basic,
                Action::Dash,
                Action::Shockwave,
                Action::Fireball
            ]
        );

        let again = human.decide(&mut me, &opp, &mut keys, 0.01);
        assert!(again.actions.is_empty());
    }

    #[test]
    fn test_ai_faces_and_approaches() {
        let mut ai = ai(7);
        let mut keys = KeyState::new();
        let mut me = Fighter::spawn(Team::Enemy);
        let opp = Fighter::spawn(Team::Player);

        let far = ai.decide(&mut me, &opp, &mut keys, 0.01);
        assert_eq!(far.facing, Some(-1.0));
        assert_eq!(
            far.steer,
            Some(Steer {
                target_vx: -420.0,
                blend: 0.08
            })
        );

        me.pos.x = opp.pos.x + 100.0;
        let near = ai.decide(&mut me, &opp, &mut keys, 0.01);
        assert_eq!(
            near.steer,
            Some(Steer {
                target_vx: 0.0,
                blend: 0.12
            })
        );

        me.pos.x = opp.pos.x;
        let level = ai.decide(&mut me, &opp, &mut keys, 0.01);
        assert_eq!(level.facing, Some(1.0));
    }

    #[test]
    fn test_ai_decides_only_when_timer_expires() {
        let mut ai = ai(11);
        let mut keys = KeyState::new();
        let mut me = Fighter::spawn(Team::Enemy);
        let opp = Fighter::spawn(Team::Player);

        ai.decide(&mut me, &opp, &mut keys, 0.01);
        assert!((0.25..=0.6).contains(&me.ai_timer), "timer {}", me.ai_timer);

        let timer = me.ai_timer;
        let intent = ai.decide(&mut me, &opp, &mut keys, 0.1);
        assert!(intent.actions.is_empty());
        assert!((me.ai_timer - (timer - 0.1)).abs() < 1e-6);
    }

    #[test]
    fn test_ai_close_range_distribution() {
        let f = frequencies(100.0, Cooldowns::default(), 1234);
        assert!(close(f[0], 0.25), "shockwave {}", f[0]);
        assert!(close(f[1], 0.1875), "dash {}", f[1]);
        assert_eq!(f[2], 0.0);
        assert!(close(f[3], 0.365_625), "basic {}", f[3]);
        assert!(close(f[4], 0.196_875), "idle {}", f[4]);
    }

    #[test]
    fn test_ai_long_range_distribution() {
        let f = frequencies(300.0, Cooldowns::default(), 99);
        assert_eq!(f[0], 0.0);
        assert_eq!(f[1], 0.0);
        assert!(close(f[2], 0.25), "fireball {}", f[2]);
        assert_eq!(f[3], 0.0);
        assert!(close(f[4], 0.75), "idle {}", f[4]);
    }

    #[test]
    fn test_ai_on_cooldown_falls_back_to_basic() {
        let cooling = Cooldowns {
            dash: 1.0,
            shock: 1.0,
            fire: 1.0,
        };
        let f = frequencies(100.0, cooling, 5);
        assert!(close(f[3], 0.65), "basic {}", f[3]);
        assert!(close(f[4], 0.35), "idle {}", f[4]);
    }

    #[test]
    fn test_ai_mid_range_does_nothing() {
        // Too far for melee and abilities, too close for a fireball
        let f = frequencies(240.0, Cooldowns::default(), 3);
        assert_eq!(f[4], 1.0);
    }

    #[test]
    fn test_ai_is_deterministic_per_seed() {
        let mut a = ai(42);
        let mut b = ai(42);
        for _ in 0..100 {
            assert_eq!(
                a.choose(150.0, &Cooldowns::default()),
                b.choose(150.0, &Cooldowns::default())
            );
        }
    }
}
