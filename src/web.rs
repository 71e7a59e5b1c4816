//! Browser bridge
//!
//! The page owns the canvas, the keyboard listeners and the animation loop;
//! it forwards key names and `requestAnimationFrame` timestamps here and
//! draws whatever `snapshot_json` returns.

use wasm_bindgen::prelude::*;

use crate::settings::Settings;
use crate::sim::{Key, Session};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Already initialized if the module is instantiated twice
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Stick Duel starting...");
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    settings: Settings,
    last_ms: Option<f64>,
}

#[wasm_bindgen]
impl WebSession {
    /// Start a match; a non-finite or negative seed uses the current time
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> WebSession {
        let seed = if seed.is_finite() && seed >= 0.0 {
            seed as u64
        } else {
            js_sys::Date::now() as u64
        };
        let settings = Settings::default();
        WebSession {
            session: Session::with_config(seed, Tuning::default(), &settings),
            settings,
            last_ms: None,
        }
    }

    /// Returns true when the key is bound, so the page can suppress its default
    pub fn key_down(&mut self, code: &str) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.session.keys.press(key);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.session.keys.release(key);
                true
            }
            None => false,
        }
    }

    /// Advance to the animation-frame timestamp `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let elapsed = match self.last_ms {
            Some(prev) => ((now_ms - prev) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        self.session.frame(elapsed)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(js_error)
    }

    /// Camera offset for this frame (draws from the camera RNG)
    pub fn camera_json(&mut self) -> Result<String, JsValue> {
        let view = self.session.camera(&self.settings);
        serde_json::to_string(&view).map_err(js_error)
    }

    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.settings = Settings::from_json(json).map_err(js_error)?;
        self.session.apply_settings(&self.settings);
        Ok(())
    }

    /// Swap in a new balance table and restart the match
    pub fn load_tuning_json(&mut self, json: &str) -> Result<(), JsValue> {
        let tuning = Tuning::from_json(json).map_err(js_error)?;
        let seed = self.session.state.seed;
        self.session = Session::with_config(seed, tuning, &self.settings);
        self.last_ms = None;
        Ok(())
    }
}
