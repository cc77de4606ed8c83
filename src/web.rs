//! Browser bindings
//!
//! The JavaScript AR host owns rendering, hit testing and the frame loop.
//! It forwards events here and applies the returned JSON command batches.

use glam::Mat4;
use wasm_bindgen::prelude::*;

use crate::consts::SPAWN_INTERVAL_SECS;
use crate::host::SpawnTimer;
use crate::hud;
use crate::sim::{Session, SessionCommand, SessionError, TargetId};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("AR Target Range loaded");
}

fn now_secs() -> f64 {
    js_sys::Date::now() / 1000.0
}

fn to_js(err: SessionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// One session plus the spawn timer the page drives
#[wasm_bindgen]
pub struct TargetRange {
    session: Session,
    timer: SpawnTimer,
}

#[wasm_bindgen]
impl TargetRange {
    /// Create a session; seeds from the clock when `seed` is omitted
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> TargetRange {
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        log::info!("Session created with seed: {}", seed);
        TargetRange {
            session: Session::new(seed),
            timer: SpawnTimer::new(SPAWN_INTERVAL_SECS),
        }
    }

    pub fn start(&mut self) -> Result<String, JsValue> {
        let commands = self.session.on_scene_start(now_secs()).map_err(to_js)?;
        self.apply(commands)
    }

    /// Frame update: release due spawn ticks
    pub fn advance(&mut self, dt_secs: f64) -> Result<String, JsValue> {
        let mut commands = Vec::new();
        for _ in 0..self.timer.advance(dt_secs) {
            commands.extend(self.session.on_spawn_tick().map_err(to_js)?);
        }
        self.apply(commands)
    }

    /// Touch already hit-tested by the page (`undefined` for a miss)
    pub fn touch(&mut self, hit: Option<u32>) -> Result<String, JsValue> {
        let commands = self
            .session
            .on_touch(hit.map(TargetId), now_secs())
            .map_err(to_js)?;
        self.apply(commands)
    }

    #[wasm_bindgen(js_name = targetDestroyed)]
    pub fn target_destroyed(&mut self) -> Result<String, JsValue> {
        let commands = self.session.on_target_destroyed(now_secs()).map_err(to_js)?;
        self.apply(commands)
    }

    /// Tap-to-place in front of the camera (column-major 4x4)
    #[wasm_bindgen(js_name = placeTap)]
    pub fn place_tap(&mut self, camera: &[f32]) -> Result<String, JsValue> {
        if camera.len() != 16 {
            return Err(JsValue::from_str("camera transform must have 16 elements"));
        }
        let commands = self
            .session
            .on_place_tap(Mat4::from_cols_slice(camera))
            .map_err(to_js)?;
        self.apply(commands)
    }

    /// Update the frame automatic spawns are placed around
    #[wasm_bindgen(js_name = setPlayerFrame)]
    pub fn set_player_frame(&mut self, frame: &[f32]) -> Result<(), JsValue> {
        if frame.len() != 16 {
            return Err(JsValue::from_str("player frame must have 16 elements"));
        }
        self.session.set_player_frame(Mat4::from_cols_slice(frame));
        Ok(())
    }

    #[wasm_bindgen(js_name = remainingLabel)]
    pub fn remaining_label(&self) -> Result<String, JsValue> {
        encode(&hud::remaining_label(self.session.state().remaining_count()))
    }

    #[wasm_bindgen(js_name = timeTakenLabel)]
    pub fn time_taken_label(&self, elapsed_secs: f64) -> Result<String, JsValue> {
        encode(&hud::time_taken_label(elapsed_secs))
    }

    pub fn seed(&self) -> f64 {
        self.session.seed() as f64
    }
}

impl TargetRange {
    /// Stop the local timer when the session asks for it, then hand the
    /// batch to the page
    fn apply(&mut self, commands: Vec<SessionCommand>) -> Result<String, JsValue> {
        if commands
            .iter()
            .any(|c| matches!(c, SessionCommand::CancelSpawnTimer))
        {
            self.timer.cancel();
        }
        encode(&commands)
    }
}
