// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite

pub mod types;
pub mod config;
pub mod degradation;
pub mod schedule;
pub mod registry;
pub mod timers;
pub mod clock;
pub mod engine;

// Consumer-side parameter derivation (read-only over the engine)
pub mod audio;
pub mod visual;
pub mod interference;

pub use types::*;
pub use config::{ConfigError, EngineConfig};
pub use engine::ObsolescenceEngine;
pub use registry::{FailureRegistry, RegistryError};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser-facing handle around one [`ObsolescenceEngine`].
///
/// The host drives it with `runFor(ms)` from its own animation or interval
/// loop and reads state through `snapshot()`.
#[wasm_bindgen]
pub struct WasmSession {
    engine: ObsolescenceEngine,
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
impl WasmSession {
    /// `config` is an optional JSON string; defaults otherwise.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<WasmSession, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = match config {
            Some(json) => EngineConfig::from_json_str(&json).map_err(js_err)?,
            None => EngineConfig::default(),
        };
        let engine = ObsolescenceEngine::new(config).map_err(js_err)?;
        Ok(Self { engine })
    }

    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.engine.snapshot()).unwrap_or(JsValue::NULL)
    }

    /// Failures matching any of the given type names (e.g. `["input", "button"]`).
    #[wasm_bindgen(js_name = failuresByType)]
    pub fn failures_by_type(&self, types: JsValue) -> Result<JsValue, JsValue> {
        let types: Vec<FailureType> = serde_wasm_bindgen::from_value(types).map_err(js_err)?;
        let matching: Vec<&Failure> = self.engine.failures_by_type(&types).collect();
        serde_wasm_bindgen::to_value(&matching).map_err(js_err)
    }

    #[wasm_bindgen(js_name = startTimer)]
    pub fn start_timer(&mut self) {
        self.engine.start_timer();
    }

    #[wasm_bindgen(js_name = stopTimer)]
    pub fn stop_timer(&mut self) {
        self.engine.stop_timer();
    }

    /// Returns the failures fired by this advance.
    pub fn advance(&mut self, delta_ms: f64) -> JsValue {
        let report = self.engine.advance(delta_ms.max(0.0) as u64);
        serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
    }

    /// Returns the failures injected while running.
    #[wasm_bindgen(js_name = runFor)]
    pub fn run_for(&mut self, ms: f64) -> JsValue {
        let injected = self.engine.run_for(ms.max(0.0) as u64);
        serde_wasm_bindgen::to_value(&injected).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = addFailure)]
    pub fn add_failure(&mut self, failure: JsValue) -> Result<(), JsValue> {
        let failure: Failure = serde_wasm_bindgen::from_value(failure).map_err(js_err)?;
        self.engine.add_failure(failure).map_err(js_err)
    }

    #[wasm_bindgen(js_name = removeFailure)]
    pub fn remove_failure(&mut self, id: &str) -> bool {
        self.engine.remove_failure(&FailureId::from(id)).is_some()
    }

    #[wasm_bindgen(js_name = setSurveyProgress)]
    pub fn set_survey_progress(&mut self, progress: f64) {
        self.engine.set_survey_progress(progress);
    }

    #[wasm_bindgen(js_name = completeSurvey)]
    pub fn complete_survey(&mut self) {
        self.engine.complete_survey();
    }

    #[wasm_bindgen(js_name = setDistortionLevel)]
    pub fn set_distortion_level(&mut self, level: f64) {
        self.engine.set_distortion_level(level);
    }

    #[wasm_bindgen(js_name = setVisualCorruption)]
    pub fn set_visual_corruption(&mut self, value: f64) {
        self.engine.set_visual_corruption(value);
    }

    #[wasm_bindgen(js_name = setGlitchIntensity)]
    pub fn set_glitch_intensity(&mut self, value: f64) {
        self.engine.set_glitch_intensity(value);
    }

    #[wasm_bindgen(js_name = setAudioPlaying)]
    pub fn set_audio_playing(&mut self, playing: bool) {
        self.engine.set_audio_playing(playing);
    }

    #[wasm_bindgen(js_name = setUserName)]
    pub fn set_user_name(&mut self, name: String) {
        self.engine.set_user_name(name);
    }

    #[wasm_bindgen(js_name = setLoggedIn)]
    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.engine.set_logged_in(logged_in);
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    #[wasm_bindgen(js_name = resetKeepingIdentity)]
    pub fn reset_keeping_identity(&mut self) {
        self.engine.reset_keeping_identity();
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
    }

    /// Overlay, timer and status parameters for the current frame.
    #[wasm_bindgen(js_name = visualParams)]
    pub fn visual_params(&self) -> JsValue {
        let params = visual::VisualParams::derive(
            self.engine.degradation_level(),
            self.engine.glitch_intensity(),
        );
        serde_wasm_bindgen::to_value(&params).unwrap_or(JsValue::NULL)
    }

    /// Wave-shaper curve for the current distortion level.
    #[wasm_bindgen(js_name = distortionCurve)]
    pub fn distortion_curve(&self) -> Vec<f32> {
        let params = audio::AudioParams::from_distortion(self.engine.distortion_level());
        audio::distortion_curve(params.curve_amount, audio::CURVE_SAMPLES)
    }
}
