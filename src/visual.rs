// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Visual Parameter Derivation

use rand::Rng;
use serde::Serialize;

/// Glitch intensity at or below which no bars are drawn.
const GLITCH_BAR_ONSET: f64 = 0.3;

// ─── Overlay layers ──────────────────────────────────────────────────────────

/// Which corruption layers a renderer should draw at a given level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverlayLayers {
    pub corruption_overlay: bool,
    pub scan_lines: bool,
    /// Alpha of the RGB colour-shift gradient, `None` when not drawn.
    pub color_shift_alpha: Option<f64>,
    pub static_noise: bool,
}

pub fn overlay_layers(level: f64) -> OverlayLayers {
    if level < 40.0 {
        return OverlayLayers::default();
    }
    OverlayLayers {
        corruption_overlay: true,
        scan_lines: level > 60.0,
        color_shift_alpha: (level > 70.0).then(|| level / 400.0),
        static_noise: level > 80.0,
    }
}

// ─── Glitch bars ─────────────────────────────────────────────────────────────

/// One red bar. Position in percent of the viewport, size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlitchBar {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
}

pub fn glitch_bars<R: Rng + ?Sized>(glitch_intensity: f64, rng: &mut R) -> Vec<GlitchBar> {
    if glitch_intensity <= GLITCH_BAR_ONSET {
        return Vec::new();
    }
    let count = (glitch_intensity.min(1.0) * 10.0).floor() as u32;
    (0..count)
        .map(|id| GlitchBar {
            id,
            x: rng.gen::<f64>() * 100.0,
            y: rng.gen::<f64>() * 100.0,
            width: rng.gen::<f64>() * 200.0 + 50.0,
            height: rng.gen::<f64>() * 20.0 + 5.0,
            opacity: rng.gen::<f64>() * 0.5 + 0.1,
        })
        .collect()
}

/// Glitch animation period in seconds; `None` below the onset.
pub fn glitch_period_secs(glitch_intensity: f64) -> Option<f64> {
    (glitch_intensity >= GLITCH_BAR_ONSET).then(|| 0.5 - glitch_intensity.min(1.0) * 0.3)
}

// ─── Timer display ───────────────────────────────────────────────────────────

/// CSS-style transform values for the countdown display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerStyle {
    pub blur_px: f64,
    pub hue_rotate_deg: f64,
    pub skew_x_deg: f64,
    pub skew_y_deg: f64,
    pub opacity: f64,
}

impl TimerStyle {
    pub fn from_level(level: f64) -> Self {
        let d = (level / 100.0).clamp(0.0, 1.0);
        Self {
            blur_px: d * 2.0,
            hue_rotate_deg: d * 90.0,
            skew_x_deg: d * 5.0,
            skew_y_deg: d * 2.0,
            opacity: 1.0 - d * 0.3,
        }
    }
}

/// Seconds shown on the countdown. Jitters by up to 1.5 s once past 30%.
pub fn displayed_seconds<R: Rng + ?Sized>(remaining_ms: u64, level: f64, rng: &mut R) -> f64 {
    let jitter = if level / 100.0 > 0.3 {
        rng.gen::<f64>() * 3.0 - 1.5
    } else {
        0.0
    };
    (remaining_ms as f64 / 1000.0 + jitter).max(0.0)
}

pub fn status_message(level: f64) -> &'static str {
    if level > 80.0 {
        "CRITICAL: system failure imminent"
    } else if level > 60.0 {
        "WARNING: multiple errors detected"
    } else if level > 40.0 {
        "ATTENTION: system degradation"
    } else if level > 20.0 {
        "Status: minor delays detected"
    } else {
        "Status: operational"
    }
}

// ─── Frame parameters ────────────────────────────────────────────────────────

/// Deterministic render parameters for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualParams {
    pub layers: OverlayLayers,
    pub timer: TimerStyle,
    /// Title glitch animation period; `None` while the glitch is off.
    pub glitch_period_secs: Option<f64>,
    pub status: &'static str,
}

impl VisualParams {
    pub fn derive(level: f64, glitch_intensity: f64) -> Self {
        Self {
            layers: overlay_layers(level),
            timer: TimerStyle::from_level(level),
            glitch_period_secs: glitch_period_secs(glitch_intensity),
            status: status_message(level),
        }
    }
}
