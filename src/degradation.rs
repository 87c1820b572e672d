// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Degradation Signals

use serde::{Deserialize, Serialize};

/// Level above which the glitch signal starts to rise.
const GLITCH_ONSET: f64 = 50.0;

/// `min(100, 100 · elapsed / duration)`.
pub fn degradation_level(time_elapsed_ms: u64, experience_duration_ms: u64) -> f64 {
    if experience_duration_ms == 0 {
        return 100.0;
    }
    (100.0 * time_elapsed_ms as f64 / experience_duration_ms as f64).min(100.0)
}

/// Shared by distortion and visual corruption: `level / 100`.
pub fn unit_signal(level: f64) -> f64 {
    (level / 100.0).clamp(0.0, 1.0)
}

/// Zero up to level 50, then linear to 1 at level 100.
pub fn glitch_intensity(level: f64) -> f64 {
    if level <= GLITCH_ONSET {
        0.0
    } else {
        ((level - GLITCH_ONSET) / (100.0 - GLITCH_ONSET)).min(1.0)
    }
}

/// Clamp a manual override into `[0, 1]`. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// DerivedSignals
// ---------------------------------------------------------------------------

/// Continuous decay signals recomputed from the degradation level on every advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedSignals {
    pub distortion_level: f64,
    pub visual_corruption: f64,
    pub glitch_intensity: f64,
}

impl DerivedSignals {
    pub fn from_level(level: f64) -> Self {
        Self {
            distortion_level: unit_signal(level),
            visual_corruption: unit_signal(level),
            glitch_intensity: glitch_intensity(level),
        }
    }
}
