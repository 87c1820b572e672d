// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Audio Parameter Derivation
//
// Turns the engine's distortion signal into synthesis parameters. No audio is
// produced here; the host feeds these values into its own graph.

use std::f64::consts::PI;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::types::{Failure, FailureType};

/// Samples in a wave-shaper curve.
pub const CURVE_SAMPLES: usize = 44_100;

const BASE_GAIN: f64 = 0.05;
const CUTOFF_MAX_HZ: f64 = 20_000.0;
const CUTOFF_SWEEP_HZ: f64 = 18_000.0;
const CUTOFF_MIN_HZ: f64 = 100.0;

/// Melody notes (Hz) and the interval between them.
pub const MELODY_HZ: [f64; 7] = [440.0, 494.0, 523.0, 587.0, 659.0, 698.0, 784.0];
pub const NOTE_INTERVAL_MS: u64 = 800;

/// Wave-shaper transfer curve for `amount` in `[0, 100]`.
pub fn distortion_curve(amount: f64, samples: usize) -> Vec<f32> {
    (0..samples)
        .map(|i| {
            let x = (i as f64 * 2.0) / samples as f64 - 1.0;
            (((3.0 + amount) * x * 20.0 * PI / 180.0) / (PI + amount * x.abs())) as f32
        })
        .collect()
}

/// Frequency of the melody note playing `elapsed_ms` into playback.
pub fn note_at(elapsed_ms: u64) -> f64 {
    let idx = (elapsed_ms / NOTE_INTERVAL_MS) as usize % MELODY_HZ.len();
    MELODY_HZ[idx]
}

// ---------------------------------------------------------------------------
// AudioParams
// ---------------------------------------------------------------------------

/// Synthesis parameters for one distortion level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioParams {
    /// Passed to [`distortion_curve`].
    pub curve_amount: f64,
    pub lowpass_hz: f64,
    pub gain: f64,
}

impl AudioParams {
    pub fn from_distortion(distortion: f64) -> Self {
        let d = distortion.clamp(0.0, 1.0);
        Self {
            curve_amount: d * 100.0,
            lowpass_hz: (CUTOFF_MAX_HZ - d * CUTOFF_SWEEP_HZ).max(CUTOFF_MIN_HZ),
            gain: BASE_GAIN,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioDegrader
// ---------------------------------------------------------------------------

/// Seeded decisions for erratic volume drops and severe cuts.
pub struct AudioDegrader {
    rng: ChaCha8Rng,
    muted_until_ms: Option<u64>,
}

impl AudioDegrader {
    /// Distortion above which dropouts may happen.
    pub const DROPOUT_ONSET: f64 = 0.7;
    /// Distortion above which severe audio failures may cut.
    pub const SEVERE_ONSET: f64 = 0.8;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            muted_until_ms: None,
        }
    }

    /// One degradation poll. May start a 100-400 ms mute; returns its end.
    pub fn poll(&mut self, now_ms: u64, distortion: f64) -> Option<u64> {
        if self.is_muted(now_ms) || distortion <= Self::DROPOUT_ONSET {
            return None;
        }
        if self.rng.gen::<f64>() > 0.98 {
            let until = now_ms + self.rng.gen_range(100..400);
            self.muted_until_ms = Some(until);
            return Some(until);
        }
        None
    }

    pub fn is_muted(&self, now_ms: u64) -> bool {
        self.muted_until_ms.map_or(false, |until| now_ms < until)
    }

    pub fn gain_at(&self, now_ms: u64, params: &AudioParams) -> f64 {
        if self.is_muted(now_ms) { 0.0 } else { params.gain }
    }

    /// Whether any severe audio failure cuts the output this poll.
    pub fn severe_cut(&mut self, failures: &[Failure], distortion: f64) -> bool {
        if distortion <= Self::SEVERE_ONSET {
            return false;
        }
        let mut cut = false;
        for f in failures
            .iter()
            .filter(|f| f.failure_type == FailureType::Audio && f.severity > 7)
        {
            if self.rng.gen::<f64>() > 0.95 {
                cut = true;
            }
        }
        cut
    }
}
