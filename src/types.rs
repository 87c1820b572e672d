// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Type Definitions

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Failure Type ────────────────────────────────────────────────────────────

/// Category of experience a consumer checks before corrupting its own behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FailureType {
    Button,
    Input,
    Audio,
    Visual,
    Navigation,
}

impl FailureType {
    /// Failure types the survey layer reacts to.
    pub const SURVEY: [FailureType; 3] = [Self::Input, Self::Button, Self::Navigation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Input => "input",
            Self::Audio => "audio",
            Self::Visual => "visual",
            Self::Navigation => "navigation",
        }
    }
}

// ─── Failure Kind ────────────────────────────────────────────────────────────

/// Named malfunction. Each kind maps to a fixed `(type, severity)` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ButtonDelay,
    AudioDistortion,
    VisualGlitch,
    InputLag,
    ButtonUnresponsive,
    ScreenFlicker,
    AudioCuts,
    NavigationBlock,
    SurveyCorruption,
    TotalBreakdown,
    /// The reward request fails. Injected once, after survey completion.
    RewardFailure,
}

impl FailureKind {
    pub fn failure_type(&self) -> FailureType {
        match self {
            Self::ButtonDelay | Self::ButtonUnresponsive => FailureType::Button,
            Self::AudioDistortion | Self::AudioCuts => FailureType::Audio,
            Self::VisualGlitch | Self::ScreenFlicker | Self::TotalBreakdown => FailureType::Visual,
            Self::InputLag | Self::SurveyCorruption => FailureType::Input,
            Self::NavigationBlock | Self::RewardFailure => FailureType::Navigation,
        }
    }

    /// Severity on the 1-10 scale.
    pub fn severity(&self) -> u8 {
        match self {
            Self::ButtonDelay => 3,
            Self::VisualGlitch => 4,
            Self::AudioDistortion => 5,
            Self::InputLag => 6,
            Self::ButtonUnresponsive => 7,
            Self::ScreenFlicker | Self::AudioCuts => 8,
            Self::NavigationBlock | Self::SurveyCorruption => 9,
            Self::TotalBreakdown | Self::RewardFailure => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ButtonDelay => "button_delay",
            Self::AudioDistortion => "audio_distortion",
            Self::VisualGlitch => "visual_glitch",
            Self::InputLag => "input_lag",
            Self::ButtonUnresponsive => "button_unresponsive",
            Self::ScreenFlicker => "screen_flicker",
            Self::AudioCuts => "audio_cuts",
            Self::NavigationBlock => "navigation_block",
            Self::SurveyCorruption => "survey_corruption",
            Self::TotalBreakdown => "total_breakdown",
            Self::RewardFailure => "reward_failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Failure ─────────────────────────────────────────────────────────────────

/// Unique failure token: `{kind}_{timestamp}_{seq}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FailureId(pub String);

impl FailureId {
    pub fn new(kind: FailureKind, timestamp_ms: u64, seq: u64) -> Self {
        Self(format!("{}_{}_{}", kind, timestamp_ms, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FailureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One simulated malfunction. Immutable once created; removal deactivates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Failure {
    pub id: FailureId,
    pub kind: FailureKind,
    #[serde(rename = "type")]
    pub failure_type: FailureType,
    pub severity: u8,
    pub active: bool,
    /// Logical creation instant (ms). Ordering only.
    pub timestamp: u64,
}

impl Failure {
    pub fn new(kind: FailureKind, timestamp_ms: u64, seq: u64) -> Self {
        Self {
            id: FailureId::new(kind, timestamp_ms, seq),
            kind,
            failure_type: kind.failure_type(),
            severity: kind.severity(),
            active: true,
            timestamp: timestamp_ms,
        }
    }

    /// Chance in `[0, 1]` that a consumer corrupts its behavior for this failure.
    pub fn trigger_probability(&self) -> f64 {
        (self.severity as f64 / 10.0).clamp(0.0, 1.0)
    }
}

// ─── Session Phase ───────────────────────────────────────────────────────────

/// Derived lifecycle position. Never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionPhase {
    LoggedOut,
    /// Logged in, clock not running.
    Ready,
    Active,
    SurveyInProgress,
    RewardPromised,
    RewardFailed,
    /// `degradation_level >= 100`, reachable by time alone.
    TerminalBreakdown,
}

/// Coarse banding of the degradation level used by status displays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeverityBand {
    Optimal,
    Degraded,
    Critical,
}

impl SeverityBand {
    pub fn from_level(level: f64) -> Self {
        if level < 30.0 {
            Self::Optimal
        } else if level < 60.0 {
            Self::Degraded
        } else {
            Self::Critical
        }
    }
}

// ─── TickReport ──────────────────────────────────────────────────────────────

/// Outcome of one `advance` call. Default when the call was rejected.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub time_elapsed_ms: u64,
    pub degradation_level: f64,
    pub fired: Vec<Failure>,
    /// True only on the advance that first reaches 100%.
    pub reached_terminal: bool,
}

// ─── EngineSnapshot ──────────────────────────────────────────────────────────

/// The full state-read surface, as one serializable value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub time_elapsed: u64,
    pub degradation_level: f64,
    pub distortion_level: f64,
    pub visual_corruption: f64,
    pub glitch_intensity: f64,
    pub active_failures: Vec<Failure>,
    pub total_failures: u32,
    pub is_active: bool,
    pub survey_progress: f64,
    pub survey_completed: bool,
    pub reward_promised: bool,
    pub reward_given: bool,
    pub audio_playing: bool,
    pub is_logged_in: bool,
    pub user_name: Option<String>,
    pub experience_duration_ms: u64,
    pub remaining_ms: u64,
    pub phase: SessionPhase,
    pub severity_band: SeverityBand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(FailureKind::ButtonDelay.failure_type(), FailureType::Button);
        assert_eq!(FailureKind::ButtonDelay.severity(), 3);
        assert_eq!(FailureKind::SurveyCorruption.failure_type(), FailureType::Input);
        assert_eq!(FailureKind::TotalBreakdown.failure_type(), FailureType::Visual);
        assert_eq!(FailureKind::RewardFailure.failure_type(), FailureType::Navigation);
        assert_eq!(FailureKind::RewardFailure.severity(), 10);
    }

    #[test]
    fn test_failure_id_format() {
        let f = Failure::new(FailureKind::InputLag, 90_000, 4);
        assert_eq!(f.id.as_str(), "input_lag_90000_4");
        assert!(f.active);
        assert_eq!(f.timestamp, 90_000);
    }

    #[test]
    fn test_failure_serializes_type_field() {
        let f = Failure::new(FailureKind::AudioCuts, 1, 0);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["type"], "audio");
        assert_eq!(json["kind"], "audio_cuts");
        assert_eq!(json["severity"], 8);
    }

    #[test]
    fn test_severity_band() {
        assert_eq!(SeverityBand::from_level(0.0), SeverityBand::Optimal);
        assert_eq!(SeverityBand::from_level(30.0), SeverityBand::Degraded);
        assert_eq!(SeverityBand::from_level(59.9), SeverityBand::Degraded);
        assert_eq!(SeverityBand::from_level(100.0), SeverityBand::Critical);
    }
}
