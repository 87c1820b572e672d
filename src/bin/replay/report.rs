// Replay Report Types
// Structured output for one scripted session

use obsolescence_engine::{Failure, SessionPhase};
use serde::Serialize;

// ─── Timeline ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    Failure {
        at_ms: u64,
        time_elapsed: u64,
        degradation_level: f64,
        failure: Failure,
    },
    Phase {
        at_ms: u64,
        from: SessionPhase,
        to: SessionPhase,
    },
    /// Consumer-side decision sampled on a survey interaction.
    Interaction {
        at_ms: u64,
        action: &'static str,
        outcome: String,
    },
}

// ─── Report ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub final_time_elapsed: u64,
    pub final_degradation_level: f64,
    pub final_phase: SessionPhase,
    pub total_failures: u32,
    pub threshold_failures: usize,
    pub expected_threshold_failures: usize,
    pub reward_failures: usize,
    pub reward_given: bool,
    pub terminal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub seed: u64,
    pub experience_duration_ms: u64,
    pub tick_ms: u64,
    pub survey_at_ms: Option<u64>,
    pub summary: ReplaySummary,
    pub timeline: Vec<TimelineEvent>,
}

/// Print the timeline as an aligned table.
pub fn print_timeline(timeline: &[TimelineEvent]) {
    println!("  {:>9} {:<12} {}", "At(ms)", "Event", "Detail");
    println!("  {}", "-".repeat(72));
    for ev in timeline {
        match ev {
            TimelineEvent::Failure { at_ms, degradation_level, failure, .. } => {
                println!(
                    "  {:>9} {:<12} {:<22} type={:<10} sev={:>2} level={:>6.2}%",
                    at_ms,
                    "failure",
                    failure.kind.as_str(),
                    failure.failure_type.as_str(),
                    failure.severity,
                    degradation_level,
                );
            }
            TimelineEvent::Phase { at_ms, from, to } => {
                println!("  {:>9} {:<12} {:?} -> {:?}", at_ms, "phase", from, to);
            }
            TimelineEvent::Interaction { at_ms, action, outcome } => {
                println!("  {:>9} {:<12} {:<10} {}", at_ms, "interaction", action, outcome);
            }
        }
    }
}
