// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Survey Interference
//
// Seeded decisions the survey layer makes from the active failures. The
// engine stays deterministic; all randomness lives here.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::types::{Failure, FailureKind, FailureType};

/// Level below which question text is left intact.
const TEXT_CORRUPTION_ONSET: f64 = 30.0;

/// What happens to a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputOutcome {
    Accepted(String),
    /// The unmodified value lands after `delay_ms`.
    Delayed { value: String, delay_ms: u64 },
}

/// What happens to a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ButtonOutcome {
    Proceed,
    Delayed { delay_ms: u64 },
    /// The press is lost.
    Swallowed,
}

pub struct Interference {
    rng: ChaCha8Rng,
}

impl Interference {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    fn triggers(&mut self, failure: &Failure) -> bool {
        self.rng.gen_bool(failure.trigger_probability())
    }

    /// Replace `floor(d * len * 0.3)` random characters with printable ASCII.
    pub fn corrupt_text(&mut self, text: &str, level: f64) -> String {
        if level < TEXT_CORRUPTION_ONSET {
            return text.to_string();
        }
        let mut chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        let d = (level / 100.0).clamp(0.0, 1.0);
        let swaps = (d * chars.len() as f64 * 0.3).floor() as usize;
        for _ in 0..swaps {
            let idx = self.rng.gen_range(0..chars.len());
            chars[idx] = char::from(self.rng.gen_range(33u8..127));
        }
        chars.into_iter().collect()
    }

    /// Apply active `input` failures to a typed value.
    pub fn on_input(&mut self, value: &str, failures: &[Failure]) -> InputOutcome {
        let mut current = value.to_string();
        for f in failures.iter().filter(|f| f.failure_type == FailureType::Input) {
            if !self.triggers(f) {
                continue;
            }
            match f.kind {
                FailureKind::InputLag => {
                    return InputOutcome::Delayed {
                        value: value.to_string(),
                        delay_ms: f.severity as u64 * 100,
                    };
                }
                FailureKind::SurveyCorruption => {
                    current = value.chars().rev().collect();
                }
                _ => {
                    if self.rng.gen::<f64>() > 0.7 {
                        current.pop();
                    }
                }
            }
        }
        InputOutcome::Accepted(current)
    }

    /// Apply active `button` failures to a press.
    pub fn on_button(&mut self, failures: &[Failure]) -> ButtonOutcome {
        for f in failures.iter().filter(|f| f.failure_type == FailureType::Button) {
            if !self.triggers(f) {
                continue;
            }
            match f.kind {
                FailureKind::ButtonDelay => {
                    return ButtonOutcome::Delayed { delay_ms: f.severity as u64 * 200 };
                }
                FailureKind::ButtonUnresponsive => {
                    if self.rng.gen::<f64>() > 0.5 {
                        return ButtonOutcome::Swallowed;
                    }
                }
                _ => {}
            }
        }
        ButtonOutcome::Proceed
    }

    /// Whether a survey submission is rejected with a "connection error".
    pub fn submit_blocked(&mut self, failures: &[Failure]) -> bool {
        let critical = failures
            .iter()
            .any(|f| f.failure_type == FailureType::Navigation && f.severity > 8);
        critical && self.rng.gen::<f64>() > 0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(kind: FailureKind) -> Failure {
        Failure::new(kind, 0, 0)
    }

    #[test]
    fn test_text_untouched_below_onset() {
        let mut i = Interference::new(1);
        assert_eq!(i.corrupt_text("How old are you?", 29.0), "How old are you?");
    }

    #[test]
    fn test_text_corruption_keeps_length() {
        let mut i = Interference::new(1);
        let text = "How often do you replace your phone?";
        let out = i.corrupt_text(text, 100.0);
        assert_eq!(out.chars().count(), text.chars().count());
        assert!(out.chars().all(|c| c.is_ascii_graphic() || c == ' '));
    }

    #[test]
    fn test_no_failures_passes_through() {
        let mut i = Interference::new(9);
        assert_eq!(i.on_input("hello", &[]), InputOutcome::Accepted("hello".into()));
        assert_eq!(i.on_button(&[]), ButtonOutcome::Proceed);
        assert!(!i.submit_blocked(&[]));
    }

    #[test]
    fn test_input_lag_delays() {
        let mut i = Interference::new(4);
        let failures = vec![f(FailureKind::InputLag)];
        let delayed = (0..200)
            .filter_map(|_| match i.on_input("abc", &failures) {
                InputOutcome::Delayed { value, delay_ms } => Some((value, delay_ms)),
                InputOutcome::Accepted(_) => None,
            })
            .collect::<Vec<_>>();
        assert!(!delayed.is_empty());
        assert!(delayed.iter().all(|(v, d)| v == "abc" && *d == 600));
    }

    #[test]
    fn test_survey_corruption_reverses() {
        let mut i = Interference::new(4);
        let failures = vec![f(FailureKind::SurveyCorruption)];
        let seen_reversed = (0..100)
            .any(|_| i.on_input("abc", &failures) == InputOutcome::Accepted("cba".into()));
        assert!(seen_reversed);
    }

    #[test]
    fn test_button_outcomes() {
        let mut i = Interference::new(8);
        let delay = vec![f(FailureKind::ButtonDelay)];
        let outcomes: Vec<_> = (0..200).map(|_| i.on_button(&delay)).collect();
        assert!(outcomes.contains(&ButtonOutcome::Delayed { delay_ms: 600 }));
        assert!(outcomes.contains(&ButtonOutcome::Proceed));
        assert!(!outcomes.contains(&ButtonOutcome::Swallowed));

        let stuck = vec![f(FailureKind::ButtonUnresponsive)];
        assert!((0..200).any(|_| i.on_button(&stuck) == ButtonOutcome::Swallowed));
    }

    #[test]
    fn test_submit_blocked_needs_critical_navigation() {
        let mut i = Interference::new(3);
        let mild = vec![f(FailureKind::ButtonUnresponsive)];
        assert!((0..100).all(|_| !i.submit_blocked(&mild)));
        let critical = vec![f(FailureKind::RewardFailure)];
        assert!((0..100).any(|_| i.submit_blocked(&critical)));
    }

    #[test]
    fn test_seeded_runs_match() {
        let failures = vec![f(FailureKind::ButtonDelay), f(FailureKind::ButtonUnresponsive)];
        let mut a = Interference::new(42);
        let mut b = Interference::new(42);
        for _ in 0..50 {
            assert_eq!(a.on_button(&failures), b.on_button(&failures));
        }
    }
}
