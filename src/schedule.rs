// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Failure Threshold Scheduler

use crate::types::FailureKind;

/// Ordered threshold table. Entry `k` sits at `(k + 1) / 6` of the experience.
pub const FAILURE_POINTS: [&[FailureKind]; 6] = [
    &[FailureKind::ButtonDelay],
    &[FailureKind::AudioDistortion, FailureKind::VisualGlitch],
    &[FailureKind::InputLag, FailureKind::ButtonUnresponsive],
    &[FailureKind::ScreenFlicker, FailureKind::AudioCuts],
    &[FailureKind::NavigationBlock, FailureKind::SurveyCorruption],
    &[FailureKind::TotalBreakdown],
];

/// A threshold instant and the failure kinds it injects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePoint {
    pub threshold_ms: u64,
    pub kinds: &'static [FailureKind],
}

/// Edge detector over the threshold table.
///
/// A threshold fires when `old < threshold <= new`, and at most once per
/// session. `reset()` builds a fresh schedule for the next session.
#[derive(Debug, Clone)]
pub struct FailureSchedule {
    points: Vec<FailurePoint>,
    fired: Vec<bool>,
}

impl FailureSchedule {
    pub fn new(experience_duration_ms: u64) -> Self {
        let n = FAILURE_POINTS.len() as u128;
        let points = FAILURE_POINTS
            .iter()
            .copied()
            .enumerate()
            .map(|(i, kinds)| FailurePoint {
                // Widened so the product cannot overflow; the last point
                // lands exactly on the duration.
                threshold_ms: (u128::from(experience_duration_ms) * (i as u128 + 1) / n) as u64,
                kinds,
            })
            .collect::<Vec<_>>();
        let fired = vec![false; points.len()];
        Self { points, fired }
    }

    pub fn points(&self) -> &[FailurePoint] {
        &self.points
    }

    /// Total failures the table injects over a full run.
    pub fn total_kinds(&self) -> usize {
        self.points.iter().map(|p| p.kinds.len()).sum()
    }

    /// Detect crossings in the half-open interval `(old_ms, new_ms]` and mark
    /// them fired. Returns the kinds to instantiate, in table order.
    pub fn detect(&mut self, old_ms: u64, new_ms: u64) -> Vec<FailureKind> {
        let mut kinds = Vec::new();
        for (point, fired) in self.points.iter().zip(self.fired.iter_mut()) {
            if *fired {
                continue;
            }
            if old_ms < point.threshold_ms && point.threshold_ms <= new_ms {
                *fired = true;
                kinds.extend_from_slice(point.kinds);
            }
        }
        kinds
    }

    /// Thresholds already crossed this session.
    #[cfg(test)]
    pub(crate) fn fired_count(&self) -> usize {
        self.fired.iter().filter(|f| **f).count()
    }
}
