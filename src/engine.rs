// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Engine Core

use tracing::{debug, error, info, trace, warn};

use crate::clock::ClockDriver;
use crate::config::{ConfigError, EngineConfig};
use crate::degradation::{self, DerivedSignals};
use crate::registry::{FailureRegistry, RegistryError};
use crate::schedule::FailureSchedule;
use crate::timers::{Scheduler, Task, TaskHandle};
use crate::types::*;

// ─── Session state ───────────────────────────────────────────────────────────

/// Everything `reset()` re-creates.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    pub(crate) time_elapsed: u64,
    pub(crate) degradation_level: f64,
    pub(crate) signals: DerivedSignals,
    pub(crate) registry: FailureRegistry,
    pub(crate) schedule: FailureSchedule,
    pub(crate) is_active: bool,
    pub(crate) survey_progress: f64,
    pub(crate) survey_completed: bool,
    pub(crate) reward_promised: bool,
    pub(crate) reward_given: bool,
    pub(crate) audio_playing: bool,
    pub(crate) is_logged_in: bool,
    pub(crate) user_name: Option<String>,
}

impl SessionState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            time_elapsed: 0,
            degradation_level: 0.0,
            signals: DerivedSignals::default(),
            registry: FailureRegistry::new(),
            schedule: FailureSchedule::new(config.experience_duration_ms),
            is_active: false,
            survey_progress: 0.0,
            survey_completed: false,
            reward_promised: false,
            reward_given: false,
            audio_playing: false,
            is_logged_in: false,
            user_name: None,
        }
    }
}

// ─── ObsolescenceEngine ──────────────────────────────────────────────────────

/// Single owned instance of the degradation simulation.
///
/// All mutation goes through the action methods below. Timer-driven work
/// (ticks, the delayed reward failure) lives in an internal [`Scheduler`]
/// that only runs when the host calls [`ObsolescenceEngine::run_for`], so
/// `reset()`, `dispose()` or dropping the engine leaves nothing behind that
/// could fire later.
#[derive(Debug, Clone)]
pub struct ObsolescenceEngine {
    pub(crate) config: EngineConfig,
    pub(crate) state: SessionState,
    pub(crate) scheduler: Scheduler,
    pub(crate) clock: ClockDriver,
    pub(crate) reward_task: Option<TaskHandle>,
    pub(crate) failure_seq: u64,
}

impl Default for ObsolescenceEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl ObsolescenceEngine {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            state: SessionState::new(&config),
            scheduler: Scheduler::new(),
            clock: ClockDriver::new(config.tick_ms),
            reward_task: None,
            failure_seq: 0,
            config,
        }
    }

    // ─── State reads ─────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig { &self.config }
    pub fn experience_duration_ms(&self) -> u64 { self.config.experience_duration_ms }
    pub fn time_elapsed(&self) -> u64 { self.state.time_elapsed }
    pub fn degradation_level(&self) -> f64 { self.state.degradation_level }
    pub fn distortion_level(&self) -> f64 { self.state.signals.distortion_level }
    pub fn visual_corruption(&self) -> f64 { self.state.signals.visual_corruption }
    pub fn glitch_intensity(&self) -> f64 { self.state.signals.glitch_intensity }
    pub fn active_failures(&self) -> &[Failure] { self.state.registry.as_slice() }
    pub fn total_failures(&self) -> u32 { self.state.registry.total_inserted() }
    pub fn is_active(&self) -> bool { self.state.is_active }
    pub fn survey_progress(&self) -> f64 { self.state.survey_progress }
    pub fn survey_completed(&self) -> bool { self.state.survey_completed }
    pub fn reward_promised(&self) -> bool { self.state.reward_promised }
    pub fn reward_given(&self) -> bool { self.state.reward_given }
    pub fn audio_playing(&self) -> bool { self.state.audio_playing }
    pub fn is_logged_in(&self) -> bool { self.state.is_logged_in }
    pub fn user_name(&self) -> Option<&str> { self.state.user_name.as_deref() }

    /// Logical host time, advanced by [`ObsolescenceEngine::run_for`].
    pub fn now_ms(&self) -> u64 { self.scheduler.now_ms() }

    pub fn registry(&self) -> &FailureRegistry { &self.state.registry }

    pub fn failures_by_type<'a>(
        &'a self,
        types: &'a [FailureType],
    ) -> impl Iterator<Item = &'a Failure> + 'a {
        self.state.registry.query_by_type(types)
    }

    /// Failures the threshold table injects over a full run.
    pub fn threshold_failure_count(&self) -> usize { self.state.schedule.total_kinds() }

    /// Any active failure with severity above 8.
    pub fn has_critical_failure(&self) -> bool {
        self.state.registry.iter().any(|f| f.severity > 8)
    }

    pub fn remaining_ms(&self) -> u64 {
        self.config.experience_duration_ms.saturating_sub(self.state.time_elapsed)
    }

    /// Total breakdown. Derived from the level, independent of any failure record.
    pub fn is_terminal(&self) -> bool {
        self.state.degradation_level >= 100.0
    }

    pub fn severity_band(&self) -> SeverityBand {
        SeverityBand::from_level(self.state.degradation_level)
    }

    pub fn phase(&self) -> SessionPhase {
        let s = &self.state;
        if self.is_terminal() {
            SessionPhase::TerminalBreakdown
        } else if !s.is_logged_in {
            SessionPhase::LoggedOut
        } else if s.registry.iter().any(|f| f.kind == FailureKind::RewardFailure) {
            SessionPhase::RewardFailed
        } else if s.reward_promised {
            SessionPhase::RewardPromised
        } else if s.survey_progress > 0.0 {
            SessionPhase::SurveyInProgress
        } else if s.is_active {
            SessionPhase::Active
        } else {
            SessionPhase::Ready
        }
    }

    /// Whether the clock driver currently holds a live tick source.
    pub fn clock_running(&self) -> bool { self.clock.is_running() }

    /// Whether the reward failure is scheduled but has not fired yet.
    pub fn reward_failure_pending(&self) -> bool { self.reward_task.is_some() }

    /// Outstanding scheduled tasks (ticks and delayed callbacks).
    pub fn pending_tasks(&self) -> usize { self.scheduler.pending_count() }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            time_elapsed: self.state.time_elapsed,
            degradation_level: self.state.degradation_level,
            distortion_level: self.state.signals.distortion_level,
            visual_corruption: self.state.signals.visual_corruption,
            glitch_intensity: self.state.signals.glitch_intensity,
            active_failures: self.state.registry.as_slice().to_vec(),
            total_failures: self.state.registry.total_inserted(),
            is_active: self.state.is_active,
            survey_progress: self.state.survey_progress,
            survey_completed: self.state.survey_completed,
            reward_promised: self.state.reward_promised,
            reward_given: self.state.reward_given,
            audio_playing: self.state.audio_playing,
            is_logged_in: self.state.is_logged_in,
            user_name: self.state.user_name.clone(),
            experience_duration_ms: self.config.experience_duration_ms,
            remaining_ms: self.remaining_ms(),
            phase: self.phase(),
            severity_band: self.severity_band(),
        }
    }

    // ─── Clock ───────────────────────────────────────────────────────────

    pub fn start_timer(&mut self) {
        if !self.state.is_active {
            info!(time_elapsed = self.state.time_elapsed, "timer started");
        }
        self.state.is_active = true;
        self.clock.start(&mut self.scheduler);
    }

    pub fn stop_timer(&mut self) {
        if self.state.is_active {
            info!(time_elapsed = self.state.time_elapsed, "timer stopped");
        }
        self.state.is_active = false;
        self.clock.stop(&mut self.scheduler);
    }

    /// Advance elapsed time by `delta_ms`. Ignored while inactive.
    pub fn advance(&mut self, delta_ms: u64) -> TickReport {
        if !self.state.is_active {
            return TickReport::default();
        }

        let old_elapsed = self.state.time_elapsed;
        let new_elapsed = old_elapsed.saturating_add(delta_ms);
        let was_terminal = self.is_terminal();

        let crossed = self.state.schedule.detect(old_elapsed, new_elapsed);

        self.state.time_elapsed = new_elapsed;
        let level = degradation::degradation_level(new_elapsed, self.config.experience_duration_ms);
        // Guards the non-decreasing invariant against float noise.
        self.state.degradation_level = level.max(self.state.degradation_level);
        self.state.signals = DerivedSignals::from_level(self.state.degradation_level);

        let mut fired = Vec::with_capacity(crossed.len());
        for kind in crossed {
            debug!(%kind, time_elapsed = new_elapsed, "threshold crossed");
            fired.extend(self.inject(kind));
        }

        let reached_terminal = !was_terminal && self.is_terminal();
        if reached_terminal {
            info!(time_elapsed = new_elapsed, "total breakdown reached");
        }
        trace!(time_elapsed = new_elapsed, level = self.state.degradation_level, "advance");

        TickReport {
            time_elapsed_ms: new_elapsed,
            degradation_level: self.state.degradation_level,
            fired,
            reached_terminal,
        }
    }

    /// Run the scheduler for `ms` of logical host time, dispatching every
    /// tick and delayed callback that comes due. Returns failures injected
    /// along the way, in order.
    pub fn run_for(&mut self, ms: u64) -> Vec<Failure> {
        let until = self.scheduler.now_ms().saturating_add(ms);
        let mut injected = Vec::new();

        while let Some(fired) = self.scheduler.pop_due(until) {
            match fired.task {
                Task::Tick => {
                    if !self.clock.owns(fired.handle) {
                        continue;
                    }
                    let report = self.advance(self.clock.tick_ms());
                    injected.extend(report.fired);
                }
                Task::RewardFailure => {
                    if self.reward_task != Some(fired.handle) {
                        continue;
                    }
                    self.reward_task = None;
                    info!(at_ms = fired.at_ms, "reward request failed");
                    injected.extend(self.inject(FailureKind::RewardFailure));
                }
            }
        }

        self.scheduler.set_now(until);
        injected
    }

    // ─── Failures ────────────────────────────────────────────────────────

    /// Insert a caller-built failure.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if the id is already registered.
    pub fn add_failure(&mut self, failure: Failure) -> Result<(), RegistryError> {
        self.state.registry.add(failure).map_err(|e| {
            warn!(error = %e, "rejected external failure");
            e
        })
    }

    /// Remove by id. Unknown ids are ignored.
    pub fn remove_failure(&mut self, id: &FailureId) -> Option<Failure> {
        self.state.registry.remove(id)
    }

    /// Build and register a failure of `kind` with a fresh id.
    pub(crate) fn inject(&mut self, kind: FailureKind) -> Option<Failure> {
        let failure = Failure::new(kind, self.scheduler.now_ms(), self.failure_seq);
        self.failure_seq += 1;

        match self.state.registry.add(failure.clone()) {
            Ok(()) => {
                debug!(id = %failure.id, severity = failure.severity, "failure injected");
                Some(failure)
            }
            Err(e) => {
                debug_assert!(false, "generated failure id collided: {e}");
                error!(error = %e, "generated failure id collided");
                None
            }
        }
    }

    // ─── Survey ──────────────────────────────────────────────────────────

    /// Clamped into `[0, 100]`; never moves backwards within a session.
    pub fn set_survey_progress(&mut self, progress: f64) {
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 100.0) };
        self.state.survey_progress = self.state.survey_progress.max(p);
    }

    /// Mark the survey done and promise the reward. The reward request
    /// fails once, `reward_failure_delay_ms` later. Repeat calls are no-ops.
    pub fn complete_survey(&mut self) {
        if self.state.survey_completed {
            return;
        }
        self.state.survey_completed = true;
        self.state.reward_promised = true;
        let handle = self
            .scheduler
            .schedule_once(self.config.reward_failure_delay_ms, Task::RewardFailure);
        self.reward_task = Some(handle);
        info!(delay_ms = self.config.reward_failure_delay_ms, "survey completed, reward promised");
    }

    // ─── Manual overrides ────────────────────────────────────────────────

    pub fn set_distortion_level(&mut self, level: f64) {
        self.state.signals.distortion_level = degradation::clamp_unit(level);
    }

    pub fn set_visual_corruption(&mut self, corruption: f64) {
        self.state.signals.visual_corruption = degradation::clamp_unit(corruption);
    }

    pub fn set_glitch_intensity(&mut self, intensity: f64) {
        self.state.signals.glitch_intensity = degradation::clamp_unit(intensity);
    }

    pub fn set_audio_playing(&mut self, playing: bool) {
        self.state.audio_playing = playing;
    }

    // ─── Identity ────────────────────────────────────────────────────────

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.state.user_name = Some(name.into());
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.state.is_logged_in = logged_in;
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Cancel every outstanding task and re-create the session state.
    pub fn reset(&mut self) {
        self.cancel_all_tasks();
        self.state = SessionState::new(&self.config);
        info!("session reset");
    }

    /// Reset, then restore user name and login so the same user restarts.
    pub fn reset_keeping_identity(&mut self) {
        let user_name = self.state.user_name.take();
        let is_logged_in = self.state.is_logged_in;
        self.reset();
        self.state.user_name = user_name;
        self.state.is_logged_in = is_logged_in;
    }

    /// Tear down: stop the clock and cancel every pending callback. State
    /// stays readable.
    pub fn dispose(&mut self) {
        self.cancel_all_tasks();
        self.state.is_active = false;
        info!("session disposed");
    }

    fn cancel_all_tasks(&mut self) {
        self.scheduler.cancel_all();
        self.clock.detach();
        self.reward_task = None;
    }
}
