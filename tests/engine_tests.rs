#[cfg(test)]
mod tests {
    use obsolescence_engine::schedule::FAILURE_POINTS;
    use obsolescence_engine::*;

    fn started() -> ObsolescenceEngine {
        let mut engine = ObsolescenceEngine::default();
        engine.start_timer();
        engine
    }

    // ========== Degradation ==========

    #[test]
    fn test_first_threshold_scenario() {
        let mut engine = started();
        engine.advance(30_000);

        let failures = engine.active_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::ButtonDelay);
        assert_eq!(failures[0].failure_type, FailureType::Button);
        assert_eq!(failures[0].severity, 3);
        assert!((engine.degradation_level() - 100.0 / 6.0).abs() < 1e-9);

        engine.advance(150_000);
        assert_eq!(engine.time_elapsed(), 180_000);
        assert_eq!(engine.degradation_level(), 100.0);
        assert_eq!(engine.glitch_intensity(), 1.0);

        let expected: usize = FAILURE_POINTS.iter().map(|p| p.len()).sum();
        assert_eq!(engine.active_failures().len(), expected);
        assert_eq!(expected, 10);
        assert!(engine.is_terminal());
    }

    #[test]
    fn test_single_jump_fires_every_group_in_order() {
        let mut engine = started();
        let report = engine.advance(200_000);

        let kinds: Vec<FailureKind> = engine.active_failures().iter().map(|f| f.kind).collect();
        let expected: Vec<FailureKind> =
            FAILURE_POINTS.iter().flat_map(|p| p.iter().copied()).collect();
        assert_eq!(kinds, expected);
        assert_eq!(report.fired.len(), 10);
        assert!(report.reached_terminal);
        assert_eq!(engine.degradation_level(), 100.0);
    }

    #[test]
    fn test_tick_granularity_fires_each_threshold_once() {
        let mut engine = started();
        for _ in 0..2_000 {
            engine.advance(100);
        }
        assert_eq!(engine.time_elapsed(), 200_000);
        assert_eq!(engine.active_failures().len(), 10);

        let mut ids: Vec<&str> = engine.active_failures().iter().map(|f| f.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10, "failure ids must be unique");
    }

    #[test]
    fn test_same_tick_failures_have_distinct_ids() {
        let mut engine = started();
        engine.advance(60_000);
        let failures = engine.active_failures();
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[1].timestamp, failures[2].timestamp);
        assert_ne!(failures[1].id, failures[2].id);
    }

    #[test]
    fn test_terminal_reported_once() {
        let mut engine = started();
        let first = engine.advance(180_000);
        let second = engine.advance(1_000);
        assert!(first.reached_terminal);
        assert!(!second.reached_terminal);
        assert!(second.fired.is_empty());
        assert_eq!(engine.degradation_level(), 100.0);
    }

    #[test]
    fn test_terminal_is_independent_of_breakdown_record() {
        let mut engine = started();
        engine.advance(180_000);
        let breakdown = engine
            .active_failures()
            .iter()
            .find(|f| f.kind == FailureKind::TotalBreakdown)
            .map(|f| f.id.clone())
            .unwrap();
        engine.remove_failure(&breakdown);
        assert!(engine.is_terminal());
        assert_eq!(engine.phase(), SessionPhase::TerminalBreakdown);
    }

    // ========== Clock Driver ==========

    #[test]
    fn test_clock_drives_full_experience() {
        let mut engine = started();
        let injected = engine.run_for(180_000);
        assert_eq!(engine.time_elapsed(), 180_000);
        assert_eq!(injected.len(), 10);
        assert!(engine.is_terminal());
    }

    #[test]
    fn test_start_twice_single_source() {
        let mut engine = ObsolescenceEngine::default();
        engine.start_timer();
        engine.start_timer();
        assert_eq!(engine.pending_tasks(), 1);
        engine.run_for(1_000);
        assert_eq!(engine.time_elapsed(), 1_000);
    }

    #[test]
    fn test_stop_twice() {
        let mut engine = started();
        engine.stop_timer();
        engine.stop_timer();
        assert!(!engine.is_active());
        assert!(!engine.clock_running());
        assert_eq!(engine.pending_tasks(), 0);
    }

    #[test]
    fn test_stop_resume_keeps_progress() {
        let mut engine = started();
        engine.run_for(29_900);
        engine.stop_timer();
        engine.run_for(60_000);
        assert!(engine.active_failures().is_empty());
        engine.start_timer();
        engine.run_for(100);
        assert_eq!(engine.time_elapsed(), 30_000);
        assert_eq!(engine.active_failures().len(), 1);
    }

    // ========== Survey & Reward ==========

    #[test]
    fn test_reward_failure_after_delay() {
        let mut engine = started();
        engine.complete_survey();
        assert!(engine.survey_completed());
        assert!(engine.reward_promised());
        assert!(engine.active_failures().is_empty());

        engine.run_for(1_900);
        assert!(engine.active_failures().is_empty());

        engine.run_for(100);
        let nav: Vec<&Failure> = engine.failures_by_type(&[FailureType::Navigation]).collect();
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].severity, 10);
        assert_eq!(nav[0].kind, FailureKind::RewardFailure);

        engine.run_for(20_000);
        let rewards = engine
            .active_failures()
            .iter()
            .filter(|f| f.kind == FailureKind::RewardFailure)
            .count();
        assert_eq!(rewards, 1);
        assert!(!engine.reward_given());
    }

    #[test]
    fn test_reward_failure_fires_with_clock_stopped() {
        let mut engine = ObsolescenceEngine::default();
        engine.complete_survey();
        engine.run_for(2_000);
        assert_eq!(engine.active_failures().len(), 1);
        assert_eq!(engine.time_elapsed(), 0);
    }

    #[test]
    fn test_complete_survey_twice_schedules_once() {
        let mut engine = started();
        engine.complete_survey();
        engine.complete_survey();
        engine.run_for(5_000);
        let rewards = engine
            .failures_by_type(&[FailureType::Navigation])
            .filter(|f| f.kind == FailureKind::RewardFailure)
            .count();
        assert_eq!(rewards, 1);
    }

    #[test]
    fn test_has_critical_failure() {
        let mut engine = started();
        engine.advance(120_000);
        assert!(!engine.has_critical_failure());
        engine.advance(30_000);
        assert!(engine.has_critical_failure());
    }

    // ========== Registry surface ==========

    #[test]
    fn test_external_duplicate_rejected() {
        let mut engine = ObsolescenceEngine::default();
        let f = Failure::new(FailureKind::AudioCuts, 5, 99);
        assert!(engine.add_failure(f.clone()).is_ok());
        assert_eq!(
            engine.add_failure(f.clone()),
            Err(RegistryError::DuplicateId { id: f.id.clone() })
        );
        assert_eq!(engine.active_failures().len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut engine = started();
        engine.advance(30_000);
        assert!(engine.remove_failure(&FailureId::from("missing")).is_none());
        assert_eq!(engine.active_failures().len(), 1);
        assert_eq!(engine.total_failures(), 1);
    }

    // ========== Reset ==========

    #[test]
    fn test_reset_restores_defaults() {
        let mut engine = started();
        engine.set_user_name("ana");
        engine.set_logged_in(true);
        engine.set_audio_playing(true);
        engine.set_survey_progress(80.0);
        engine.complete_survey();
        engine.run_for(100_000);

        engine.reset();
        let snap = engine.snapshot();
        assert_eq!(snap.time_elapsed, 0);
        assert_eq!(snap.degradation_level, 0.0);
        assert_eq!(snap.distortion_level, 0.0);
        assert_eq!(snap.visual_corruption, 0.0);
        assert_eq!(snap.glitch_intensity, 0.0);
        assert!(snap.active_failures.is_empty());
        assert_eq!(snap.total_failures, 0);
        assert!(!snap.is_active);
        assert_eq!(snap.survey_progress, 0.0);
        assert!(!snap.survey_completed);
        assert!(!snap.reward_promised);
        assert!(!snap.audio_playing);
        assert!(!snap.is_logged_in);
        assert!(snap.user_name.is_none());
        assert_eq!(snap.experience_duration_ms, 180_000);
        assert_eq!(snap.phase, SessionPhase::LoggedOut);
        assert_eq!(engine.pending_tasks(), 0);

        engine.advance(0);
        engine.run_for(10_000);
        assert_eq!(engine.time_elapsed(), 0);
        assert!(engine.active_failures().is_empty());
    }

    #[test]
    fn test_reset_keeping_identity() {
        let mut engine = started();
        engine.set_user_name("ana");
        engine.set_logged_in(true);
        engine.run_for(40_000);

        engine.reset_keeping_identity();
        assert_eq!(engine.user_name(), Some("ana"));
        assert!(engine.is_logged_in());
        assert_eq!(engine.time_elapsed(), 0);
        assert_eq!(engine.phase(), SessionPhase::Ready);

        // Thresholds are armed again for the new session.
        engine.start_timer();
        engine.run_for(30_000);
        assert_eq!(engine.active_failures().len(), 1);
    }

    #[test]
    fn test_dispose_cancels_everything() {
        let mut engine = started();
        engine.complete_survey();
        engine.dispose();
        assert_eq!(engine.pending_tasks(), 0);
        engine.run_for(200_000);
        assert_eq!(engine.time_elapsed(), 0);
        assert!(engine.active_failures().is_empty());
    }

    // ========== Config ==========

    #[test]
    fn test_short_experience_scales_thresholds() {
        let config = EngineConfig::from_json_str(r#"{ "experience_duration_ms": 6000 }"#).unwrap();
        let mut engine = ObsolescenceEngine::new(config).unwrap();
        engine.start_timer();
        engine.run_for(1_000);
        assert_eq!(engine.active_failures().len(), 1);
        engine.run_for(5_000);
        assert_eq!(engine.active_failures().len(), 10);
        assert!(engine.is_terminal());
        assert_eq!(engine.remaining_ms(), 0);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut engine = started();
        engine.advance(90_000);
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["timeElapsed"], 90_000);
        assert_eq!(json["degradationLevel"], 50.0);
        assert_eq!(json["activeFailures"].as_array().map(|a| a.len()), Some(5));
        assert_eq!(json["remainingMs"], 90_000);
    }
}
