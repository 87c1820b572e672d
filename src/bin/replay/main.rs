// Obsolescence Replay Runner — headless scripted session
// Seedable consumer PRNG, per-event timeline, JSON report
//
// Usage:
//   cargo run --bin replay                           # Full experience, survey at 60s
//   cargo run --bin replay -- --seed 42              # Custom consumer seed
//   cargo run --bin replay -- --survey-at 150000     # Submit the survey later
//   cargo run --bin replay -- --duration 90000       # Stop early
//   cargo run --bin replay -- --config engine.json   # Engine timing overrides

mod report;

use obsolescence_engine::interference::{ButtonOutcome, Interference, InputOutcome};
use obsolescence_engine::{EngineConfig, FailureKind, FailureType, ObsolescenceEngine};
use report::*;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Interval between sampled input interactions.
const INPUT_SAMPLE_MS: u64 = 10_000;
/// Wait before re-submitting a blocked survey.
const RESUBMIT_MS: u64 = 1_000;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    seed: u64,
    config: Option<String>,
    survey_at: Option<u64>,
    duration: Option<u64>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        seed: 0,
        config: None,
        survey_at: Some(60_000),
        duration: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(args[i].clone());
                }
            }
            "--survey-at" => {
                i += 1;
                if i < args.len() {
                    cli.survey_at = args[i].parse().ok();
                }
            }
            "--no-survey" => {
                cli.survey_at = None;
            }
            "--duration" => {
                i += 1;
                if i < args.len() {
                    cli.duration = args[i].parse().ok();
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn load_config(path: Option<&str>) -> EngineConfig {
    let Some(path) = path else {
        return EngineConfig::default();
    };
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to read config {}: {}", path, e);
            std::process::exit(1);
        }
    };
    match EngineConfig::from_json_str(&json) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = parse_args();
    let config = load_config(cli.config.as_deref());
    let duration = cli
        .duration
        .unwrap_or(config.experience_duration_ms + config.reward_failure_delay_ms);

    let mut engine = match ObsolescenceEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            std::process::exit(1);
        }
    };
    let mut interference = Interference::new(cli.seed);

    println!("\n  Obsolescence Replay Runner");
    println!(
        "  PRNG: ChaCha8Rng | Seed: {} | Duration: {}ms | Tick: {}ms\n",
        cli.seed, duration, config.tick_ms
    );

    engine.set_user_name("replay");
    engine.set_logged_in(true);
    engine.start_timer();

    let mut timeline = Vec::new();
    let mut phase = engine.phase();
    let mut next_submit = cli.survey_at;
    let mut next_input = INPUT_SAMPLE_MS;

    while engine.now_ms() < duration {
        let step = config.tick_ms.min(duration - engine.now_ms());
        for failure in engine.run_for(step) {
            timeline.push(TimelineEvent::Failure {
                at_ms: engine.now_ms(),
                time_elapsed: engine.time_elapsed(),
                degradation_level: engine.degradation_level(),
                failure,
            });
        }
        let now = engine.now_ms();

        if now >= next_input && !engine.survey_completed() {
            next_input += INPUT_SAMPLE_MS;
            let survey: Vec<_> = engine.failures_by_type(&FailureType::SURVEY).cloned().collect();
            let outcome = match interference.on_input("repair it", &survey) {
                InputOutcome::Accepted(v) => format!("accepted {:?}", v),
                InputOutcome::Delayed { value, delay_ms } => {
                    format!("delayed {:?} by {}ms", value, delay_ms)
                }
            };
            timeline.push(TimelineEvent::Interaction { at_ms: now, action: "input", outcome });
            let answered = (now as f64 / duration as f64 * 100.0).min(99.0);
            engine.set_survey_progress(answered);
        }

        if let Some(at) = next_submit.filter(|at| now >= *at) {
            let survey: Vec<_> = engine.failures_by_type(&FailureType::SURVEY).cloned().collect();
            let button = interference.on_button(&survey);
            let blocked = interference.submit_blocked(&survey);
            let outcome = match (button, blocked) {
                (ButtonOutcome::Swallowed, _) => "press swallowed".to_string(),
                (_, true) => "connection error".to_string(),
                (ButtonOutcome::Delayed { delay_ms }, false) => {
                    format!("submitted after {}ms", delay_ms)
                }
                (ButtonOutcome::Proceed, false) => "submitted".to_string(),
            };
            timeline.push(TimelineEvent::Interaction { at_ms: now, action: "submit", outcome });

            let submitted = !blocked && button != ButtonOutcome::Swallowed;
            if submitted {
                engine.set_survey_progress(100.0);
                engine.complete_survey();
                next_submit = None;
            } else {
                next_submit = Some(at.max(now) + RESUBMIT_MS);
            }
        }

        let current = engine.phase();
        if current != phase {
            timeline.push(TimelineEvent::Phase { at_ms: now, from: phase, to: current });
            phase = current;
        }
    }

    engine.dispose();

    // ─── Summary ────────────────────────────────────────────────────────

    print_timeline(&timeline);

    let reward_failures = engine
        .active_failures()
        .iter()
        .filter(|f| f.kind == FailureKind::RewardFailure)
        .count();
    let summary = ReplaySummary {
        final_time_elapsed: engine.time_elapsed(),
        final_degradation_level: engine.degradation_level(),
        final_phase: engine.phase(),
        total_failures: engine.total_failures(),
        threshold_failures: engine.total_failures() as usize - reward_failures,
        expected_threshold_failures: engine.threshold_failure_count(),
        reward_failures,
        reward_given: engine.reward_given(),
        terminal: engine.is_terminal(),
    };

    println!("  {}", "-".repeat(72));
    println!(
        "  Elapsed: {}ms  Level: {:.2}%  Failures: {}  Phase: {:?}",
        summary.final_time_elapsed,
        summary.final_degradation_level,
        summary.total_failures,
        summary.final_phase,
    );
    println!(
        "  Threshold failures: {}/{}",
        summary.threshold_failures, summary.expected_threshold_failures
    );
    println!("  Reward given: {}\n", if summary.reward_given { "yes" } else { "no" });

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let report = ReplayReport {
        timestamp: format!("{}", ts),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        seed: cli.seed,
        experience_duration_ms: config.experience_duration_ms,
        tick_ms: config.tick_ms,
        survey_at_ms: cli.survey_at,
        summary,
        timeline,
    };

    let dir = std::path::Path::new("replay-results");
    if !dir.exists() {
        std::fs::create_dir_all(dir).expect("Failed to create replay-results/");
    }
    let path = dir.join(format!("replay-{}.json", cli.seed));
    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize");
    std::fs::write(&path, &json).expect("Failed to write replay file");
    println!("  Results saved to: {}\n", path.display());
}
