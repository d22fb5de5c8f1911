//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - Every record lands exactly once across a rotation boundary
//! - Lines are never interleaved under concurrent writers
//! - Reconfiguration while other threads log is safe
//! - Counters stay consistent under contention

use chrono::{TimeZone, Utc};
use rust_logging_facility::config::{load_config_str, ConfigFormat, LoggingConfig};
use rust_logging_facility::{LoggerError, LoggingFacility, ManualClock, ReloadMode, Severity};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 4;
const PER_THREAD: usize = 250;

fn file_config(path: &Path, root_level: &str) -> LoggingConfig {
    let doc = format!(
        r#"
        version = 1

        [formatters.plain]
        format = "{{logger_name}} {{message}}"

        [handlers.file]
        class = "RotatingFile"
        formatter = "plain"
        filename = '{}'
        when = "MIDNIGHT"
        utc = true

        [root]
        level = "{}"
        handlers = ["file"]
        "#,
        path.display(),
        root_level
    );
    load_config_str(&doc, ConfigFormat::Toml).expect("Failed to parse config")
}

fn lines_of(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

/// Test that concurrent writers crossing midnight lose and duplicate nothing
#[test]
fn test_midnight_boundary_under_concurrency() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap(),
    ));
    let facility = LoggingFacility::builder()
        .clock(clock.clone())
        .last_resort(false)
        .on_error(Arc::new(|e: &LoggerError| panic!("unexpected error: {}", e)))
        .build(&file_config(&log_file, "DEBUG"))
        .expect("Failed to build facility");

    let run_phase = |phase: &'static str| {
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let logger = facility.logger(&format!("Worker{}", t));
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..PER_THREAD {
                        logger.info(format!("{}-{}", phase, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("logging thread panicked");
        }
    };

    run_phase("before");
    clock.advance(chrono::Duration::seconds(2));
    run_phase("after");

    let archived = lines_of(&temp_dir.path().join("app.log.2026-06-30"));
    let current = lines_of(&log_file);

    assert_eq!(archived.len(), THREADS * PER_THREAD);
    assert_eq!(current.len(), THREADS * PER_THREAD);
    assert!(archived.iter().all(|l| l.contains(" before-")));
    assert!(current.iter().all(|l| l.contains(" after-")));

    let unique: HashSet<_> = archived.iter().chain(current.iter()).collect();
    assert_eq!(unique.len(), 2 * THREADS * PER_THREAD);
}

/// Test that the clock moving while threads write still splits cleanly
#[test]
fn test_boundary_crossed_mid_stream() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap(),
    ));
    let facility = LoggingFacility::builder()
        .clock(clock.clone())
        .last_resort(false)
        .build(&file_config(&log_file, "DEBUG"))
        .expect("Failed to build facility");

    let barrier = Arc::new(Barrier::new(THREADS + 1));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = facility.logger("Sound");
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    logger.error(format!("t{}-{}", t, i));
                }
            })
        })
        .collect();

    barrier.wait();
    clock.advance(chrono::Duration::seconds(5));
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let archived = lines_of(&temp_dir.path().join("app.log.2026-06-30"));
    let current = lines_of(&log_file);
    let all: Vec<_> = archived.iter().chain(current.iter()).collect();

    assert_eq!(all.len(), THREADS * PER_THREAD);
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);
    assert!(all.iter().all(|l| l.starts_with("Sound t")));
}

/// Test that reconfiguring while other threads log never tears a line
#[test]
fn test_reload_while_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    let loud = file_config(&log_file, "DEBUG");
    let quiet = file_config(&log_file, "ERROR");
    let facility = LoggingFacility::builder()
        .last_resort(false)
        .build(&loud)
        .expect("Failed to build facility");

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = facility.logger("Config");
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.log(Severity::Warning, format!("t{}-{}", t, i));
                }
            })
        })
        .collect();

    for round in 0..20 {
        let config = if round % 2 == 0 { &quiet } else { &loud };
        facility
            .reconfigure(config, ReloadMode::Replace)
            .expect("reload failed");
    }
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }
    facility.flush().expect("flush failed");

    let metrics = facility.metrics();
    assert_eq!(
        metrics.emitted() + metrics.suppressed(),
        (THREADS * PER_THREAD) as u64
    );
    for line in lines_of(&log_file) {
        assert!(line.starts_with("Config t"), "torn line: {:?}", line);
    }
}
