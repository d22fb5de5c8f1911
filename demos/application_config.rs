//! Configuration-driven example
//!
//! Loads `demos/logging.toml`, installs it as the process-wide facility and
//! writes to a midnight-rotated file under a scratch application directory.
//! With the `watch` feature, edits to the copied configuration are applied
//! while the example runs.
//!
//! Run with: cargo run --example application_config

use rust_logging_facility::config::{load_config, Placeholders};
use rust_logging_facility::prelude::*;
use rust_logging_facility::{critical, error, get_logger, warning};
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    println!("=== Rust Logging Facility - Application Config Example ===\n");

    let app_dir = std::env::temp_dir().join("prewarning-demo");
    fs::create_dir_all(&app_dir)?;
    let config_path = app_dir.join("logging.toml");
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/logging.toml");
    fs::copy(&source, &config_path)?;

    let placeholders = Placeholders::application(&app_dir);
    let config = load_config(&config_path, &placeholders)?;
    let facility = initialize(&config)?;

    println!("Configured loggers: {:?}", facility.logger_names());
    println!("Handlers: {:?}\n", facility.handler_names());

    #[cfg(feature = "watch")]
    let _watcher = {
        use rust_logging_facility::config::{ConfigWatcher, ReloadEvent};

        let (watcher, events) = ConfigWatcher::new(&config_path, placeholders, facility.clone());
        let handle = watcher
            .run()
            .map_err(|e| LoggerError::other(format!("cannot watch configuration: {}", e)))?;
        std::thread::spawn(move || {
            for event in events {
                match event {
                    ReloadEvent::Applied => println!("[configuration reloaded]"),
                    ReloadEvent::Failed(reason) => println!("[reload rejected: {}]", reason),
                }
            }
        });
        handle
    };

    // Any module can look up its logger once the facility is installed
    if let Some(sound) = get_logger("Sound") {
        sound.info("Volume 7 (below WARNING, dropped)");
        warning!(sound, "Sound file {} missing, using beep", "start.wav");
    }
    if let Some(validators) = get_logger("Validators") {
        error!(validators, "{} runners without start time", 3);
        critical!(validators, "Start list unreadable");
    }

    facility.flush()?;
    let log_file = app_dir.join("logs").join("prewarning.log");
    println!("Wrote to {}:", log_file.display());
    let content = fs::read_to_string(&log_file)?;
    let lines: Vec<&str> = content.lines().collect();
    for line in &lines[lines.len().saturating_sub(3)..] {
        println!("  {}", line);
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
