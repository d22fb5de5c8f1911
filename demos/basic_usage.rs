//! Basic facility usage example
//!
//! Builds handlers in code, shows level inheritance and propagation.
//!
//! Run with: cargo run --example basic_usage

use rust_logging_facility::prelude::*;
use rust_logging_facility::{error, info, warning};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Logging Facility - Basic Usage Example ===\n");

    let facility = LoggingFacility::builder().build_empty();

    let formatter = Arc::new(Formatter::new(
        "simple",
        "{timestamp} - {logger_name} - {level} - {message}",
    )?);
    let console = Handler::new(
        "console",
        Severity::Debug,
        formatter,
        Box::new(ConsoleSink::stdout()),
    )
    .with_colors(true);
    facility.attach_handler("", console)?;

    let sound = facility.logger("Sound");
    let speaker = sound.child("Speaker");

    println!("1. Root at WARNING, loggers inherit it:");
    speaker.info("Info message (hidden)");
    speaker.warning("Warning message (visible)");
    error!(speaker, "Speaker {} offline", 2);

    println!("\n2. Sound lowered to DEBUG, Sound.Speaker follows:");
    facility.set_level("Sound", Severity::Debug)?;
    speaker.debug("Debug message (visible)");
    info!(sound, "Volume set to {}", 7);

    println!("\n3. Sound.Speaker pinned to ERROR:");
    facility.set_level("Sound.Speaker", Severity::Error)?;
    warning!(speaker, "Warning message (hidden)");
    speaker.critical("Critical message (visible)");

    println!("\n4. Metrics:");
    let metrics = facility.metrics();
    println!(
        "   emitted={} suppressed={} writes={}",
        metrics.emitted(),
        metrics.suppressed(),
        metrics.writes()
    );

    facility.shutdown()?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
