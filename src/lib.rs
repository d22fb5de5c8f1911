//! # Rust Logging Facility
//!
//! Process-wide logging configured from a declarative document.
//!
//! - Named formatters with `{attribute}` templates
//! - Console and time-rotating file handlers, each with its own minimum level
//! - Dot-namespaced loggers (`Sound.Speaker` is a child of `Sound`) that
//!   inherit their level from the nearest configured ancestor and hand
//!   records to every ancestor's handlers
//! - One-time initialization, with live reconfiguration afterwards
//!
//! ## Quick start
//!
//! ```no_run
//! use rust_logging_facility::config::{load_config, Placeholders};
//! use rust_logging_facility::{error, initialize};
//! use std::path::Path;
//!
//! # fn main() -> rust_logging_facility::Result<()> {
//! let placeholders = Placeholders::application("/opt/prewarning");
//! let config = load_config(Path::new("/opt/prewarning/logging.toml"), &placeholders)?;
//! let facility = initialize(&config)?;
//!
//! let sound = facility.logger("Sound");
//! error!(sound, "cannot play {}", "start.wav");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::config::{LoggingConfig, Placeholders};
    pub use crate::core::{
        get_logger, initialize, CallSite, Formatter, Handler, LevelSetting, LogRecord, Logger,
        LoggerError, LoggingFacility, ReloadMode, Result, Severity, Sink,
    };
    pub use crate::sinks::{ConsoleSink, ConsoleStream, RotatingFileSink, RotationPolicy};
}

pub use crate::core::{
    get_logger, global, init_global, initialize, is_initialized, CallSite, Clock, ErrorCallback,
    ErrorCategory, FacilityBuilder, FacilityMetrics, Formatter, HandleOutcome, Handler,
    LevelSetting, LogRecord, Logger, LoggerError, LoggingFacility, ManualClock, ReloadMode,
    Result, Severity, Sink, SystemClock, TimestampFormat, ValidationError,
};
pub use sinks::{
    ConsoleSink, ConsoleStream, RotatingFileSink, RotationPolicy, RotationSchedule, RotationWhen,
};
