//! Core facility types: records, levels, formatters, handlers and the
//! logger tree

pub mod error;
pub mod facility;
pub mod formatter;
pub mod global;
pub mod handler;
pub mod hierarchy;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod severity;
pub mod sink;
pub mod timestamp;

pub use error::{ErrorCategory, LoggerError, Result, ValidationError};
pub use facility::{FacilityBuilder, LoggingFacility, ReloadMode};
pub use formatter::{Attribute, Formatter};
pub use global::{get_logger, global, init_global, initialize, is_initialized};
pub use handler::{HandleOutcome, Handler};
pub use hierarchy::{Hierarchy, LoggerNode, ROOT_DEFAULT_LEVEL};
pub use log_record::{CallSite, LogRecord};
pub use logger::Logger;
pub use metrics::FacilityMetrics;
pub use severity::{LevelSetting, Severity};
pub use sink::{stderr_error_callback, ErrorCallback, Sink};
pub use timestamp::{Clock, ManualClock, SystemClock, TimestampFormat};
