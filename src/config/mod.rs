//! Configuration documents: schema, loading, validation and assembly.
//!
//! A document is read with [`load_config`], checked with
//! [`validate_config`] and turned into a running
//! [`LoggingFacility`](crate::LoggingFacility) by
//! [`LoggingFacility::from_config`](crate::LoggingFacility::from_config) or
//! [`initialize`](crate::initialize).

pub mod assemble;
pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;
#[cfg(feature = "watch")]
pub mod watcher;

pub use defaults::{APPLICATION_LOGGERS, DETAIL_FORMAT, SIMPLE_FORMAT, THREAD_FORMAT};
pub use loader::{load_config, load_config_str, ConfigFormat, Placeholders, APPLICATION_DIR};
pub use schema::{
    FormatterConfig, HandlerConfig, LoggerConfig, LoggingConfig, RootConfig, SCHEMA_VERSION,
};
pub use validation::{validate_config, ValidatedConfig};
#[cfg(feature = "watch")]
pub use watcher::{ConfigWatcher, ReloadEvent};
