//! The process-wide facility slot

use super::error::{LoggerError, Result};
use super::facility::LoggingFacility;
use super::logger::Logger;
use crate::config::LoggingConfig;
use std::sync::OnceLock;

static GLOBAL: OnceLock<LoggingFacility> = OnceLock::new();

/// Build a facility from `config` and install it for the whole process.
///
/// Intended to be called once at startup. Later changes go through
/// [`LoggingFacility::reconfigure`] on the returned handle.
///
/// # Errors
///
/// [`LoggerError::AlreadyInitialized`] on a second call; otherwise whatever
/// building the facility reports. A failed first call leaves the slot empty.
pub fn initialize(config: &LoggingConfig) -> Result<LoggingFacility> {
    if GLOBAL.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let facility = LoggingFacility::from_config(config)?;
    install(facility)
}

/// Install an already-built facility
pub fn init_global(facility: LoggingFacility) -> Result<LoggingFacility> {
    install(facility)
}

fn install(facility: LoggingFacility) -> Result<LoggingFacility> {
    GLOBAL
        .set(facility.clone())
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    Ok(facility)
}

pub fn global() -> Option<&'static LoggingFacility> {
    GLOBAL.get()
}

pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

/// Logger `name` on the installed facility, if there is one
pub fn get_logger(name: &str) -> Option<Logger> {
    GLOBAL.get().map(|facility| facility.logger(name))
}
