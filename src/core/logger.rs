//! Named logger handles

use super::facility::LoggingFacility;
use super::log_record::CallSite;
use super::severity::Severity;
use std::fmt;
use std::sync::Arc;

/// A named entry point into a [`LoggingFacility`].
///
/// Holds no configuration of its own: level and handlers are looked up in
/// the facility at every call, so a reconfiguration is picked up by every
/// existing handle.
///
/// # Examples
///
/// ```
/// use rust_logging_facility::{LoggingFacility, Severity};
///
/// let facility = LoggingFacility::builder().last_resort(false).build_empty();
/// let sound = facility.logger("Sound");
/// assert!(!sound.is_enabled_for(Severity::Info));
/// sound.error("volume file missing");
/// ```
#[derive(Clone)]
pub struct Logger {
    facility: LoggingFacility,
    name: Arc<str>,
}

impl Logger {
    pub(crate) fn new(facility: LoggingFacility, name: &str) -> Self {
        Self {
            facility,
            name: Arc::from(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn facility(&self) -> &LoggingFacility {
        &self.facility
    }

    pub fn effective_level(&self) -> Severity {
        self.facility.effective_level(&self.name)
    }

    #[inline]
    pub fn is_enabled_for(&self, level: Severity) -> bool {
        self.facility.should_emit(&self.name, level)
    }

    /// Handle for `<name>.<suffix>`
    pub fn child(&self, suffix: &str) -> Logger {
        if self.name.is_empty() {
            return Logger::new(self.facility.clone(), suffix);
        }
        Logger::new(self.facility.clone(), &format!("{}.{}", self.name, suffix))
    }

    #[track_caller]
    pub fn log(&self, level: Severity, message: impl AsRef<str>) {
        self.facility
            .log_at(&self.name, level, message, CallSite::caller());
    }

    pub fn log_at(&self, level: Severity, message: impl AsRef<str>, site: CallSite) {
        self.facility.log_at(&self.name, level, message, site);
    }

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Severity::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Severity::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(Severity::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Severity::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl AsRef<str>) {
        self.log(Severity::Critical, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("effective_level", &self.effective_level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_names() {
        let facility = LoggingFacility::builder().last_resort(false).build_empty();
        assert_eq!(facility.logger("").child("Sound").name(), "Sound");
        assert_eq!(
            facility.logger("Sound").child("Speaker").name(),
            "Sound.Speaker"
        );
    }

    #[test]
    fn test_handles_follow_reconfiguration() {
        let facility = LoggingFacility::builder().last_resort(false).build_empty();
        let sound = facility.logger("Sound");
        assert_eq!(sound.effective_level(), Severity::Warning);

        facility.set_level("", Severity::Debug).unwrap();
        assert_eq!(sound.effective_level(), Severity::Debug);
        assert!(sound.is_enabled_for(Severity::Debug));
    }
}
