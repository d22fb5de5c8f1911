//! Log record structure

use super::severity::Severity;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::panic::Location;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
///
/// `ThreadId`'s debug form is `ThreadId(N)`; only `N` is kept.
fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let raw = format!("{:?}", std::thread::current().id());
                raw.trim_start_matches("ThreadId(")
                    .trim_end_matches(')')
                    .to_string()
            })
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Source location of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub function: Option<&'static str>,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function: Some(function),
        }
    }

    /// Location of the caller, without a function name
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            function: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Dot-namespaced name of the emitting logger; empty for the root logger
    pub logger: String,
    pub level: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a record always renders as a single line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(logger: impl Into<String>, level: Severity, message: impl AsRef<str>) -> Self {
        Self {
            logger: logger.into(),
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Utc::now(),
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
            file: None,
            line: None,
            function: None,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_call_site(mut self, site: CallSite) -> Self {
        self.file = Some(site.file.to_string());
        self.line = Some(site.line);
        self.function = site.function.map(String::from);
        self
    }

    #[must_use]
    pub fn with_location(mut self, file: &str, line: u32, function: &str) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self.function = Some(function.to_string());
        self
    }

    /// Logger name as rendered: the root logger is shown as `root`
    #[must_use]
    pub fn logger_display_name(&self) -> &str {
        if self.logger.is_empty() {
            "root"
        } else {
            &self.logger
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_single_line() {
        let record = LogRecord::new("Sound", Severity::Info, "a\nb\tc\r");
        assert_eq!(record.message, "a\\nb\\tc\\r");
    }

    #[test]
    fn test_thread_id_is_numeric() {
        let record = LogRecord::new("Sound", Severity::Info, "x");
        assert!(record.thread_id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_thread_name_captured() {
        let handle = std::thread::Builder::new()
            .name("AnnouncementProcessorThread".into())
            .spawn(|| LogRecord::new("Sound", Severity::Info, "x"))
            .unwrap();
        let record = handle.join().unwrap();
        assert_eq!(record.thread_name.as_deref(), Some("AnnouncementProcessorThread"));
    }

    #[test]
    fn test_call_site() {
        let record =
            LogRecord::new("Config", Severity::Error, "x").with_call_site(CallSite::caller());
        assert!(record.file.as_deref().unwrap().ends_with("log_record.rs"));
        assert!(record.line.is_some());
        assert!(record.function.is_none());
    }

    #[test]
    fn test_root_display_name() {
        assert_eq!(LogRecord::new("", Severity::Info, "x").logger_display_name(), "root");
        assert_eq!(
            LogRecord::new("Validators", Severity::Info, "x").logger_display_name(),
            "Validators"
        );
    }
}
