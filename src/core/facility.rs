//! The logging facility runtime
//!
//! A [`LoggingFacility`] owns the formatters, handlers and logger tree built
//! from a configuration. Readers (every log call) take a lock-free snapshot
//! of that state; structural changes build a new snapshot under a mutex and
//! publish it atomically, so a log call sees either the old tree or the new
//! one, never a half-updated one.

use super::error::{LoggerError, Result};
use super::formatter::Formatter;
use super::handler::Handler;
use super::hierarchy::Hierarchy;
use super::log_record::{CallSite, LogRecord};
use super::logger::Logger;
use super::metrics::FacilityMetrics;
use super::severity::{LevelSetting, Severity};
use super::sink::{stderr_error_callback, ErrorCallback};
use super::timestamp::{Clock, SystemClock};
use crate::config::assemble::{
    apply_loggers, build_formatters, build_handlers, rebind_handlers, FormatterMap, HandlerMap,
};
use crate::config::validation::{validate_against, validate_config, ExistingNames};
use crate::config::LoggingConfig;
use crate::sinks::ConsoleSink;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How [`LoggingFacility::reconfigure`] treats the running configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadMode {
    /// Discard everything and build from the new document alone
    #[default]
    Replace,
    /// Keep what the document does not mention; redefine what it does
    Merge,
}

#[derive(Clone, Default)]
struct FacilityState {
    formatters: FormatterMap,
    handlers: HandlerMap,
    hierarchy: Hierarchy,
}

struct FacilityInner {
    state: ArcSwap<FacilityState>,
    /// Serializes writers; readers never take it
    reconfigure_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
    on_error: ErrorCallback,
    metrics: FacilityMetrics,
    closed: AtomicBool,
    last_resort: Option<Arc<Handler>>,
}

/// Process-wide logging state: cheap to clone, shareable across threads.
///
/// # Examples
///
/// ```
/// use rust_logging_facility::{LoggingFacility, Severity};
///
/// let facility = LoggingFacility::builder().last_resort(false).build_empty();
/// assert_eq!(facility.effective_level("Sound"), Severity::Warning);
/// assert!(!facility.should_emit("Sound", Severity::Info));
/// assert!(facility.should_emit("Sound", Severity::Error));
/// ```
#[derive(Clone)]
pub struct LoggingFacility {
    inner: Arc<FacilityInner>,
}

/// Configures how a [`LoggingFacility`] is built.
pub struct FacilityBuilder {
    clock: Arc<dyn Clock>,
    on_error: ErrorCallback,
    last_resort: bool,
}

impl Default for FacilityBuilder {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            on_error: stderr_error_callback(),
            last_resort: true,
        }
    }
}

impl FacilityBuilder {
    /// Time source for record timestamps and rotation boundaries
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Where runtime write failures are reported
    #[must_use]
    pub fn on_error(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = on_error;
        self
    }

    /// Whether records that reach no handler go to stderr (WARNING and up)
    #[must_use]
    pub fn last_resort(mut self, enabled: bool) -> Self {
        self.last_resort = enabled;
        self
    }

    fn last_resort_handler(&self) -> Option<Arc<Handler>> {
        if !self.last_resort {
            return None;
        }
        let formatter = Formatter::new("last_resort", "{message}").ok()?;
        Some(Arc::new(
            Handler::new(
                "last_resort",
                Severity::Warning,
                Arc::new(formatter),
                Box::new(ConsoleSink::stderr()),
            )
            .with_error_callback(Arc::clone(&self.on_error)),
        ))
    }

    fn finish(self, state: FacilityState) -> LoggingFacility {
        let last_resort = self.last_resort_handler();
        LoggingFacility {
            inner: Arc::new(FacilityInner {
                state: ArcSwap::from_pointee(state),
                reconfigure_lock: Mutex::new(()),
                clock: self.clock,
                on_error: self.on_error,
                metrics: FacilityMetrics::new(),
                closed: AtomicBool::new(false),
                last_resort,
            }),
        }
    }

    /// Validate `config`, open every sink and wire the logger tree.
    ///
    /// # Errors
    ///
    /// Configuration problems are reported as one
    /// [`LoggerError::Validation`] listing all of them; a sink that cannot
    /// be opened fails with [`LoggerError::SinkInit`].
    pub fn build(self, config: &LoggingConfig) -> Result<LoggingFacility> {
        let state = build_state(config, &self.clock, &self.on_error)?;
        Ok(self.finish(state))
    }

    /// A facility with only the root logger, at WARNING and without handlers
    pub fn build_empty(self) -> LoggingFacility {
        self.finish(FacilityState::default())
    }
}

fn build_state(
    config: &LoggingConfig,
    clock: &Arc<dyn Clock>,
    on_error: &ErrorCallback,
) -> Result<FacilityState> {
    let validated = validate_config(config)?;
    let formatters = build_formatters(&validated);
    let handlers = build_handlers(&validated, &formatters, clock, on_error)?;
    let mut hierarchy = Hierarchy::new();
    apply_loggers(&mut hierarchy, &validated, &handlers)?;
    Ok(FacilityState {
        formatters,
        handlers,
        hierarchy,
    })
}

impl LoggingFacility {
    pub fn builder() -> FacilityBuilder {
        FacilityBuilder::default()
    }

    /// Build a facility with the default clock and error callback
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        Self::builder().build(config)
    }

    /// Handle for the logger `name`; `""` is the root logger.
    ///
    /// Names need not be configured: an unknown name resolves its level and
    /// handlers through its nearest configured ancestor.
    pub fn logger(&self, name: &str) -> Logger {
        Logger::new(self.clone(), name)
    }

    pub fn effective_level(&self, logger: &str) -> Severity {
        self.inner.state.load().hierarchy.effective_level(logger)
    }

    #[inline]
    pub fn should_emit(&self, logger: &str, level: Severity) -> bool {
        level >= self.effective_level(logger)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Log `message` from `logger`, recording the caller's file and line
    #[track_caller]
    pub fn log(&self, logger: &str, level: Severity, message: impl AsRef<str>) {
        self.log_at(logger, level, message, CallSite::caller());
    }

    /// Log with an explicit call site
    pub fn log_at(&self, logger: &str, level: Severity, message: impl AsRef<str>, site: CallSite) {
        if self.is_closed() {
            return;
        }
        if !self.should_emit(logger, level) {
            self.inner.metrics.record_suppressed();
            return;
        }
        self.inner.metrics.record_emitted();

        let record = LogRecord::new(logger, level, message)
            .with_timestamp(self.inner.clock.now())
            .with_call_site(site);
        self.dispatch(&record);
    }

    /// Hand `record` to every handler on its logger's propagation chain.
    ///
    /// The logger level is not checked here; each handler still applies its
    /// own minimum. Returns how many handlers wrote the record.
    pub fn dispatch(&self, record: &LogRecord) -> usize {
        if self.is_closed() {
            return 0;
        }

        let handlers = self.inner.state.load().hierarchy.handlers_for(&record.logger);

        if handlers.is_empty() {
            if let Some(last_resort) = &self.inner.last_resort {
                self.inner.metrics.record_last_resort();
                let outcome = last_resort.handle(record);
                self.inner.metrics.record_outcome(outcome);
            }
            return 0;
        }

        let mut written = 0;
        for handler in &handlers {
            let outcome = handler.handle(record);
            self.inner.metrics.record_outcome(outcome);
            if outcome == super::handler::HandleOutcome::Written {
                written += 1;
            }
        }
        written
    }

    /// Apply `change` to a copy of the current state and publish it
    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut FacilityState) -> Result<()>,
    {
        let _guard = self.inner.reconfigure_lock.lock();
        if self.is_closed() {
            return Err(LoggerError::LoggerStopped);
        }
        let mut next = FacilityState::clone(&self.inner.state.load());
        change(&mut next)?;
        self.inner.state.store(Arc::new(next));
        Ok(())
    }

    /// Set a logger's level, registering the logger if needed.
    ///
    /// # Errors
    ///
    /// The root (`""`) cannot be set to NOTSET; names with empty segments are
    /// rejected.
    pub fn set_level(&self, logger: &str, level: impl Into<LevelSetting>) -> Result<()> {
        let level = level.into();
        self.update(|state| state.hierarchy.set_level(logger, level))
    }

    /// Stop (or resume) handing a logger's records to its ancestors
    pub fn set_propagate(&self, logger: &str, propagate: bool) -> Result<()> {
        self.update(|state| {
            state.hierarchy.ensure(logger)?.propagate = propagate;
            Ok(())
        })
    }

    /// Bind a handler built in code (any [`Sink`](super::sink::Sink)) to
    /// `logger`.
    ///
    /// # Errors
    ///
    /// Fails if a handler with the same name already exists.
    pub fn attach_handler(&self, logger: &str, handler: Handler) -> Result<()> {
        let handler = Arc::new(handler);
        self.update(|state| {
            let name = handler.name().to_string();
            if state.handlers.contains_key(&name) {
                return Err(LoggerError::config(
                    format!("handlers.{}", name),
                    "a handler with this name already exists",
                ));
            }
            state.hierarchy.ensure(logger)?.handlers.push(Arc::clone(&handler));
            state.handlers.insert(name, handler);
            Ok(())
        })
    }

    /// Rebuild from `config`.
    ///
    /// The new configuration is fully validated and every new sink opened
    /// before anything is published; on error the running configuration is
    /// untouched. Concurrent reconfigurations and level changes are applied
    /// one at a time, in the order they take the lock.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::LoggerStopped`] after [`shutdown`](Self::shutdown).
    pub fn reconfigure(&self, config: &LoggingConfig, mode: ReloadMode) -> Result<()> {
        match mode {
            ReloadMode::Replace => {
                let _guard = self.inner.reconfigure_lock.lock();
                if self.is_closed() {
                    return Err(LoggerError::LoggerStopped);
                }
                let next = build_state(config, &self.inner.clock, &self.inner.on_error)?;
                self.inner.state.store(Arc::new(next));
                Ok(())
            }
            ReloadMode::Merge => self.update(|state| {
                let existing = ExistingNames {
                    formatters: state.formatters.keys().cloned().collect(),
                    handlers: state.handlers.keys().cloned().collect(),
                };
                let validated = validate_against(config, &existing)?;

                let mut formatters = state.formatters.clone();
                formatters.extend(build_formatters(&validated));
                let fresh = build_handlers(
                    &validated,
                    &formatters,
                    &self.inner.clock,
                    &self.inner.on_error,
                )?;

                let mut handlers = state.handlers.clone();
                handlers.extend(fresh.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));

                rebind_handlers(&mut state.hierarchy, &fresh);
                apply_loggers(&mut state.hierarchy, &validated, &handlers)?;

                state.formatters = formatters;
                state.handlers = handlers;
                Ok(())
            }),
        }
    }

    /// Flush every handler, returning the first failure
    pub fn flush(&self) -> Result<()> {
        let state = self.inner.state.load();
        let mut first_error = None;
        for handler in state.handlers.values().chain(self.inner.last_resort.iter()) {
            if let Err(e) = handler.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Flush and close every sink. Later log calls are ignored.
    ///
    /// Returns [`LoggerError::LoggerStopped`] if already shut down.
    pub fn shutdown(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Err(LoggerError::LoggerStopped);
        }
        let _guard = self.inner.reconfigure_lock.lock();
        let state = self.inner.state.load();
        let mut first_error = None;
        for handler in state.handlers.values().chain(self.inner.last_resort.iter()) {
            if let Err(e) = handler.close() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn metrics(&self) -> &FacilityMetrics {
        &self.inner.metrics
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.inner.state.load().handlers.keys().cloned().collect()
    }

    pub fn formatter_names(&self) -> Vec<String> {
        self.inner.state.load().formatters.keys().cloned().collect()
    }

    /// Registered logger names, root excluded
    pub fn logger_names(&self) -> Vec<String> {
        self.inner.state.load().hierarchy.names()
    }

    /// Names of the handlers a record from `logger` reaches, in order
    pub fn handlers_for(&self, logger: &str) -> Vec<String> {
        self.inner
            .state
            .load()
            .hierarchy
            .handlers_for(logger)
            .iter()
            .map(|h| h.name().to_string())
            .collect()
    }

    pub(crate) fn report(&self, err: &LoggerError) {
        (self.inner.on_error)(err);
    }
}

impl fmt::Debug for LoggingFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.load();
        f.debug_struct("LoggingFacility")
            .field("formatters", &state.formatters.keys().collect::<Vec<_>>())
            .field("handlers", &state.handlers.keys().collect::<Vec<_>>())
            .field("loggers", &state.hierarchy.names())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::Sink;

    struct VecSink(Arc<Mutex<Vec<String>>>);

    impl Sink for VecSink {
        fn write(&mut self, rendered: &str) -> Result<()> {
            self.0.lock().push(rendered.to_string());
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "vec"
        }
    }

    fn capture(name: &str, level: Severity) -> (Handler, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let formatter = Arc::new(Formatter::new("f", "{logger_name}:{level}:{message}").unwrap());
        let handler = Handler::new(name, level, formatter, Box::new(VecSink(Arc::clone(&lines))));
        (handler, lines)
    }

    fn empty() -> LoggingFacility {
        LoggingFacility::builder().last_resort(false).build_empty()
    }

    #[test]
    fn test_root_handler_receives_propagated_records() {
        let facility = empty();
        let (handler, lines) = capture("file", Severity::Debug);
        facility.attach_handler("", handler).unwrap();

        facility.log("Sound", Severity::Info, "x");
        facility.log("Sound", Severity::Error, "y");

        assert_eq!(*lines.lock(), vec!["Sound:ERROR:y"]);
        assert_eq!(facility.metrics().suppressed(), 1);
        assert_eq!(facility.metrics().emitted(), 1);
    }

    #[test]
    fn test_logger_level_checked_once_at_origin() {
        let facility = empty();
        let (handler, lines) = capture("root", Severity::Debug);
        facility.attach_handler("", handler).unwrap();
        facility.set_level("Sound", Severity::Debug).unwrap();

        // Root is at WARNING but only the originating logger's level matters
        facility.log("Sound.Speaker", Severity::Debug, "deep");
        assert_eq!(*lines.lock(), vec!["Sound.Speaker:DEBUG:deep"]);
    }

    #[test]
    fn test_propagate_false_stops_chain() {
        let facility = empty();
        let (root, root_lines) = capture("root", Severity::Debug);
        let (own, own_lines) = capture("own", Severity::Debug);
        facility.attach_handler("", root).unwrap();
        facility.attach_handler("Sound", own).unwrap();
        facility.set_propagate("Sound", false).unwrap();

        facility.log("Sound", Severity::Error, "y");
        assert_eq!(own_lines.lock().len(), 1);
        assert!(root_lines.lock().is_empty());
        assert_eq!(facility.handlers_for("Sound"), vec!["own"]);
    }

    #[test]
    fn test_duplicate_handler_name_rejected() {
        let facility = empty();
        facility.attach_handler("", capture("file", Severity::Debug).0).unwrap();
        let err = facility
            .attach_handler("Sound", capture("file", Severity::Debug).0)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_shutdown_stops_logging() {
        let facility = empty();
        let (handler, lines) = capture("file", Severity::Debug);
        facility.attach_handler("", handler).unwrap();

        facility.shutdown().unwrap();
        facility.log("", Severity::Critical, "late");

        assert!(lines.lock().is_empty());
        assert!(matches!(facility.shutdown(), Err(LoggerError::LoggerStopped)));
    }

    #[test]
    fn test_changes_after_shutdown_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig::application_default(dir.path());
        let facility = empty();
        facility.shutdown().unwrap();

        for mode in [ReloadMode::Replace, ReloadMode::Merge] {
            let err = facility.reconfigure(&config, mode).unwrap_err();
            assert!(matches!(err, LoggerError::LoggerStopped));
        }
        assert!(matches!(
            facility.set_level("Sound", Severity::Debug),
            Err(LoggerError::LoggerStopped)
        ));
        assert!(matches!(
            facility.attach_handler("", capture("late", Severity::Debug).0),
            Err(LoggerError::LoggerStopped)
        ));

        // No sink was opened for the refused configuration
        assert!(!dir.path().join("logs").exists());
        assert!(facility.handler_names().is_empty());
    }

    #[test]
    fn test_replace_builds_under_reconfigure_lock() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig::application_default(dir.path());
        let facility = empty();

        let guard = facility.inner.reconfigure_lock.lock();
        let reload = {
            let facility = facility.clone();
            std::thread::spawn(move || facility.reconfigure(&config, ReloadMode::Replace))
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(!dir.path().join("logs").exists());
        drop(guard);

        reload.join().unwrap().unwrap();
        assert!(dir.path().join("logs").join("prewarning.log").exists());
        assert_eq!(facility.handler_names(), vec!["console", "file"]);
    }

    #[test]
    fn test_root_level_cannot_be_notset() {
        let facility = empty();
        assert!(facility.set_level("", LevelSetting::NotSet).is_err());
        assert_eq!(facility.effective_level(""), Severity::Warning);
    }

    #[test]
    fn test_dispatch_bypasses_logger_level() {
        let facility = empty();
        let (handler, lines) = capture("file", Severity::Debug);
        facility.attach_handler("", handler).unwrap();

        let written = facility.dispatch(&LogRecord::new("Sound", Severity::Debug, "forced"));
        assert_eq!(written, 1);
        assert_eq!(lines.lock().len(), 1);
    }

    #[test]
    fn test_last_resort_counts() {
        let facility = LoggingFacility::builder().build_empty();
        facility.log("Orphan", Severity::Error, "nobody listens");
        assert_eq!(facility.metrics().last_resort_uses(), 1);
    }
}
