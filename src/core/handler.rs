//! Handlers: a minimum severity, a formatter and a sink bound together

use super::error::{LoggerError, Result};
use super::formatter::Formatter;
use super::log_record::LogRecord;
use super::severity::Severity;
use super::sink::{stderr_error_callback, ErrorCallback, Sink};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What happened to a record offered to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Below the handler's minimum severity, or the handler is closed
    Rejected,
    Written,
    /// Rendering or writing failed; the error went to the error callback
    Failed,
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

pub struct Handler {
    name: String,
    min_level: Severity,
    formatter: Arc<Formatter>,
    sink: Mutex<Box<dyn Sink>>,
    colorize: bool,
    on_error: ErrorCallback,
    closed: AtomicBool,
}

impl Handler {
    pub fn new(
        name: impl Into<String>,
        min_level: Severity,
        formatter: Arc<Formatter>,
        sink: Box<dyn Sink>,
    ) -> Self {
        Self {
            name: name.into(),
            min_level,
            formatter,
            sink: Mutex::new(sink),
            colorize: false,
            on_error: stderr_error_callback(),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_error_callback(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = on_error;
        self
    }

    /// Colourise the severity field (terminal sinks only)
    #[must_use]
    pub fn with_colors(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_level(&self) -> Severity {
        self.min_level
    }

    pub fn formatter(&self) -> &Arc<Formatter> {
        &self.formatter
    }

    #[inline]
    pub fn accepts(&self, level: Severity) -> bool {
        level >= self.min_level
    }

    fn render(&self, record: &LogRecord) -> Result<String> {
        if self.colorize {
            self.formatter.render_colored(record)
        } else {
            self.formatter.render(record)
        }
    }

    /// Filter, render and write one record.
    ///
    /// Never panics and never returns an error: failures are handed to the
    /// error callback and reported as [`HandleOutcome::Failed`].
    pub fn handle(&self, record: &LogRecord) -> HandleOutcome {
        if !self.accepts(record.level) {
            return HandleOutcome::Rejected;
        }

        let rendered = match self.render(record) {
            Ok(text) => text,
            Err(e) => {
                (self.on_error)(&e);
                return HandleOutcome::Failed;
            }
        };

        // The lock covers the whole write, including any rotation the sink does
        let mut sink = self.sink.lock();
        if self.closed.load(Ordering::Acquire) {
            return HandleOutcome::Rejected;
        }
        let result = catch_unwind(AssertUnwindSafe(|| sink.write(&rendered)));

        match result {
            Ok(Ok(())) => HandleOutcome::Written,
            Ok(Err(e)) => {
                let e = LoggerError::writer(format!("handler '{}': {}", self.name, e));
                (self.on_error)(&e);
                HandleOutcome::Failed
            }
            Err(panic_info) => {
                let e = LoggerError::writer(format!(
                    "handler '{}' sink panicked: {}",
                    self.name,
                    panic_message(panic_info.as_ref())
                ));
                (self.on_error)(&e);
                HandleOutcome::Failed
            }
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.lock().flush()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Flush and close the sink; later records are rejected
    pub fn close(&self) -> Result<()> {
        let mut sink = self.sink.lock();
        self.closed.store(true, Ordering::Release);
        sink.close()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("formatter", &self.formatter.name())
            .field("sink", &self.sink.lock().name())
            .finish()
    }
}
