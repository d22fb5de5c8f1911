//! Sink trait for rendered log output destinations

use super::error::{LoggerError, Result};
use std::sync::Arc;

/// Receives runtime errors that must not propagate into application code.
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// The default fallback channel: process stderr
pub fn stderr_error_callback() -> ErrorCallback {
    Arc::new(|err: &LoggerError| eprintln!("[LOGGER ERROR] {}", err))
}

/// Destination for rendered records.
///
/// Callers serialize access; a sink never sees two writes at once.
pub trait Sink: Send {
    /// Write one rendered record; the sink adds the line terminator
    fn write(&mut self, rendered: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;

    /// Flush and release underlying resources
    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}
