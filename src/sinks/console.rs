//! Console sink implementation

use crate::core::{LoggerError, Result, Sink};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// Standard stream a console sink writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    Stdout,
    #[default]
    Stderr,
}

impl ConsoleStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}

impl fmt::Display for ConsoleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsoleStream {
    type Err = String;

    /// Accepts `stdout` / `stderr`, also in the `ext://sys.stdout` spelling
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let stream = s.trim().to_ascii_lowercase();
        match stream.trim_start_matches("ext://sys.") {
            "stdout" => Ok(ConsoleStream::Stdout),
            "stderr" => Ok(ConsoleStream::Stderr),
            _ => Err(format!("unknown stream '{}' (expected stdout or stderr)", s)),
        }
    }
}

pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleStream::Stderr)
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn write_line(mut out: impl Write, rendered: &str) -> io::Result<()> {
        // One write_all per line keeps records whole when the stream is shared
        let line = format!("{}\n", rendered);
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(ConsoleStream::default())
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, rendered: &str) -> Result<()> {
        let result = match self.stream {
            ConsoleStream::Stdout => Self::write_line(io::stdout().lock(), rendered),
            ConsoleStream::Stderr => Self::write_line(io::stderr().lock(), rendered),
        };
        result.map_err(|e| {
            LoggerError::io_operation("write", self.stream.as_str(), e)
        })
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().flush()?,
            ConsoleStream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.stream.as_str()
    }
}
