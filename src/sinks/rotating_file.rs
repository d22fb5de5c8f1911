//! Time-rotating file sink
//!
//! The active file lives at a fixed path. When a write arrives at or after
//! the scheduled boundary (or would push the file past `max_bytes`), the file
//! is renamed to `<path>.<suffix>`, optionally gzipped, old archives beyond
//! `backup_count` are pruned, and a fresh file is opened at the same path
//! before the record is written. All of that runs inside one `write` call, so
//! the lock the owning handler holds makes it a single critical section.

use super::rotation::RotationSchedule;
use crate::core::error::{LoggerError, Result};
use crate::core::sink::{stderr_error_callback, ErrorCallback, Sink};
use crate::core::timestamp::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rotation settings for [`RotatingFileSink`]
///
/// # Examples
///
/// ```
/// use rust_logging_facility::sinks::{RotationPolicy, RotationSchedule};
///
/// let policy = RotationPolicy::new(RotationSchedule::daily_at_midnight())
///     .with_backup_count(30)
///     .with_compression(true);
/// assert_eq!(policy.backup_count, 30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RotationPolicy {
    pub schedule: RotationSchedule,
    /// Archives kept after pruning; 0 keeps everything
    pub backup_count: usize,
    /// Also rotate when the active file would reach this size
    pub max_bytes: Option<u64>,
    /// Gzip archives after rotation
    pub compress: bool,
}

impl RotationPolicy {
    #[must_use]
    pub fn new(schedule: RotationSchedule) -> Self {
        Self {
            schedule,
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes).filter(|&max| max > 0);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

pub struct RotatingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    clock: Arc<dyn Clock>,
    on_error: ErrorCallback,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    rollover_at: DateTime<Utc>,
    closed: bool,
}

impl RotatingFileSink {
    /// Open `path` with the given policy on the wall clock
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        Self::with_clock(path, policy, Arc::new(SystemClock))
    }

    /// Open `path` reading the time from `clock`.
    ///
    /// The first boundary is computed from the file's modification time when
    /// it already holds data, so a restart after midnight still archives the
    /// previous day's file.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn with_clock<P: AsRef<Path>>(
        path: P,
        policy: RotationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, modified) = Self::open_file(&base_path)?;

        let start = match modified {
            Some(modified) if current_size > 0 => modified,
            _ => clock.now(),
        };
        let rollover_at = policy.schedule.next_boundary(start);

        Ok(Self {
            base_path,
            policy,
            clock,
            on_error: stderr_error_callback(),
            writer: Some(BufWriter::new(file)),
            current_size,
            rollover_at,
            closed: false,
        })
    }

    /// Route rotation failures somewhere other than stderr
    #[must_use]
    pub fn with_error_callback(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = on_error;
        self
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// The next scheduled rotation instant
    #[must_use]
    pub fn next_rollover(&self) -> DateTime<Utc> {
        self.rollover_at
    }

    fn open_file(path: &Path) -> Result<(File, u64, Option<DateTime<Utc>>)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_write(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_write(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        Ok((file, metadata.len(), modified))
    }

    fn write_line(writer: &mut BufWriter<File>, rendered: &str) -> std::io::Result<()> {
        writer.write_all(rendered.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    fn report(&self, err: LoggerError) {
        (self.on_error)(&err);
    }

    fn should_rollover(&self, now: DateTime<Utc>, incoming: u64) -> bool {
        if now >= self.rollover_at {
            return true;
        }
        match self.policy.max_bytes {
            Some(max) => self.current_size > 0 && self.current_size + incoming >= max,
            None => false,
        }
    }

    /// First `<path>.<suffix>[.N]` that collides with neither an archive nor
    /// its compressed form
    fn archive_path(&self, suffix: &str) -> PathBuf {
        let file_name = self
            .base_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");

        let mut counter = 0usize;
        loop {
            let candidate = if counter == 0 {
                format!("{}.{}", file_name, suffix)
            } else {
                format!("{}.{}.{}", file_name, suffix, counter)
            };
            let path = self.base_path.with_file_name(&candidate);
            let gz = self.base_path.with_file_name(format!("{}.gz", candidate));
            if !path.exists() && !gz.exists() {
                return path;
            }
            counter += 1;
        }
    }

    /// Archive the active file and open a new one.
    ///
    /// Never fails: problems are reported and the sink keeps appending to
    /// whatever file it can open, so the pending record is not lost.
    fn rollover(&mut self, now: DateTime<Utc>) {
        let time_due = now >= self.rollover_at;
        let suffix = self.policy.schedule.archive_suffix(self.rollover_at);

        if self.current_size > 0 {
            self.archive_active(&suffix);
        }

        if time_due {
            self.rollover_at = self.policy.schedule.next_boundary(now);
        }
    }

    fn archive_active(&mut self, suffix: &str) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                self.report(LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                ));
            }
            // Writer is dropped here, releasing the file handle
        }

        let archive = self.archive_path(suffix);
        if let Err(e) = fs::rename(&self.base_path, &archive) {
            self.report(LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!(
                    "Failed to archive to '{}': {}. Continuing with current file.",
                    archive.display(),
                    e
                ),
            ));
            self.reopen();
            return;
        }

        self.reopen();

        if self.policy.compress {
            if let Err(e) = Self::compress_file(&archive) {
                self.report(e);
            }
        }

        if self.policy.backup_count > 0 {
            if let Err(e) = self.prune_archives() {
                self.report(e);
            }
        }
    }

    fn reopen(&mut self) {
        match Self::open_file(&self.base_path) {
            Ok((file, size, _)) => {
                self.writer = Some(BufWriter::new(file));
                self.current_size = size;
            }
            Err(e) => {
                self.writer = None;
                self.report(e);
            }
        }
    }

    /// Archives of this file, oldest first
    pub fn archives(&self) -> Result<Vec<PathBuf>> {
        let dir = match self.base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let prefix = format!(
            "{}.",
            self.base_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("app.log")
        );

        let mut found: Vec<(String, u64, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let rest = rest.strip_suffix(".gz").unwrap_or(rest);
            let (suffix, counter) = match rest.split_once('.') {
                Some((suffix, counter)) => match counter.parse::<u64>() {
                    Ok(counter) => (suffix, counter),
                    Err(_) => continue,
                },
                None => (rest, 0),
            };
            if self.policy.schedule.matches_suffix(suffix) {
                found.push((suffix.to_string(), counter, entry.path()));
            }
        }

        found.sort();
        Ok(found.into_iter().map(|(_, _, path)| path).collect())
    }

    fn prune_archives(&self) -> Result<()> {
        let archives = self.archives()?;
        let excess = archives.len().saturating_sub(self.policy.backup_count);
        for path in archives.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                self.report(LoggerError::file_rotation(
                    path.display().to_string(),
                    format!("Failed to remove old archive: {}", e),
                ));
            }
        }
        Ok(())
    }

    /// Compress a log file with transactional safety using streaming I/O
    ///
    /// The original file is only deleted after compression is fully
    /// successful.
    fn compress_file(path: &Path) -> Result<()> {
        use std::io::{BufReader, Read};

        let mut gz_name = path.as_os_str().to_owned();
        gz_name.push(".gz");
        let gz_path = PathBuf::from(gz_name);
        let mut tmp_name = gz_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let temp_gz_path = PathBuf::from(tmp_name);

        let input = File::open(path).map_err(|e| {
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to open file for compression: {}", path.display()),
                e,
            )
        })?;
        let mut reader = BufReader::with_capacity(64 * 1024, input);

        let output = File::create(&temp_gz_path).map_err(|e| {
            LoggerError::io_operation(
                "compress log file",
                format!(
                    "Failed to create temporary compressed file: {}",
                    temp_gz_path.display()
                ),
                e,
            )
        })?;
        let buffered_output = BufWriter::with_capacity(64 * 1024, output);
        let mut encoder =
            flate2::write::GzEncoder::new(buffered_output, flate2::Compression::default());

        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let bytes_read = reader.read(&mut buffer).map_err(|e| {
                let _ = fs::remove_file(&temp_gz_path);
                LoggerError::io_operation(
                    "compress log file",
                    format!("Failed to read from file: {}", path.display()),
                    e,
                )
            })?;

            if bytes_read == 0 {
                break;
            }

            encoder.write_all(&buffer[..bytes_read]).map_err(|e| {
                let _ = fs::remove_file(&temp_gz_path);
                LoggerError::io_operation(
                    "compress log file",
                    "Failed to compress data chunk".to_string(),
                    e,
                )
            })?;
        }

        encoder
            .finish()
            .and_then(|mut inner| inner.flush())
            .map_err(|e| {
                let _ = fs::remove_file(&temp_gz_path);
                LoggerError::io_operation(
                    "compress log file",
                    "Failed to finish compression".to_string(),
                    e,
                )
            })?;

        fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to rename compressed file to: {}", gz_path.display()),
                e,
            )
        })?;

        // Compression succeeded; a leftover original is only wasted space
        if let Err(e) = fs::remove_file(path) {
            return Err(LoggerError::file_rotation(
                path.display().to_string(),
                format!("Compressed, but failed to remove original: {}", e),
            ));
        }

        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn name(&self) -> &str {
        "rotating_file"
    }

    fn write(&mut self, rendered: &str) -> Result<()> {
        if self.closed {
            return Err(LoggerError::LoggerStopped);
        }
        let incoming = rendered.len() as u64 + 1;
        let now = self.clock.now();

        if self.should_rollover(now, incoming) {
            self.rollover(now);
        }

        if self.writer.is_none() {
            self.reopen();
        }

        let Some(writer) = self.writer.as_mut() else {
            return Err(LoggerError::writer(format!(
                "no open file at '{}'",
                self.base_path.display()
            )));
        };

        Self::write_line(writer, rendered).map_err(|e| {
            LoggerError::file_write(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += incoming;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_write(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let result = self.flush();
        self.writer = None;
        self.closed = true;
        result
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            // Best effort flush - ignore errors during drop
            let _ = writer.flush();
        }
    }
}
