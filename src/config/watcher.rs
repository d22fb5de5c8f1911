//! Reloading the configuration when its file changes.

use super::loader::{load_config, Placeholders};
use crate::core::facility::{LoggingFacility, ReloadMode};
use crate::core::LoggerError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outcome of one reload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    Applied,
    /// The running configuration was kept
    Failed(String),
}

/// Watches a configuration file and applies it to a facility on change.
///
/// The returned [`RecommendedWatcher`] must be kept alive; dropping it stops
/// watching.
pub struct ConfigWatcher {
    path: PathBuf,
    placeholders: Placeholders,
    mode: ReloadMode,
    facility: LoggingFacility,
    events: Sender<ReloadEvent>,
}

impl ConfigWatcher {
    pub fn new(
        path: &Path,
        placeholders: Placeholders,
        facility: LoggingFacility,
    ) -> (Self, Receiver<ReloadEvent>) {
        let (events, rx) = unbounded();
        (
            Self {
                path: path.to_path_buf(),
                placeholders,
                mode: ReloadMode::Replace,
                facility,
                events,
            },
            rx,
        )
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ReloadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Load and apply the file once
    pub fn reload(&self) -> ReloadEvent {
        let result = load_config(&self.path, &self.placeholders)
            .and_then(|config| self.facility.reconfigure(&config, self.mode));
        match result {
            Ok(()) => ReloadEvent::Applied,
            Err(e) => {
                self.facility.report(&e);
                ReloadEvent::Failed(e.to_string())
            }
        }
    }

    /// Start watching in the background.
    ///
    /// The parent directory is watched so editors that replace the file by
    /// renaming are still noticed.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let concerns_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if concerns_config {
                        let outcome = self.reload();
                        let _ = self.events.send(outcome);
                    }
                }
                Err(e) => {
                    let err = LoggerError::other(format!("config watch error: {}", e));
                    self.facility.report(&err);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(watcher)
    }
}
