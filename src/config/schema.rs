//! Configuration schema definitions.
//!
//! Mirrors the configuration document one-to-one. Enumerated values (levels,
//! handler classes, rotation units) are kept as strings here so that
//! validation can report every bad value with its path instead of stopping
//! at the first one serde trips over.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Only accepted value of the `version` key
pub const SCHEMA_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

/// Root of a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Schema version, must be 1
    pub version: u32,

    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterConfig>,

    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerConfig>,

    /// Named loggers, keyed by dot-namespaced name
    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerConfig>,

    /// Root logger; WARNING with no handlers when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            formatters: BTreeMap::new(),
            handlers: BTreeMap::new(),
            loggers: BTreeMap::new(),
            root: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormatterConfig {
    /// Template, e.g. `{timestamp} - {logger_name} - {level} - {message}`
    pub format: String,

    /// Named timestamp format or strftime pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datefmt: Option<String>,

    /// Render timestamps in UTC instead of local time
    #[serde(default)]
    pub utc: bool,
}

impl FormatterConfig {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            datefmt: None,
            utc: false,
        }
    }
}

/// One handler. Which keys apply depends on `class`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    /// `Console` or `RotatingFile`
    pub class: String,

    /// Minimum severity; DEBUG when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    pub formatter: String,

    // Console
    /// `stdout` or `stderr` (default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    /// Colourise the severity field
    #[serde(default)]
    pub colors: bool,

    // RotatingFile
    /// May contain `{NAME}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// `S`, `M`, `H` (default), `D`, `MIDNIGHT` or `W0`-`W6`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,

    /// Compute rotation boundaries in UTC
    #[serde(default)]
    pub utc: bool,

    /// Gzip archives
    #[serde(default)]
    pub compress: bool,
}

impl HandlerConfig {
    pub fn console(formatter: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            class: "Console".to_string(),
            formatter: formatter.into(),
            stream: Some(stream.into()),
            ..Self::default()
        }
    }

    pub fn rotating_file(
        formatter: impl Into<String>,
        filename: impl Into<String>,
        when: impl Into<String>,
        interval: u32,
    ) -> Self {
        Self {
            class: "RotatingFile".to_string(),
            formatter: formatter.into(),
            filename: Some(filename.into()),
            when: Some(when.into()),
            interval: Some(interval),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Severity or `NOTSET` (default) to inherit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub handlers: Vec<String>,

    /// Also hand records to ancestors' handlers
    #[serde(default = "default_true")]
    pub propagate: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: None,
            handlers: Vec::new(),
            propagate: true,
        }
    }
}

impl LoggerConfig {
    /// A logger that defers level and routing to its ancestors
    pub fn not_set() -> Self {
        Self {
            level: Some("NOTSET".to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    /// Must be an explicit severity; WARNING when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default)]
    pub handlers: Vec<String>,
}
