//! Configuration loading from disk.
//!
//! Reads a TOML or JSON document, deserializes it and resolves `{NAME}`
//! placeholders in handler filenames. Semantic checks live in
//! [`validation`](super::validation).

use super::schema::LoggingConfig;
use crate::core::error::{LoggerError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder naming the application's base directory
pub const APPLICATION_DIR: &str = "APPLICATION_DIR";

/// Document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick the syntax from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(LoggerError::config(
                "config file",
                format!(
                    "cannot tell the format of '{}' (expected a .toml or .json extension)",
                    path.display()
                ),
            )),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Toml => f.write_str("TOML"),
            ConfigFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Values for `{NAME}` placeholders, supplied by the caller.
///
/// # Examples
///
/// ```
/// use rust_logging_facility::config::Placeholders;
///
/// let placeholders = Placeholders::new().with("APPLICATION_DIR", "/opt/prewarning");
/// assert_eq!(
///     placeholders.substitute("{APPLICATION_DIR}/logs/prewarning.log").unwrap(),
///     "/opt/prewarning/logs/prewarning.log"
/// );
/// assert!(placeholders.substitute("{HOME}/x.log").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    values: BTreeMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// `APPLICATION_DIR` bound to `dir`
    pub fn application(dir: impl AsRef<Path>) -> Self {
        Self::new().with(APPLICATION_DIR, dir.as_ref().display().to_string())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replace every `{NAME}` in `text`; any unknown or malformed
    /// placeholder is an error
    pub fn substitute(&self, text: &str) -> std::result::Result<String, String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find('}')
                .ok_or_else(|| format!("unterminated placeholder in '{}'", text))?;
            let name = &after[..end];
            let value = self
                .get(name)
                .ok_or_else(|| format!("unresolved placeholder '{{{}}}'", name))?;
            out.push_str(value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn absolutize(path: &str) -> Result<String> {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        return Ok(path.display().to_string());
    }
    let cwd = std::env::current_dir().map_err(|e| {
        LoggerError::io_operation("resolve log path", "cannot read current directory", e)
    })?;
    Ok(cwd.join(path).display().to_string())
}

impl LoggingConfig {
    /// Resolve placeholders in every handler `filename` and make the
    /// results absolute
    pub fn resolve_placeholders(&mut self, placeholders: &Placeholders) -> Result<()> {
        for (name, handler) in self.handlers.iter_mut() {
            if let Some(filename) = handler.filename.as_mut() {
                let resolved = placeholders.substitute(filename).map_err(|message| {
                    LoggerError::config(format!("handlers.{}.filename", name), message)
                })?;
                *filename = absolutize(&resolved)?;
            }
        }
        Ok(())
    }
}

/// Parse a document without touching the filesystem.
///
/// Placeholders are not resolved; see [`LoggingConfig::resolve_placeholders`].
pub fn load_config_str(text: &str, format: ConfigFormat) -> Result<LoggingConfig> {
    match format {
        ConfigFormat::Toml => {
            toml::from_str(text).map_err(|e| LoggerError::config_parse("TOML", e.to_string()))
        }
        ConfigFormat::Json => serde_json::from_str(text)
            .map_err(|e| LoggerError::config_parse("JSON", e.to_string())),
    }
}

/// Read, parse and resolve a configuration file.
pub fn load_config(path: &Path, placeholders: &Placeholders) -> Result<LoggingConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| {
        LoggerError::config(
            "config file",
            format!("cannot read '{}': {}", path.display(), e),
        )
    })?;
    let mut config = load_config_str(&content, format)?;
    config.resolve_placeholders(placeholders)?;
    Ok(config)
}
