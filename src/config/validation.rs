//! Configuration validation.
//!
//! Turns a deserialized [`LoggingConfig`] into a [`ValidatedConfig`] whose
//! values are typed and whose cross-references (handler to formatter, logger
//! to handler) are known to resolve. Every problem is collected before
//! failing, each tagged with its dotted path in the document.

use super::schema::{HandlerConfig, LoggingConfig, SCHEMA_VERSION};
use crate::core::error::{LoggerError, Result, ValidationError};
use crate::core::formatter::Formatter;
use crate::core::severity::{LevelSetting, Severity};
use crate::core::timestamp::TimestampFormat;
use crate::sinks::{ConsoleStream, RotationPolicy, RotationSchedule, RotationWhen};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// What a handler writes to.
#[derive(Debug, Clone)]
pub enum HandlerKind {
    Console {
        stream: ConsoleStream,
        colors: bool,
    },
    RotatingFile {
        path: PathBuf,
        policy: RotationPolicy,
    },
}

#[derive(Debug, Clone)]
pub struct HandlerPlan {
    pub level: Severity,
    pub formatter: String,
    pub kind: HandlerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerPlan {
    pub level: LevelSetting,
    pub handlers: Vec<String>,
    pub propagate: bool,
}

/// A configuration whose values parsed and whose references resolve.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub formatters: BTreeMap<String, Formatter>,
    pub handlers: BTreeMap<String, HandlerPlan>,
    pub loggers: BTreeMap<String, LoggerPlan>,
    /// Root level is always explicit here
    pub root: Option<LoggerPlan>,
}

/// Formatter and handler names already live in a running facility; a merge
/// may reference them without redefining them.
#[derive(Debug, Clone, Default)]
pub struct ExistingNames {
    pub formatters: BTreeSet<String>,
    pub handlers: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandlerClass {
    Console,
    RotatingFile,
}

/// Accepts the short names and the `logging.*` class paths found in older
/// documents
fn classify(class: &str) -> Option<HandlerClass> {
    let last = class.rsplit('.').next().unwrap_or(class).to_ascii_lowercase();
    match last.as_str() {
        "console" | "streamhandler" => Some(HandlerClass::Console),
        "rotatingfile" | "timedrotatingfilehandler" => Some(HandlerClass::RotatingFile),
        _ => None,
    }
}

fn is_valid_logger_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(|segment| !segment.trim().is_empty())
}

#[derive(Default)]
struct Collector {
    errors: Vec<ValidationError>,
}

impl Collector {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(path, message));
    }
}

/// Validate a standalone document
pub fn validate_config(config: &LoggingConfig) -> Result<ValidatedConfig> {
    validate_against(config, &ExistingNames::default())
}

/// Validate a document that may reference names from `existing`
pub fn validate_against(config: &LoggingConfig, existing: &ExistingNames) -> Result<ValidatedConfig> {
    let mut errors = Collector::default();

    if config.version != SCHEMA_VERSION {
        errors.push(
            "version",
            format!("unsupported version {} (expected {})", config.version, SCHEMA_VERSION),
        );
    }

    let formatters = validate_formatters(config, &mut errors);

    let known_formatters: BTreeSet<&str> = config
        .formatters
        .keys()
        .map(String::as_str)
        .chain(existing.formatters.iter().map(String::as_str))
        .collect();
    let handlers: BTreeMap<String, HandlerPlan> = config
        .handlers
        .iter()
        .filter_map(|(name, handler)| {
            validate_handler(name, handler, &known_formatters, &mut errors)
                .map(|plan| (name.clone(), plan))
        })
        .collect();

    let known_handlers: BTreeSet<&str> = config
        .handlers
        .keys()
        .map(String::as_str)
        .chain(existing.handlers.iter().map(String::as_str))
        .collect();

    let mut loggers = BTreeMap::new();
    for (name, logger) in &config.loggers {
        let path = format!("loggers.{}", name);
        if !is_valid_logger_name(name) {
            errors.push(&path, "logger names are non-empty dot-separated segments");
            continue;
        }
        let level = match logger.level.as_deref() {
            None => LevelSetting::NotSet,
            Some(level) => match level.parse::<LevelSetting>() {
                Ok(level) => level,
                Err(e) => {
                    errors.push(format!("{}.level", path), e);
                    continue;
                }
            },
        };
        check_handler_refs(&path, &logger.handlers, &known_handlers, &mut errors);
        loggers.insert(
            name.clone(),
            LoggerPlan {
                level,
                handlers: logger.handlers.clone(),
                propagate: logger.propagate,
            },
        );
    }

    let root = config.root.as_ref().and_then(|root| {
        let level = match root.level.as_deref() {
            None => Severity::Warning,
            Some(level) => match level.parse::<LevelSetting>() {
                Ok(LevelSetting::Level(level)) => level,
                Ok(LevelSetting::NotSet) => {
                    errors.push("root.level", "root logger level cannot be NOTSET");
                    return None;
                }
                Err(e) => {
                    errors.push("root.level", e);
                    return None;
                }
            },
        };
        check_handler_refs("root", &root.handlers, &known_handlers, &mut errors);
        Some(LoggerPlan {
            level: LevelSetting::Level(level),
            handlers: root.handlers.clone(),
            propagate: true,
        })
    });

    if !errors.errors.is_empty() {
        return Err(LoggerError::Validation(errors.errors));
    }

    Ok(ValidatedConfig {
        formatters,
        handlers,
        loggers,
        root,
    })
}

fn validate_formatters(
    config: &LoggingConfig,
    errors: &mut Collector,
) -> BTreeMap<String, Formatter> {
    let mut formatters = BTreeMap::new();
    for (name, formatter) in &config.formatters {
        let path = format!("formatters.{}", name);
        let parsed = match Formatter::new(name, &formatter.format) {
            Ok(parsed) => parsed,
            Err(LoggerError::Template { message, .. }) => {
                errors.push(format!("{}.format", path), message);
                continue;
            }
            Err(e) => {
                errors.push(format!("{}.format", path), e.to_string());
                continue;
            }
        };
        let parsed = match formatter.datefmt.as_deref() {
            None => parsed,
            Some(datefmt) => match TimestampFormat::from_config(datefmt) {
                Ok(format) => parsed.with_timestamp_format(format),
                Err(e) => {
                    errors.push(format!("{}.datefmt", path), e);
                    continue;
                }
            },
        };
        formatters.insert(name.clone(), parsed.with_utc(formatter.utc));
    }
    formatters
}

fn check_handler_refs(
    path: &str,
    handlers: &[String],
    known: &BTreeSet<&str>,
    errors: &mut Collector,
) {
    let mut seen = BTreeSet::new();
    for handler in handlers {
        if !known.contains(handler.as_str()) {
            errors.push(
                format!("{}.handlers", path),
                format!("unknown handler '{}'", handler),
            );
        } else if !seen.insert(handler.as_str()) {
            errors.push(
                format!("{}.handlers", path),
                format!("handler '{}' listed twice", handler),
            );
        }
    }
}

fn validate_handler(
    name: &str,
    handler: &HandlerConfig,
    known_formatters: &BTreeSet<&str>,
    errors: &mut Collector,
) -> Option<HandlerPlan> {
    let path = format!("handlers.{}", name);
    let before = errors.errors.len();

    let level = match handler.level.as_deref() {
        None => Some(Severity::Debug),
        // A NOTSET handler lets everything through
        Some(level) => match level.parse::<LevelSetting>() {
            Ok(level) => Some(level.explicit().unwrap_or(Severity::Debug)),
            Err(e) => {
                errors.push(format!("{}.level", path), e);
                None
            }
        },
    };

    if !known_formatters.contains(handler.formatter.as_str()) {
        errors.push(
            format!("{}.formatter", path),
            format!("unknown formatter '{}'", handler.formatter),
        );
    }

    let kind = match classify(&handler.class) {
        None => {
            errors.push(
                format!("{}.class", path),
                format!(
                    "unknown handler class '{}' (expected Console or RotatingFile)",
                    handler.class
                ),
            );
            None
        }
        Some(HandlerClass::Console) => console_kind(&path, handler, errors),
        Some(HandlerClass::RotatingFile) => rotating_kind(&path, handler, errors),
    };

    if errors.errors.len() != before {
        return None;
    }
    Some(HandlerPlan {
        level: level?,
        formatter: handler.formatter.clone(),
        kind: kind?,
    })
}

fn console_kind(path: &str, handler: &HandlerConfig, errors: &mut Collector) -> Option<HandlerKind> {
    let file_only = [
        ("filename", handler.filename.is_some()),
        ("when", handler.when.is_some()),
        ("interval", handler.interval.is_some()),
        ("backup_count", handler.backup_count.is_some()),
        ("max_bytes", handler.max_bytes.is_some()),
        ("utc", handler.utc),
        ("compress", handler.compress),
    ];
    for (key, present) in file_only {
        if present {
            errors.push(
                format!("{}.{}", path, key),
                "only valid for RotatingFile handlers",
            );
        }
    }

    let stream = match handler.stream.as_deref() {
        None => ConsoleStream::default(),
        Some(stream) => match stream.parse::<ConsoleStream>() {
            Ok(stream) => stream,
            Err(e) => {
                errors.push(format!("{}.stream", path), e);
                return None;
            }
        },
    };
    Some(HandlerKind::Console {
        stream,
        colors: handler.colors,
    })
}

fn rotating_kind(
    path: &str,
    handler: &HandlerConfig,
    errors: &mut Collector,
) -> Option<HandlerKind> {
    if handler.stream.is_some() {
        errors.push(format!("{}.stream", path), "only valid for Console handlers");
    }
    if handler.colors {
        errors.push(format!("{}.colors", path), "only valid for Console handlers");
    }

    let filename = match handler.filename.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(format!("{}.filename", path), "required for RotatingFile handlers");
            None
        }
        Some(filename) if filename.contains('{') => {
            errors.push(
                format!("{}.filename", path),
                format!("unresolved placeholder in '{}'", filename),
            );
            None
        }
        Some(filename) => Some(PathBuf::from(filename)),
    };

    let when = match handler.when.as_deref() {
        None => Some(RotationWhen::default()),
        Some(when) => match when.parse::<RotationWhen>() {
            Ok(when) => Some(when),
            Err(e) => {
                errors.push(format!("{}.when", path), e);
                None
            }
        },
    };

    let schedule = when.and_then(|when| {
        match RotationSchedule::new(when, handler.interval.unwrap_or(1)) {
            Ok(schedule) => Some(schedule.with_utc(handler.utc)),
            Err(e) => {
                errors.push(format!("{}.interval", path), e);
                None
            }
        }
    });

    let mut policy = RotationPolicy::new(schedule?)
        .with_backup_count(handler.backup_count.unwrap_or(0))
        .with_compression(handler.compress);
    if let Some(max_bytes) = handler.max_bytes {
        policy = policy.with_max_bytes(max_bytes);
    }

    Some(HandlerKind::RotatingFile {
        path: filename?,
        policy,
    })
}
