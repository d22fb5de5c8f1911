//! Logging macros with `format!`-style arguments.
//!
//! Unlike the [`Logger`](crate::Logger) methods, the macros check the
//! effective level before formatting, and record the enclosing function's
//! name along with file and line.
//!
//! # Examples
//!
//! ```
//! use rust_logging_facility::{error, info, LoggingFacility};
//!
//! let facility = LoggingFacility::builder().last_resort(false).build_empty();
//! let sound = facility.logger("Sound");
//!
//! // Root is at WARNING: this is never formatted
//! info!(sound, "volume set to {}", 11);
//!
//! let path = "/opt/prewarning/sounds/start.wav";
//! error!(sound, "cannot open {}", path);
//! ```

/// Name of the enclosing function, without its module path.
///
/// ```
/// fn play_start_sound() -> &'static str {
///     rust_logging_facility::function_name!()
/// }
/// assert_eq!(play_start_sound(), "play_start_sound");
/// ```
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

/// Log at an explicit [`Severity`](crate::Severity).
///
/// ```
/// # use rust_logging_facility::{LoggingFacility, Severity};
/// # let facility = LoggingFacility::builder().last_resort(false).build_empty();
/// # let logger = facility.logger("Config");
/// use rust_logging_facility::log;
/// log!(logger, Severity::Warning, "unknown key '{}'", "colour");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled_for(level) {
            logger.log_at(
                level,
                format!($($arg)+),
                $crate::CallSite::new(file!(), line!(), $crate::function_name!()),
            );
        }
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use rust_logging_facility::LoggingFacility;
/// # let facility = LoggingFacility::builder().last_resort(false).build_empty();
/// # let logger = facility.logger("Validators");
/// use rust_logging_facility::warning;
/// warning!(logger, "{} competitors without a start time", 3);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Critical, $($arg)+)
    };
}
