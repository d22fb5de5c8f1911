//! The stock application configuration

use super::schema::{FormatterConfig, HandlerConfig, LoggerConfig, LoggingConfig, RootConfig};
use std::path::Path;

pub const SIMPLE_FORMAT: &str = "{timestamp} - {logger_name} - {level} - {message}";
pub const THREAD_FORMAT: &str =
    "{timestamp} - {thread_name}({thread_id}) - {logger_name} - {level} - {message}";
pub const DETAIL_FORMAT: &str = "{timestamp} - {thread_name}({thread_id}) - {level} - \
                                 {filename} - {function_name} - {line_number} - {message}";

/// Subsystem loggers of the application; all defer to the root
pub const APPLICATION_LOGGERS: [&str; 9] = [
    "PreWarning",
    "Config",
    "Sound",
    "OlaMySql",
    "PunchSourceOlaMySql",
    "PunchSourceOlresultatSe",
    "StartListSourceFile",
    "StartListSourceOlaMySql",
    "Validators",
];

impl LoggingConfig {
    /// The application's configuration: a stdout console handler and a
    /// file handler rotating every midnight under `<app_dir>/logs/`, with
    /// only the file handler bound to the root at WARNING.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_logging_facility::config::LoggingConfig;
    ///
    /// let config = LoggingConfig::application_default("/opt/prewarning");
    /// assert_eq!(config.root.unwrap().handlers, vec!["file"]);
    /// assert_eq!(config.loggers.len(), 9);
    /// ```
    pub fn application_default(app_dir: impl AsRef<Path>) -> Self {
        let mut config = LoggingConfig::default();

        config
            .formatters
            .insert("simple".into(), FormatterConfig::new(SIMPLE_FORMAT));
        config
            .formatters
            .insert("thread".into(), FormatterConfig::new(THREAD_FORMAT));
        config
            .formatters
            .insert("detail".into(), FormatterConfig::new(DETAIL_FORMAT));

        config.handlers.insert(
            "console".into(),
            HandlerConfig::console("simple", "stdout").with_level("DEBUG"),
        );
        let filename = app_dir.as_ref().join("logs").join("prewarning.log");
        config.handlers.insert(
            "file".into(),
            HandlerConfig::rotating_file("thread", filename.display().to_string(), "MIDNIGHT", 1)
                .with_level("DEBUG"),
        );

        for name in APPLICATION_LOGGERS {
            config.loggers.insert(name.into(), LoggerConfig::not_set());
        }

        config.root = Some(RootConfig {
            level: Some("WARNING".into()),
            handlers: vec!["file".into()],
        });
        config
    }
}
