//! Severity levels and logger level settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Severity::Debug => Blue,
            Severity::Info => Green,
            Severity::Warning => Yellow,
            Severity::Error => Red,
            Severity::Critical => BrightRed,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            "CRITICAL" | "FATAL" => Ok(Severity::Critical),
            _ => Err(format!("Invalid severity: '{}'", s)),
        }
    }
}

/// Level configured on a logger: either explicit or deferred to the ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LevelSetting {
    #[default]
    NotSet,
    Level(Severity),
}

impl LevelSetting {
    #[must_use]
    pub fn explicit(&self) -> Option<Severity> {
        match self {
            LevelSetting::NotSet => None,
            LevelSetting::Level(severity) => Some(*severity),
        }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self, LevelSetting::Level(_))
    }
}

impl From<Severity> for LevelSetting {
    fn from(severity: Severity) -> Self {
        LevelSetting::Level(severity)
    }
}

impl fmt::Display for LevelSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelSetting::NotSet => f.pad("NOTSET"),
            LevelSetting::Level(severity) => severity.fmt(f),
        }
    }
}

impl FromStr for LevelSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("NOTSET") {
            return Ok(LevelSetting::NotSet);
        }
        s.parse::<Severity>()
            .map(LevelSetting::Level)
            .map_err(|_| format!("Invalid level: '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("Warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("FATAL".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("verbose".parse::<Severity>().is_err());
        assert!("NOTSET".parse::<Severity>().is_err());
    }

    #[test]
    fn test_level_setting_parse() {
        assert_eq!("NOTSET".parse::<LevelSetting>().unwrap(), LevelSetting::NotSet);
        assert_eq!("notset".parse::<LevelSetting>().unwrap(), LevelSetting::NotSet);
        assert_eq!(
            "error".parse::<LevelSetting>().unwrap(),
            LevelSetting::Level(Severity::Error)
        );
        assert!("loud".parse::<LevelSetting>().is_err());
    }

    #[test]
    fn test_display_padding() {
        assert_eq!(format!("{:<8}|", Severity::Info), "INFO    |");
        assert_eq!(LevelSetting::NotSet.to_string(), "NOTSET");
        assert_eq!(LevelSetting::from(Severity::Debug).to_string(), "DEBUG");
    }
}
