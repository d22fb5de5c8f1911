//! Formatter templates
//!
//! A template is literal text with `{attribute}` placeholders, optionally
//! padded with `{attribute:<8}` / `{attribute:>8}` / `{attribute:^8}` (a bare
//! width left-aligns). `{{` and `}}` produce literal braces.
//!
//! ```
//! use rust_logging_facility::core::{Formatter, LogRecord, Severity};
//!
//! let formatter = Formatter::new("simple", "{logger_name} - {level:<8}| {message}").unwrap();
//! let record = LogRecord::new("Sound", Severity::Error, "speaker missing");
//! assert_eq!(formatter.render(&record).unwrap(), "Sound - ERROR   | speaker missing");
//! ```

use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use super::timestamp::TimestampFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Record attributes a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Timestamp,
    ThreadName,
    ThreadId,
    LoggerName,
    Level,
    Message,
    Filename,
    FunctionName,
    LineNumber,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Timestamp,
        Attribute::ThreadName,
        Attribute::ThreadId,
        Attribute::LoggerName,
        Attribute::Level,
        Attribute::Message,
        Attribute::Filename,
        Attribute::FunctionName,
        Attribute::LineNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Timestamp => "timestamp",
            Attribute::ThreadName => "thread_name",
            Attribute::ThreadId => "thread_id",
            Attribute::LoggerName => "logger_name",
            Attribute::Level => "level",
            Attribute::Message => "message",
            Attribute::Filename => "filename",
            Attribute::FunctionName => "function_name",
            Attribute::LineNumber => "line_number",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Attribute::ALL
            .iter()
            .copied()
            .find(|attr| attr.as_str() == s)
            .ok_or_else(|| format!("unknown placeholder '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        attribute: Attribute,
        align: Align,
        width: usize,
    },
}

fn parse_spec(spec: &str) -> std::result::Result<(Align, usize), String> {
    let (align, digits) = match spec.chars().next() {
        Some('<') => (Align::Left, &spec[1..]),
        Some('>') => (Align::Right, &spec[1..]),
        Some('^') => (Align::Center, &spec[1..]),
        _ => (Align::Left, spec),
    };
    let width = digits
        .parse::<usize>()
        .map_err(|_| format!("invalid width specification '{}'", spec))?;
    Ok((align, width))
}

fn parse_template(template: &str) -> std::result::Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err("unmatched '}' (use '}}' for a literal brace)".to_string()),
            '{' => {
                let mut body = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    body.push(inner);
                }
                if !closed {
                    return Err(format!("unterminated placeholder '{{{}'", body));
                }
                let (name, spec) = match body.split_once(':') {
                    Some((name, spec)) => (name, Some(spec)),
                    None => (body.as_str(), None),
                };
                let attribute = name.trim().parse::<Attribute>()?;
                let (align, width) = match spec {
                    Some(spec) => parse_spec(spec.trim())?,
                    None => (Align::Left, 0),
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field {
                    attribute,
                    align,
                    width,
                });
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// A named, parsed template that renders records into single lines of text.
#[derive(Debug, Clone)]
pub struct Formatter {
    name: String,
    template: String,
    segments: Vec<Segment>,
    timestamp_format: TimestampFormat,
    utc: bool,
}

impl Formatter {
    /// Parse `template`, failing with a template error on unknown or
    /// malformed placeholders
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let template = template.into();
        let segments =
            parse_template(&template).map_err(|message| LoggerError::template(&name, message))?;
        Ok(Self {
            name,
            template,
            segments,
            timestamp_format: TimestampFormat::default(),
            utc: false,
        })
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Render timestamps in UTC instead of local time
    #[must_use]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Attributes referenced by the template, in order of appearance
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { attribute, .. } => Some(*attribute),
            Segment::Literal(_) => None,
        })
    }

    /// Render a record. Pure: the same record always yields the same text.
    pub fn render(&self, record: &LogRecord) -> Result<String> {
        self.render_styled(record, false)
    }

    /// Render with the severity field colourised for terminals; plain
    /// text when the `console` feature is off
    pub fn render_colored(&self, record: &LogRecord) -> Result<String> {
        self.render_styled(record, true)
    }

    fn render_styled(&self, record: &LogRecord, colorize: bool) -> Result<String> {
        let mut out = String::with_capacity(self.template.len() + record.message.len() + 32);

        for segment in &self.segments {
            let (attribute, align, width) = match segment {
                Segment::Literal(text) => {
                    out.push_str(text);
                    continue;
                }
                Segment::Field {
                    attribute,
                    align,
                    width,
                } => (*attribute, *align, *width),
            };

            let value = self.value_of(attribute, record)?;
            let padded = match align {
                Align::Left => format!("{:<width$}", value, width = width),
                Align::Right => format!("{:>width$}", value, width = width),
                Align::Center => format!("{:^width$}", value, width = width),
            };

            if colorize && attribute == Attribute::Level {
                out.push_str(&Self::colorize(&padded, record));
            } else {
                out.push_str(&padded);
            }
        }

        Ok(out)
    }

    #[cfg(feature = "console")]
    fn colorize(text: &str, record: &LogRecord) -> String {
        use colored::Colorize;
        text.color(record.level.color_code()).to_string()
    }

    #[cfg(not(feature = "console"))]
    fn colorize(text: &str, _record: &LogRecord) -> String {
        text.to_string()
    }

    fn value_of(&self, attribute: Attribute, record: &LogRecord) -> Result<String> {
        let missing = || {
            LoggerError::template(
                &self.name,
                format!("record has no '{}' attribute", attribute),
            )
        };

        let value = match attribute {
            Attribute::Timestamp => self.timestamp_format.format(&record.timestamp, self.utc),
            Attribute::ThreadName => record
                .thread_name
                .clone()
                .unwrap_or_else(|| "<unnamed>".to_string()),
            Attribute::ThreadId => record.thread_id.clone(),
            Attribute::LoggerName => record.logger_display_name().to_string(),
            Attribute::Level => record.level.to_str().to_string(),
            Attribute::Message => record.message.clone(),
            Attribute::Filename => {
                let file = record.file.as_deref().ok_or_else(missing)?;
                Path::new(file)
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(file)
                    .to_string()
            }
            Attribute::FunctionName => record.function.clone().ok_or_else(missing)?,
            Attribute::LineNumber => record.line.ok_or_else(missing)?.to_string(),
        };
        Ok(value)
    }
}
