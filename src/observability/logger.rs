//! Structured JSON logger
//!
//! One line per event, `event` key first, `severity` second, remaining
//! fields in alphabetical order. Every line goes to stderr; stdout carries
//! command output only. Writes are synchronous.

use std::fmt;
use std::io::{self, Write};

use super::events::Event;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-call detail, queries included
    Trace = 0,
    /// State transitions
    Info = 1,
    /// Rejected calls
    Warn = 2,
    /// Failures of the surrounding machinery
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// Parse a configured level name, case-insensitive
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Some(Severity::Trace),
            "info" => Some(Severity::Info),
            "warn" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Leveled logger. Cheap to copy, carried by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    min: Option<Severity>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl Logger {
    /// Logger emitting `min` and above
    pub fn new(min: Severity) -> Self {
        Self { min: Some(min) }
    }

    /// Logger that drops everything
    pub fn silent() -> Self {
        Self { min: None }
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        self.min.map_or(false, |min| severity >= min)
    }

    pub fn log(&self, severity: Severity, event: Event, fields: &[(&str, &str)]) {
        if !self.enabled(severity) {
            return;
        }
        let line = render(severity, event.as_str(), fields);
        // Logging must never fail the caller
        let _ = io::stderr().lock().write_all(line.as_bytes());
    }

    pub fn trace(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    pub fn info(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    pub fn warn(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    pub fn error(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }
}

/// Render one log line, trailing newline included
pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut sorted = fields.to_vec();
    sorted.sort_by_key(|(key, _)| *key);

    let mut line = String::with_capacity(64 + fields.len() * 24);
    line.push('{');
    push_pair(&mut line, "event", event);
    line.push(',');
    push_pair(&mut line, "severity", severity.as_str());
    for (key, value) in sorted {
        line.push(',');
        push_pair(&mut line, key, value);
    }
    line.push_str("}\n");
    line
}

fn push_pair(line: &mut String, key: &str, value: &str) {
    line.push_str(&quote(key));
    line.push(':');
    line.push_str(&quote(value));
}

fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_owned()).to_string()
}
