//! # Log Events
//!
//! The append-only, presentation-neutral log stream emitted by the audit
//! engine. Log events are never mutated or removed once emitted.

use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// Severity category of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Progress information.
    Info,
    /// Something the reviewer should notice.
    Warning,
    /// A blocking or failed condition.
    Error,
    /// A step completed favourably.
    Success,
}

impl Severity {
    /// The canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the audit log stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Name of the emitting component (e.g. "Orchestrator", "RiskScorer").
    pub source: String,
    /// Human-readable message.
    pub message: String,
    /// Severity category.
    pub severity: Severity,
    /// When the event was emitted.
    pub timestamp: Timestamp,
}

impl LogEvent {
    /// Create a log event stamped with the current time.
    pub fn new(source: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity,
            timestamp: Timestamp::now(),
        }
    }

    /// Shorthand for an `info` event.
    pub fn info(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, message, Severity::Info)
    }

    /// Shorthand for a `warning` event.
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, message, Severity::Warning)
    }

    /// Shorthand for an `error` event.
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, message, Severity::Error)
    }

    /// Shorthand for a `success` event.
    pub fn success(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, message, Severity::Success)
    }
}

impl std::fmt::Display for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {:<7} {}: {}",
            self.timestamp, self.severity, self.source, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_constructors_set_severity() {
        assert_eq!(LogEvent::info("a", "b").severity, Severity::Info);
        assert_eq!(LogEvent::warning("a", "b").severity, Severity::Warning);
        assert_eq!(LogEvent::error("a", "b").severity, Severity::Error);
        assert_eq!(LogEvent::success("a", "b").severity, Severity::Success);
    }

    #[test]
    fn display_includes_source_and_message() {
        let e = LogEvent::warning("SignalMonitor", "Signals detected: 2");
        let line = e.to_string();
        assert!(line.contains("warning"));
        assert!(line.contains("SignalMonitor: Signals detected: 2"));
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Success).unwrap(), "\"success\"");
    }
}
