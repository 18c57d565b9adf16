//! Append-only execution trace of a command invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One trace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Milestone {
        text: String,
        at: DateTime<Utc>,
    },
    Error {
        text: String,
        at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cause: Option<String>,
    },
}

impl LogEntry {
    pub fn milestone(text: impl Into<String>) -> Self {
        Self::Milestone {
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn error(text: impl Into<String>, cause: Option<String>) -> Self {
        Self::Error {
            text: text.into(),
            at: Utc::now(),
            cause,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Milestone { text, .. } | Self::Error { text, .. } => text,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Milestone { at, .. } | Self::Error { at, .. } => *at,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Ordered, append-only sequence of [`LogEntry`] values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
    #[serde(skip)]
    capacity: Option<usize>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log keeping at most `capacity` entries; the oldest are dropped first.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
        if let Some(cap) = self.capacity
            && self.entries.len() > cap
        {
            let drain_count = self.entries.len() - cap;
            self.entries.drain(..drain_count);
        }
    }

    pub fn milestone(&mut self, text: impl Into<String>) {
        self.push(LogEntry::milestone(text));
    }

    pub fn error(&mut self, text: impl Into<String>, cause: Option<String>) {
        self.push(LogEntry::error(text, cause));
    }

    /// Non-empty and the last entry is not an error.
    pub fn success(&self) -> bool {
        self.entries.last().is_some_and(|e| !e.is_error())
    }

    /// Text of the last entry, or `""` when empty.
    pub fn last_message(&self) -> &str {
        self.entries.last().map_or("", LogEntry::text)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_is_not_success() {
        let log = ExecutionLog::new();
        assert!(!log.success());
        assert_eq!(log.last_message(), "");
    }

    #[test]
    fn success_tracks_last_entry() {
        let mut log = ExecutionLog::new();
        log.milestone("started");
        assert!(log.success());

        log.error("broke", Some("boom".into()));
        assert!(!log.success());
        assert_eq!(log.last_message(), "broke");

        log.milestone("recovered");
        assert!(log.success());
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut log = ExecutionLog::with_capacity(Some(2));
        for i in 0..5 {
            log.milestone(format!("step {i}"));
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].text(), "step 3");
        assert_eq!(log.last_message(), "step 4");
    }

    #[test]
    fn entries_are_ordered_in_time() {
        let mut log = ExecutionLog::new();
        log.milestone("a");
        log.milestone("b");
        assert!(log.entries()[0].at() <= log.entries()[1].at());
    }

    #[test]
    fn entry_serde_shape() {
        let entry = LogEntry::error("failed", None);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["text"], "failed");
        assert!(json.get("cause").is_none());
    }
}
