//! Activity log (status notifier)
//!
//! One timestamped line per notable event, newest last.

use chrono::{DateTime, Local};

pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// Characters kept from a transcript body when mirrored into the log
pub const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub created_at: DateTime<Local>,
    pub text: String,
}

impl ActivityEntry {
    /// `[HH:MM:SS] text`
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.created_at.format("%H:%M:%S"), self.text)
    }
}

#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
    max_entries: usize,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Append one line
    pub fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(activity = %text);
        self.entries.push(ActivityEntry {
            created_at: Local::now(),
            text,
        });
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

/// First `PREVIEW_CHARS` characters, with `...` appended when cut
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview("hello"), "hello");
        let exact = "x".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(60);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_notify_appends_and_caps() {
        let mut log = ActivityLog::with_capacity(2);
        log.notify("one");
        log.notify("two");
        log.notify("three");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].text, "two");
        assert!(log.last().unwrap().formatted().ends_with("] three"));
    }
}
