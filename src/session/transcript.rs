//! Command-session transcript
//!
//! Ordered, append-only record of rendered channel messages. Entries are
//! immutable once appended; the only bulk operation is `clear`.

use chrono::{DateTime, Local};
use std::fmt;

use crate::session::envelope::SYSTEM_ORIGIN;

/// Default retention (oldest entries are dropped past this)
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Transcript entry category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    System,
    CommandSent,
    CommandReceived,
    CommandResponse,
    SystemBroadcast,
    Error,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::System => "system",
            Category::CommandSent => "command_sent",
            Category::CommandReceived => "command_received",
            Category::CommandResponse => "command_response",
            Category::SystemBroadcast => "system_broadcast",
            Category::Error => "error",
        }
    }

    /// Categories mirrored into the activity log
    pub fn is_notable(&self) -> bool {
        matches!(
            self,
            Category::System | Category::Error | Category::SystemBroadcast
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub category: Category,
    pub origin_id: String,
    pub body: String,
    pub created_at: DateTime<Local>,
}

impl TranscriptEntry {
    pub fn new(category: Category, body: impl Into<String>, origin_id: impl Into<String>) -> Self {
        Self {
            category,
            origin_id: origin_id.into(),
            body: body.into(),
            created_at: Local::now(),
        }
    }

    /// Body split on embedded line breaks
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.body.split('\n').map(|line| line.trim_end_matches('\r'))
    }
}

/// Author label resolved at render time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayLabel {
    System,
    You,
    Peer(String),
}

impl DisplayLabel {
    /// Resolve an origin against the session's current identity
    pub fn resolve(origin_id: &str, identity: Option<&str>) -> DisplayLabel {
        if origin_id == SYSTEM_ORIGIN {
            DisplayLabel::System
        } else if identity == Some(origin_id) {
            DisplayLabel::You
        } else {
            DisplayLabel::Peer(origin_id.to_string())
        }
    }
}

impl fmt::Display for DisplayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayLabel::System => f.write_str("System"),
            DisplayLabel::You => f.write_str("You"),
            DisplayLabel::Peer(id) => f.write_str(id),
        }
    }
}

/// Transcript store rendered by the UI
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    max_entries: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Append one entry, dropping the oldest once over capacity
    pub fn append(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_resolution() {
        assert_eq!(
            DisplayLabel::resolve("u42", Some("u42")),
            DisplayLabel::You
        );
        assert_eq!(
            DisplayLabel::resolve("system", Some("u42")),
            DisplayLabel::System
        );
        assert_eq!(
            DisplayLabel::resolve("user_9f", Some("u42")),
            DisplayLabel::Peer("user_9f".to_string())
        );
        // No identity yet: nobody is "you"
        assert_eq!(
            DisplayLabel::resolve("u42", None),
            DisplayLabel::Peer("u42".to_string())
        );
    }

    #[test]
    fn test_body_lines_split_on_breaks() {
        let entry = TranscriptEntry::new(Category::CommandResponse, "a\r\nb\nc", "system");
        let lines: Vec<_> = entry.body_lines().collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut transcript = Transcript::with_capacity(3);
        for i in 0..5 {
            transcript.append(TranscriptEntry::new(Category::System, i.to_string(), "system"));
        }
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.entries()[0].body, "2");
        assert_eq!(transcript.last().unwrap().body, "4");
    }

    #[test]
    fn test_clear() {
        let mut transcript = Transcript::new();
        transcript.append(TranscriptEntry::new(Category::Error, "x", "system"));
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
