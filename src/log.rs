use std::collections::VecDeque;

use chrono::Local;

use crate::command::CommandKind;

/// Entries beyond this are evicted, oldest first.
pub const LOG_CAPACITY: usize = 10;

/// One successfully dispatched command. Never mutated after insertion.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub id: u64,
    /// Local clock time of the dispatch.
    pub timestamp: String,
    pub kind: CommandKind,
    pub description: String,
}

/// Bounded most-recent-first history of dispatched commands, for operator
/// visibility only. Not persisted.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: VecDeque<LogEntry>,
    next_id: u64,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: CommandKind, description: String) {
        let entry = LogEntry {
            id: self.next_id,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            kind,
            description,
        };
        self.next_id += 1;
        self.entries.push_front(entry);
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
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
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_newest_first() {
        let mut log = CommandLog::new();
        log.push(CommandKind::Access, "first".into());
        log.push(CommandKind::Light, "second".into());

        let descriptions: Vec<&str> = log.entries().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["second", "first"]);
        assert_eq!(log.latest().unwrap().kind, CommandKind::Light);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut log = CommandLog::new();
        for i in 0..15 {
            log.push(CommandKind::Control, format!("command {i}"));
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        // The first five inserts are gone; newest first.
        let descriptions: Vec<String> = log.entries().map(|e| e.description.clone()).collect();
        assert_eq!(descriptions[0], "command 14");
        assert_eq!(descriptions[9], "command 5");
    }

    #[test]
    fn ids_keep_growing_across_evictions() {
        let mut log = CommandLog::new();
        for i in 0..12 {
            log.push(CommandKind::Global, format!("command {i}"));
        }
        assert_eq!(log.latest().unwrap().id, 11);
    }
}
