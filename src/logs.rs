//! Bounded per-room append logs
//!
//! `ChatLog` and `StatsLog` keep the most recent N entries with a strict
//! FIFO trim: appending beyond the cap evicts the oldest entry first.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;

/// Chat history retention per room
pub const CHAT_RETENTION: usize = 1000;

/// Stats history retention per room
pub const STATS_RETENTION: usize = 100;

/// A single chat message as broadcast to the room
#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub username: String,
    pub message: String,
    /// Wall-clock HH:MM:SS at append time
    pub timestamp: String,
}

/// A single telemetry sample
#[derive(Debug, Clone, Serialize)]
pub struct StatsEntry {
    /// ISO-8601 server time at append time
    pub timestamp: String,
    /// Opaque client-supplied payload
    pub stats: Value,
}

/// Ordered chat history, capped at [`CHAT_RETENTION`] entries
#[derive(Debug, Default)]
pub struct ChatLog {
    entries: VecDeque<ChatEntry>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest if over capacity
    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > CHAT_RETENTION {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first iteration over retained entries
    pub fn iter(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter()
    }
}

/// Ordered telemetry history, capped at [`STATS_RETENTION`] entries
#[derive(Debug, Default)]
pub struct StatsLog {
    entries: VecDeque<StatsEntry>,
}

impl StatsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest if over capacity
    pub fn push(&mut self, entry: StatsEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > STATS_RETENTION {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first iteration over retained entries
    pub fn iter(&self) -> impl Iterator<Item = &StatsEntry> {
        self.entries.iter()
    }

    /// Snapshot of the retained history, oldest first
    pub fn to_vec(&self) -> Vec<StatsEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stat(n: u64) -> StatsEntry {
        StatsEntry {
            timestamp: format!("2026-08-23T00:00:{:02}Z", n % 60),
            stats: json!({ "seq": n }),
        }
    }

    #[test]
    fn test_stats_log_trims_to_last_100() {
        let mut log = StatsLog::new();
        for n in 0..150 {
            log.push(stat(n));
        }
        assert_eq!(log.len(), 100);

        // The oldest 50 are gone; the survivors are 50..150 in insertion order
        let seqs: Vec<u64> = log
            .iter()
            .map(|e| e.stats["seq"].as_u64().unwrap())
            .collect();
        let expected: Vec<u64> = (50..150).collect();
        assert_eq!(seqs, expected);
    }

    #[test]
    fn test_stats_log_under_cap_keeps_everything() {
        let mut log = StatsLog::new();
        for n in 0..42 {
            log.push(stat(n));
        }
        assert_eq!(log.len(), 42);
        assert_eq!(log.iter().next().unwrap().stats["seq"], 0);
    }

    #[test]
    fn test_chat_log_preserves_order() {
        let mut log = ChatLog::new();
        for n in 0..5 {
            log.push(ChatEntry {
                username: "Host".to_string(),
                message: format!("msg {n}"),
                timestamp: "12:00:00".to_string(),
            });
        }
        let messages: Vec<&str> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["msg 0", "msg 1", "msg 2", "msg 3", "msg 4"]);
    }

    #[test]
    fn test_chat_log_trims_oldest() {
        let mut log = ChatLog::new();
        for n in 0..(CHAT_RETENTION + 10) {
            log.push(ChatEntry {
                username: "Host".to_string(),
                message: format!("msg {n}"),
                timestamp: "12:00:00".to_string(),
            });
        }
        assert_eq!(log.len(), CHAT_RETENTION);
        assert_eq!(log.iter().next().unwrap().message, "msg 10");
    }
}
