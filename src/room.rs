//! Room struct definition
//!
//! A room has exactly one host (the creator, never reassigned) and a set
//! of viewers. Viewer membership is idempotent both ways: re-adding a
//! present viewer and removing an absent one are no-ops.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::logs::ChatLog;
use crate::types::{ConnectionId, RoomId};

/// A named streaming session
#[derive(Debug)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Room creator (host); set at creation, never reassigned
    pub host: ConnectionId,
    /// Joined viewers (uniqueness enforced, order not meaningful)
    viewers: HashSet<ConnectionId>,
    /// Whether the host has marked the stream live
    pub stream_active: bool,
    /// Room creation time
    pub created_at: DateTime<Utc>,
    /// Chat history for the room's lifetime
    pub chat: ChatLog,
}

impl Room {
    /// Create a new room with the given id and host
    pub fn new(id: RoomId, host: ConnectionId) -> Self {
        Self {
            id,
            host,
            viewers: HashSet::new(),
            stream_active: false,
            created_at: Utc::now(),
            chat: ChatLog::new(),
        }
    }

    /// Add a viewer; returns false if it was already present
    pub fn add_viewer(&mut self, viewer: ConnectionId) -> bool {
        self.viewers.insert(viewer)
    }

    /// Remove a viewer; returns false if it was not present
    pub fn remove_viewer(&mut self, viewer: ConnectionId) -> bool {
        self.viewers.remove(&viewer)
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Check whether a connection is the host or a viewer of this room
    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.host == conn || self.viewers.contains(&conn)
    }

    pub fn is_viewer(&self, conn: ConnectionId) -> bool {
        self.viewers.contains(&conn)
    }

    /// All members of the room: the host plus every viewer
    pub fn members(&self) -> Vec<ConnectionId> {
        let mut members = Vec::with_capacity(self.viewers.len() + 1);
        members.push(self.host);
        members.extend(self.viewers.iter().copied());
        members
    }

    /// All members except the given connection
    pub fn members_except(&self, excluded: ConnectionId) -> Vec<ConnectionId> {
        self.members()
            .into_iter()
            .filter(|&m| m != excluded)
            .collect()
    }

    /// Viewers only (used for host-teardown notification, where the host
    /// connection is already gone)
    pub fn viewers(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.viewers.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_creation() {
        let host = ConnectionId::new();
        let room = Room::new(RoomId::new("r1"), host);

        assert_eq!(room.id, RoomId::new("r1"));
        assert_eq!(room.host, host);
        assert_eq!(room.viewer_count(), 0);
        assert!(!room.stream_active);
        assert!(room.chat.is_empty());
    }

    #[test]
    fn test_add_viewer_idempotent() {
        let host = ConnectionId::new();
        let viewer = ConnectionId::new();
        let mut room = Room::new(RoomId::new("r1"), host);

        assert!(room.add_viewer(viewer));
        assert_eq!(room.viewer_count(), 1);

        // Second add is a no-op, not an error
        assert!(!room.add_viewer(viewer));
        assert_eq!(room.viewer_count(), 1);
    }

    #[test]
    fn test_remove_viewer_idempotent() {
        let host = ConnectionId::new();
        let viewer = ConnectionId::new();
        let mut room = Room::new(RoomId::new("r1"), host);
        room.add_viewer(viewer);

        assert!(room.remove_viewer(viewer));
        assert_eq!(room.viewer_count(), 0);
        assert!(!room.remove_viewer(viewer));
        assert_eq!(room.viewer_count(), 0);
    }

    #[test]
    fn test_contains_host_and_viewers() {
        let host = ConnectionId::new();
        let viewer = ConnectionId::new();
        let other = ConnectionId::new();
        let mut room = Room::new(RoomId::new("r1"), host);
        room.add_viewer(viewer);

        assert!(room.contains(host));
        assert!(room.contains(viewer));
        assert!(!room.contains(other));
        assert!(!room.is_viewer(host));
        assert!(room.is_viewer(viewer));
    }

    #[test]
    fn test_members_include_host() {
        let host = ConnectionId::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let mut room = Room::new(RoomId::new("r1"), host);
        room.add_viewer(a);
        room.add_viewer(b);

        let members = room.members();
        assert_eq!(members.len(), 3);
        assert!(members.contains(&host));
        assert!(members.contains(&a));
        assert!(members.contains(&b));

        let without_a = room.members_except(a);
        assert_eq!(without_a.len(), 2);
        assert!(!without_a.contains(&a));
    }
}
