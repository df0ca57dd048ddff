//! In-memory room store
//!
//! The single authoritative table of active rooms, plus the per-room stats
//! history. Nothing else in the crate holds room state; all mutation goes
//! through this type from the relay actor's task.
//!
//! The stats table is keyed independently of the room table: a
//! `stream_stats` event creates its entry lazily even when no room with
//! that id exists. Deleting a room drops both the room and its stats.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::logs::{StatsEntry, StatsLog};
use crate::room::Room;
use crate::types::{ConnectionId, RoomId};

/// One row of the observability listing
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub viewer_count: usize,
    pub stream_active: bool,
    /// ISO-8601 creation time
    pub created_at: String,
}

/// Owner of all room state
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
    stats: HashMap<RoomId, StatsLog>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new room with the given host
    ///
    /// Duplicate ids are rejected; the existing room is left untouched.
    pub fn create_room(
        &mut self,
        room_id: RoomId,
        host: ConnectionId,
    ) -> Result<&Room, StoreError> {
        if self.rooms.contains_key(&room_id) {
            return Err(StoreError::RoomAlreadyExists(room_id));
        }
        let room = Room::new(room_id.clone(), host);
        Ok(self.rooms.entry(room_id).or_insert(room))
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Add a viewer to a room, returning the resulting viewer count
    ///
    /// Adding an already-present viewer is a no-op, not an error.
    pub fn add_viewer(
        &mut self,
        room_id: &RoomId,
        viewer: ConnectionId,
    ) -> Result<usize, StoreError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| StoreError::RoomNotFound(room_id.clone()))?;
        room.add_viewer(viewer);
        Ok(room.viewer_count())
    }

    /// Remove a viewer; no-op if the room or viewer is absent
    ///
    /// Returns the resulting viewer count when an actual removal happened.
    pub fn remove_viewer(&mut self, room_id: &RoomId, viewer: ConnectionId) -> Option<usize> {
        let room = self.rooms.get_mut(room_id)?;
        if room.remove_viewer(viewer) {
            Some(room.viewer_count())
        } else {
            None
        }
    }

    /// Remove a room and all its logs
    pub fn delete_room(&mut self, room_id: &RoomId) -> Option<Room> {
        self.stats.remove(room_id);
        let room = self.rooms.remove(room_id);
        if room.is_some() {
            debug!("Room {} deleted", room_id);
        }
        room
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Iterate over active rooms; order is not meaningful
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Observability listing of active rooms; order is not meaningful
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms
            .values()
            .map(|room| RoomSummary {
                room_id: room.id.clone(),
                viewer_count: room.viewer_count(),
                stream_active: room.stream_active,
                created_at: room
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            })
            .collect()
    }

    /// Append a telemetry sample, creating the room's stats entry lazily
    pub fn append_stats(&mut self, room_id: RoomId, stats: Value) {
        let entry = StatsEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            stats,
        };
        self.stats.entry(room_id).or_default().push(entry);
    }

    /// Retained stats history for a room, oldest first (empty if none)
    pub fn stats_history(&self, room_id: &RoomId) -> Vec<StatsEntry> {
        self.stats
            .get(room_id)
            .map(StatsLog::to_vec)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_and_get_room() {
        let mut store = RoomStore::new();
        let host = ConnectionId::new();
        let room = store.create_room(RoomId::new("r1"), host).unwrap();
        assert_eq!(room.host, host);

        assert!(store.get(&RoomId::new("r1")).is_some());
        assert!(store.get(&RoomId::new("nope")).is_none());
    }

    #[test]
    fn test_duplicate_create_rejected_without_mutation() {
        let mut store = RoomStore::new();
        let first_host = ConnectionId::new();
        let second_host = ConnectionId::new();
        store.create_room(RoomId::new("r1"), first_host).unwrap();
        store
            .add_viewer(&RoomId::new("r1"), ConnectionId::new())
            .unwrap();

        let err = store
            .create_room(RoomId::new("r1"), second_host)
            .unwrap_err();
        assert_eq!(err, StoreError::RoomAlreadyExists(RoomId::new("r1")));

        // The original room survives intact
        let room = store.get(&RoomId::new("r1")).unwrap();
        assert_eq!(room.host, first_host);
        assert_eq!(room.viewer_count(), 1);
    }

    #[test]
    fn test_add_viewer_missing_room() {
        let mut store = RoomStore::new();
        let err = store
            .add_viewer(&RoomId::new("ghost"), ConnectionId::new())
            .unwrap_err();
        assert_eq!(err, StoreError::RoomNotFound(RoomId::new("ghost")));
    }

    #[test]
    fn test_add_viewer_counts() {
        let mut store = RoomStore::new();
        let room_id = RoomId::new("r1");
        store.create_room(room_id.clone(), ConnectionId::new()).unwrap();

        let viewer = ConnectionId::new();
        assert_eq!(store.add_viewer(&room_id, viewer).unwrap(), 1);
        // Idempotent re-add keeps the count
        assert_eq!(store.add_viewer(&room_id, viewer).unwrap(), 1);
        assert_eq!(store.add_viewer(&room_id, ConnectionId::new()).unwrap(), 2);
    }

    #[test]
    fn test_remove_viewer_noop_when_absent() {
        let mut store = RoomStore::new();
        let room_id = RoomId::new("r1");
        store.create_room(room_id.clone(), ConnectionId::new()).unwrap();

        let viewer = ConnectionId::new();
        assert!(store.remove_viewer(&room_id, viewer).is_none());
        assert!(store.remove_viewer(&RoomId::new("ghost"), viewer).is_none());

        store.add_viewer(&room_id, viewer).unwrap();
        assert_eq!(store.remove_viewer(&room_id, viewer), Some(0));
        assert!(store.remove_viewer(&room_id, viewer).is_none());
    }

    #[test]
    fn test_delete_room_drops_stats() {
        let mut store = RoomStore::new();
        let room_id = RoomId::new("r1");
        store.create_room(room_id.clone(), ConnectionId::new()).unwrap();
        store.append_stats(room_id.clone(), json!({"fps": 30}));
        assert_eq!(store.stats_history(&room_id).len(), 1);

        assert!(store.delete_room(&room_id).is_some());
        assert!(store.get(&room_id).is_none());
        assert!(store.stats_history(&room_id).is_empty());

        // Deleting again is a no-op
        assert!(store.delete_room(&room_id).is_none());
    }

    #[test]
    fn test_stats_lazy_room_entry() {
        let mut store = RoomStore::new();
        // No room named "phantom" exists; stats still accumulate
        store.append_stats(RoomId::new("phantom"), json!({"fps": 24}));
        assert_eq!(store.stats_history(&RoomId::new("phantom")).len(), 1);
        assert!(store.get(&RoomId::new("phantom")).is_none());
    }

    #[test]
    fn test_list_rooms_summary() {
        let mut store = RoomStore::new();
        let host = ConnectionId::new();
        store.create_room(RoomId::new("r1"), host).unwrap();
        store.add_viewer(&RoomId::new("r1"), ConnectionId::new()).unwrap();
        store.get_mut(&RoomId::new("r1")).unwrap().stream_active = true;
        store.create_room(RoomId::new("r2"), ConnectionId::new()).unwrap();

        let mut listing = store.list_rooms();
        assert_eq!(listing.len(), 2);
        // Order is unspecified; sort before asserting
        listing.sort_by(|a, b| a.room_id.0.cmp(&b.room_id.0));
        assert_eq!(listing[0].room_id, RoomId::new("r1"));
        assert_eq!(listing[0].viewer_count, 1);
        assert!(listing[0].stream_active);
        assert_eq!(listing[1].viewer_count, 0);
        assert!(!listing[1].stream_active);
    }
}
