//! Error types for the relay
//!
//! Defines transport-level errors, room-store errors, and outbound send
//! errors. Uses thiserror for ergonomic error definitions. No error here
//! is fatal to the process; a single connection's misbehavior must never
//! affect other rooms or connections.

use thiserror::Error;

use crate::message::ServerEvent;
use crate::types::RoomId;

/// Transport and plumbing errors for a single connection
///
/// These terminate the affected connection's handler, nothing else.
#[derive(Debug, Error)]
pub enum RelayError {
    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command channel to the relay actor is closed
    #[error("Channel send error")]
    ChannelSend,
}

/// Room-store errors, surfaced to the requesting connection as an
/// `error` event (non-fatal, connection stays open)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Operation referenced a room id with no active room
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// `create_room` with an id already in use
    #[error("Room already exists: {0}")]
    RoomAlreadyExists(RoomId),
}

/// Convert a StoreError to the wire-level `error` event
///
/// Message strings are part of the client contract ("Room not found" is
/// matched verbatim by existing clients).
impl From<StoreError> for ServerEvent {
    fn from(err: StoreError) -> Self {
        let message = match err {
            StoreError::RoomNotFound(_) => "Room not found".to_string(),
            StoreError::RoomAlreadyExists(_) => "Room already exists".to_string(),
        };
        ServerEvent::Error { message }
    }
}

/// Outbound delivery errors
///
/// Delivery is best-effort: a closed or backed-up connection loses the
/// event, the relay keeps going.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The connection's outbound buffer is full
    #[error("Channel full")]
    ChannelFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_not_found_wire_message() {
        let event: ServerEvent = StoreError::RoomNotFound(RoomId::new("r1")).into();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"message\":\"Room not found\""));
    }
}
