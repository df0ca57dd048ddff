//! Wire protocol definitions
//!
//! JSON-based bidirectional event protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. Field names are the wire
//! contract shared with browser clients and must not be renamed.
//!
//! Negotiation payloads (`offer`, `answer`, `candidate`, `stats`, ping
//! `timestamp`) are opaque to the relay and carried as `serde_json::Value`
//! so they round-trip unmodified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ConnectionId, RoomId};

fn anonymous() -> String {
    "Anonymous".to_string()
}

/// Client → Server event
///
/// One JSON object per WebSocket text frame, event name in the `type` field.
/// Unknown event types and frames missing required fields fail to parse and
/// are dropped by the handler.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Establish a new room; the sender becomes its host
    CreateRoom { room_id: RoomId },
    /// Join an existing room as a viewer
    JoinRoom {
        room_id: RoomId,
        #[serde(default = "anonymous")]
        username: String,
    },
    /// Host marks the stream live
    StartStream { room_id: RoomId },
    /// Host marks the stream stopped
    StopStream { room_id: RoomId },
    /// SDP offer relayed to a specific connection
    Offer { target_id: ConnectionId, offer: Value },
    /// SDP answer relayed to a specific connection
    Answer { target_id: ConnectionId, answer: Value },
    /// ICE candidate relayed to a specific connection
    IceCandidate {
        target_id: ConnectionId,
        candidate: Value,
    },
    /// Chat message for everyone in a room
    ChatMessage {
        room_id: RoomId,
        message: String,
        #[serde(default = "anonymous")]
        username: String,
    },
    /// Latency probe; the timestamp is echoed back verbatim
    LatencyPing { timestamp: Value },
    /// Telemetry sample appended to the room's stats history
    StreamStats { room_id: RoomId, stats: Value },
}

/// Server → Client event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Connection accepted, id issued
    Connected { sid: ConnectionId },
    /// Room created, sent to the new host only
    RoomCreated {
        room_id: RoomId,
        host_id: ConnectionId,
    },
    /// Join succeeded, sent to the joiner only
    RoomJoined {
        room_id: RoomId,
        viewer_count: usize,
        username: String,
    },
    /// A new viewer arrived, sent to the other room members
    ViewerJoined {
        viewer_id: ConnectionId,
        username: String,
        viewer_count: usize,
    },
    /// A viewer disconnected, sent to the remaining members
    ViewerLeft {
        viewer_id: ConnectionId,
        viewer_count: usize,
    },
    /// Stream went live
    StreamStarted { room_id: RoomId },
    /// Stream stopped (room stays up)
    StreamStopped { room_id: RoomId },
    /// Host disconnected; the room is gone
    StreamEnded { message: String },
    /// Relayed SDP offer with sender identity injected
    Offer {
        offer: Value,
        sender_id: ConnectionId,
    },
    /// Relayed SDP answer with sender identity injected
    Answer {
        answer: Value,
        sender_id: ConnectionId,
    },
    /// Relayed ICE candidate with sender identity injected
    IceCandidate {
        candidate: Value,
        sender_id: ConnectionId,
    },
    /// Chat message fan-out (includes the sender)
    ChatMessage {
        username: String,
        message: String,
        timestamp: String,
    },
    /// Latency probe response
    LatencyPong {
        timestamp: Value,
        server_time: i64,
    },
    /// Non-fatal error surfaced to the requesting connection
    Error { message: String },
}
