//! Connection registry
//!
//! Tracks which connection ids are live and holds each connection's
//! outbound channel. Liveness only; room membership lives in the store.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::ServerEvent;
use crate::types::ConnectionId;

/// A live connection's outbound handle
///
/// Sends never block the relay actor: a full buffer means the event is
/// dropped for that connection rather than stalling room mutations.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Relay → connection event channel (drained by the write task)
    sender: mpsc::Sender<ServerEvent>,
}

impl Connection {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self { id, sender }
    }

    /// Queue an event for this connection
    pub fn send(&self, event: ServerEvent) -> Result<(), SendError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}

/// Map of live connections
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection at connect time
    pub fn register(&mut self, id: ConnectionId, sender: mpsc::Sender<ServerEvent>) {
        self.connections.insert(id, Connection::new(id, sender));
    }

    /// Remove a connection; returns whether the id was known
    ///
    /// Unregistering an unknown id is valid and has no side effects.
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
