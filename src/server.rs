//! RelayServer actor implementation
//!
//! The single-writer task that owns the connection registry and the room
//! store. All mutation flows through one mpsc command channel, so events
//! from a single connection are applied in order and no locking is needed.
//! Outbound delivery happens after each command is fully applied, through
//! per-connection buffered channels that never block this task.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::logs::StatsEntry;
use crate::message::{ClientEvent, ServerEvent};
use crate::registry::ConnectionRegistry;
use crate::router::{self, Outbound};
use crate::store::{RoomStore, RoomSummary};
use crate::types::{ConnectionId, RoomId};

/// Commands sent from connection handlers (and observers) to the actor
#[derive(Debug)]
pub enum RelayCommand {
    /// New connection established
    Connect {
        conn_id: ConnectionId,
        sender: mpsc::Sender<ServerEvent>,
    },
    /// Connection closed
    Disconnect { conn_id: ConnectionId },
    /// Inbound event from a connection
    Inbound {
        conn_id: ConnectionId,
        event: ClientEvent,
    },
    /// Observability: snapshot of active rooms
    ListRooms {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },
    /// Observability: retained stats history for one room
    RoomStats {
        room_id: RoomId,
        reply: oneshot::Sender<Vec<StatsEntry>>,
    },
}

/// The relay actor
///
/// Owns all mutable state and processes commands one at a time.
pub struct RelayServer {
    registry: ConnectionRegistry,
    store: RoomStore,
    receiver: mpsc::Receiver<RelayCommand>,
}

impl RelayServer {
    /// Create a new RelayServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<RelayCommand>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            store: RoomStore::new(),
            receiver,
        }
    }

    /// Run the relay event loop
    ///
    /// Continuously receives and processes commands until all senders are
    /// dropped.
    pub async fn run(mut self) {
        info!("RelayServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("RelayServer shutting down");
    }

    fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect { conn_id, sender } => self.handle_connect(conn_id, sender),
            RelayCommand::Disconnect { conn_id } => self.handle_disconnect(conn_id),
            RelayCommand::Inbound { conn_id, event } => self.handle_inbound(conn_id, event),
            RelayCommand::ListRooms { reply } => {
                let _ = reply.send(self.store.list_rooms());
            }
            RelayCommand::RoomStats { room_id, reply } => {
                let _ = reply.send(self.store.stats_history(&room_id));
            }
        }
    }

    fn handle_connect(&mut self, conn_id: ConnectionId, sender: mpsc::Sender<ServerEvent>) {
        info!("Connection {} registered", conn_id);
        self.registry.register(conn_id, sender);
        self.deliver(Outbound::Unicast {
            to: conn_id,
            event: ServerEvent::Connected { sid: conn_id },
        });
        debug!(
            "Total connections: {}, total rooms: {}",
            self.registry.len(),
            self.store.room_count()
        );
    }

    fn handle_disconnect(&mut self, conn_id: ConnectionId) {
        // A disconnect for an id that owns no room and views none is valid
        // and must cause no side effects.
        if !self.registry.unregister(conn_id) {
            debug!("Disconnect for unknown connection {}", conn_id);
        }
        info!("Connection {} disconnected", conn_id);

        for outbound in router::disconnect(&mut self.store, conn_id) {
            self.deliver(outbound);
        }
        debug!(
            "Total connections: {}, total rooms: {}",
            self.registry.len(),
            self.store.room_count()
        );
    }

    fn handle_inbound(&mut self, conn_id: ConnectionId, event: ClientEvent) {
        // Sender liveness gate: events from ids the registry does not know
        // are dropped before they can touch room state.
        if !self.registry.contains(conn_id) {
            warn!("Dropping event from unknown connection {}", conn_id);
            return;
        }

        for outbound in router::route(&mut self.store, conn_id, event) {
            self.deliver(outbound);
        }
    }

    /// Hand one instruction to the addressed connection(s)
    ///
    /// Best-effort: an unknown target or a backed-up channel loses the
    /// event without affecting anyone else.
    fn deliver(&self, outbound: Outbound) {
        match outbound {
            Outbound::Unicast { to, event } => self.send_to(to, event),
            Outbound::Broadcast { to, event } => {
                for conn_id in to {
                    self.send_to(conn_id, event.clone());
                }
            }
        }
    }

    fn send_to(&self, conn_id: ConnectionId, event: ServerEvent) {
        let Some(conn) = self.registry.get(conn_id) else {
            debug!("Dropping event for unknown connection {}", conn_id);
            return;
        };
        if let Err(e) = conn.send(event) {
            warn!("Dropping event for connection {}: {}", conn_id, e);
        }
    }
}
