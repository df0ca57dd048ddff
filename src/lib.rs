//! Signaling and session-coordination relay for peer-to-peer video streaming
//!
//! A host establishes a named room, viewers discover and join it, and the
//! relay forwards connection-negotiation messages (offers, answers, ICE
//! candidates) plus chat and telemetry events between them over persistent
//! WebSocket connections. Media never touches this process; the peers
//! negotiate and carry it directly.
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RelayServer` is the single-writer actor owning all room state
//! - Each connection has a `handler` task communicating with the relay
//! - Routing is pure: `router::route` turns one inbound event into an
//!   explicit list of outbound instructions, delivered afterwards
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use stream_relay::{handle_connection, RelayServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(RelayServer::new(cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod error;
pub mod handler;
pub mod logs;
pub mod message;
pub mod registry;
pub mod room;
pub mod router;
pub mod server;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use error::{RelayError, SendError, StoreError};
pub use handler::handle_connection;
pub use logs::{ChatEntry, ChatLog, StatsEntry, StatsLog};
pub use message::{ClientEvent, ServerEvent};
pub use registry::{Connection, ConnectionRegistry};
pub use room::Room;
pub use router::{route, Outbound};
pub use server::{RelayCommand, RelayServer};
pub use store::{RoomStore, RoomSummary};
pub use types::{ConnectionId, RoomId};
