//! WebSocket connection handler
//!
//! The front door for a single connection: WebSocket handshake, id
//! assignment, and bidirectional plumbing between the socket and the
//! relay actor. Frames that fail to parse are logged and dropped; they
//! never reach room state.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::RelayError;
use crate::message::{ClientEvent, ServerEvent};
use crate::server::RelayCommand;
use crate::types::ConnectionId;

/// Outbound buffer per connection; a receiver this far behind starts
/// losing events rather than stalling the relay
const OUTBOUND_BUFFER: usize = 64;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, registers with the relay, then runs
/// the read and write tasks until either side closes.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<RelayCommand>,
) -> Result<(), RelayError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign the connection id; stable until disconnect
    let conn_id = ConnectionId::new();
    info!("Connection {} accepted from {}", conn_id, peer_addr);

    // Relay → connection event channel
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);

    // Register with the relay; it answers with the `connected` event
    if cmd_tx
        .send(RelayCommand::Connect {
            conn_id,
            sender: event_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - relay closed", conn_id);
        return Err(RelayError::ChannelSend);
    }

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> RelayCommand)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        if cmd_tx_read
                            .send(RelayCommand::Inbound { conn_id, event })
                            .await
                            .is_err()
                        {
                            debug!("Relay closed, ending read task for {}", conn_id);
                            break;
                        }
                    }
                    Err(e) => {
                        // Malformed payload: fail closed, keep the connection
                        warn!("Ignoring invalid event from {}: {}", conn_id, e);
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", conn_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by tungstenite
                    debug!("Ping from {}", conn_id);
                }
                Ok(Message::Pong(_)) => {
                    debug!("Pong from {}", conn_id);
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", conn_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", conn_id);
    });

    // Spawn write task (ServerEvent -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        debug!("Write task ended for connection");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", conn_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", conn_id);
        }
    }

    // Disconnect is authoritative and immediate; the relay applies the
    // lifecycle rules (host teardown, viewer-count updates)
    let _ = cmd_tx.send(RelayCommand::Disconnect { conn_id }).await;

    info!("Connection {} closed", conn_id);

    Ok(())
}
