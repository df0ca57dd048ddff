//! Signaling router
//!
//! Turns one inbound event (or a disconnect) into state mutations on the
//! store plus an explicit list of outbound instructions. No I/O happens
//! here; the relay actor delivers the instructions afterwards. Broadcast
//! recipients are resolved against room membership at routing time, so
//! every emitted viewer count is consistent with the state it describes.
//!
//! `offer`/`answer`/`ice_candidate` are relayed to the caller-supplied
//! target with no membership check. Targets are opaque connection ids the
//! caller learned from join/viewer_joined events; the relay stays O(1)
//! and stateless for these.

use chrono::{Local, Utc};
use tracing::{debug, info};

use crate::logs::ChatEntry;
use crate::message::{ClientEvent, ServerEvent};
use crate::store::RoomStore;
use crate::types::ConnectionId;

/// A single delivery instruction for the front door
#[derive(Debug)]
pub enum Outbound {
    /// Deliver to one connection
    Unicast {
        to: ConnectionId,
        event: ServerEvent,
    },
    /// Deliver to each listed connection
    ///
    /// Recipients are already resolved; sender exclusion happened during
    /// routing.
    Broadcast {
        to: Vec<ConnectionId>,
        event: ServerEvent,
    },
}

/// Route one inbound event from a live connection
pub fn route(store: &mut RoomStore, sender: ConnectionId, event: ClientEvent) -> Vec<Outbound> {
    match event {
        ClientEvent::CreateRoom { room_id } => match store.create_room(room_id.clone(), sender) {
            Ok(_) => {
                info!("Room {} created by {}", room_id, sender);
                vec![Outbound::Unicast {
                    to: sender,
                    event: ServerEvent::RoomCreated {
                        room_id,
                        host_id: sender,
                    },
                }]
            }
            Err(err) => {
                debug!("Rejected create_room from {}: {}", sender, err);
                vec![Outbound::Unicast {
                    to: sender,
                    event: err.into(),
                }]
            }
        },

        ClientEvent::JoinRoom { room_id, username } => {
            let viewer_count = match store.add_viewer(&room_id, sender) {
                Ok(count) => count,
                Err(err) => {
                    debug!("Rejected join_room from {}: {}", sender, err);
                    return vec![Outbound::Unicast {
                        to: sender,
                        event: err.into(),
                    }];
                }
            };
            info!("{} ({}) joined room {}", username, sender, room_id);

            // add_viewer just confirmed the room exists
            let others = store
                .get(&room_id)
                .map(|room| room.members_except(sender))
                .unwrap_or_default();

            vec![
                Outbound::Unicast {
                    to: sender,
                    event: ServerEvent::RoomJoined {
                        room_id,
                        viewer_count,
                        username: username.clone(),
                    },
                },
                Outbound::Broadcast {
                    to: others,
                    event: ServerEvent::ViewerJoined {
                        viewer_id: sender,
                        username,
                        viewer_count,
                    },
                },
            ]
        }

        ClientEvent::StartStream { room_id } => {
            let Some(room) = store.get_mut(&room_id) else {
                return Vec::new();
            };
            room.stream_active = true;
            info!("Stream started in room {}", room_id);
            vec![Outbound::Broadcast {
                to: room.members(),
                event: ServerEvent::StreamStarted { room_id },
            }]
        }

        ClientEvent::StopStream { room_id } => {
            let Some(room) = store.get_mut(&room_id) else {
                return Vec::new();
            };
            room.stream_active = false;
            info!("Stream stopped in room {}", room_id);
            vec![Outbound::Broadcast {
                to: room.members(),
                event: ServerEvent::StreamStopped { room_id },
            }]
        }

        ClientEvent::Offer { target_id, offer } => vec![Outbound::Unicast {
            to: target_id,
            event: ServerEvent::Offer {
                offer,
                sender_id: sender,
            },
        }],

        ClientEvent::Answer { target_id, answer } => vec![Outbound::Unicast {
            to: target_id,
            event: ServerEvent::Answer {
                answer,
                sender_id: sender,
            },
        }],

        ClientEvent::IceCandidate {
            target_id,
            candidate,
        } => vec![Outbound::Unicast {
            to: target_id,
            event: ServerEvent::IceCandidate {
                candidate,
                sender_id: sender,
            },
        }],

        ClientEvent::ChatMessage {
            room_id,
            message,
            username,
        } => {
            let Some(room) = store.get_mut(&room_id) else {
                return Vec::new();
            };
            let timestamp = Local::now().format("%H:%M:%S").to_string();
            room.chat.push(ChatEntry {
                username: username.clone(),
                message: message.clone(),
                timestamp: timestamp.clone(),
            });
            vec![Outbound::Broadcast {
                to: room.members(),
                event: ServerEvent::ChatMessage {
                    username,
                    message,
                    timestamp,
                },
            }]
        }

        ClientEvent::LatencyPing { timestamp } => vec![Outbound::Unicast {
            to: sender,
            event: ServerEvent::LatencyPong {
                timestamp,
                server_time: Utc::now().timestamp_millis(),
            },
        }],

        ClientEvent::StreamStats { room_id, stats } => {
            store.append_stats(room_id, stats);
            Vec::new()
        }
    }
}

/// Apply a disconnect: tear down hosted rooms, shrink viewed rooms
///
/// Scans every active room, since a connection can host one room and view
/// others at the same time. O(rooms) per disconnect.
pub fn disconnect(store: &mut RoomStore, conn: ConnectionId) -> Vec<Outbound> {
    let mut hosted = Vec::new();
    let mut viewing = Vec::new();
    for room in store.iter() {
        if room.host == conn {
            hosted.push(room.id.clone());
        } else if room.is_viewer(conn) {
            viewing.push(room.id.clone());
        }
    }

    let mut out = Vec::new();

    // Host gone: notify the viewers, then the whole room goes away
    for room_id in hosted {
        if let Some(room) = store.delete_room(&room_id) {
            info!("Host {} disconnected, room {} torn down", conn, room_id);
            out.push(Outbound::Broadcast {
                to: room.viewers().collect(),
                event: ServerEvent::StreamEnded {
                    message: "Host disconnected".to_string(),
                },
            });
        }
    }

    // Viewer gone: the room stays, the remaining members learn the count
    for room_id in viewing {
        if let Some(viewer_count) = store.remove_viewer(&room_id, conn) {
            let remaining = store
                .get(&room_id)
                .map(|room| room.members())
                .unwrap_or_default();
            out.push(Outbound::Broadcast {
                to: remaining,
                event: ServerEvent::ViewerLeft {
                    viewer_id: conn,
                    viewer_count,
                },
            });
        }
    }

    out
}
