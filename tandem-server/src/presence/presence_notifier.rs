use crate::admission::PendingRequests;
use crate::connection::ConnectionTable;
use crate::room::{Room, RoomRegistry};
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tandem_core::{ConnectionId, RoomId, ServerMessage};
use tracing::{debug, info};

/// What a departure did to the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The connection was not (or no longer) a member.
    NotInRoom,
    /// A guest left; the room lives on with `remaining` members.
    PeerLeft { remaining: Vec<ConnectionId> },
    /// The host left; the room is gone and `notified` got `hostLeft`.
    HostLeft { notified: Vec<ConnectionId> },
}

/// Turns registry membership transitions into `peerJoined` / `peerLeft` /
/// `hostLeft` frames.
#[derive(Clone)]
pub struct PresenceNotifier {
    registry: RoomRegistry,
    connections: ConnectionTable,
    pending: PendingRequests,
    output: Arc<dyn SignalingOutput>,
}

impl PresenceNotifier {
    pub fn new(
        registry: RoomRegistry,
        connections: ConnectionTable,
        pending: PendingRequests,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            registry,
            connections,
            pending,
            output,
        }
    }

    /// Announces `newcomer` to everyone already in `room`.
    pub async fn peer_joined(&self, room: &Room, newcomer: ConnectionId) {
        let others = room.others(&newcomer);
        if others.is_empty() {
            return;
        }

        let msg = ServerMessage::PeerJoined {
            name: self.connections.name_of(&newcomer),
            socket_id: newcomer,
        };
        self.output.deliver_all(&others, msg).await;
    }

    /// Removes `conn` from `room_id`, destroying the room when `conn` hosts it.
    pub async fn depart(&self, conn: ConnectionId, name: &str, room_id: &RoomId) -> Departure {
        let Ok(room) = self.registry.lookup(room_id) else {
            self.connections.unassign_if_in(&conn, room_id);
            return Departure::NotInRoom;
        };

        if room.host() == conn {
            return self.host_left(conn, room_id).await;
        }

        match self.registry.remove_member(room_id, &conn) {
            Ok(room) => {
                self.connections.unassign_if_in(&conn, room_id);
                info!("{} ({}) left room {}", name, conn, room_id);

                let remaining = room.members().to_vec();
                let msg = ServerMessage::PeerLeft {
                    name: name.to_owned(),
                    socket_id: conn,
                };
                self.output.deliver_all(&remaining, msg).await;

                Departure::PeerLeft { remaining }
            }
            Err(e) => {
                debug!("Ignoring departure of {} from {}: {}", conn, room_id, e);
                self.connections.unassign_if_in(&conn, room_id);
                Departure::NotInRoom
            }
        }
    }

    async fn host_left(&self, host: ConnectionId, room_id: &RoomId) -> Departure {
        let Some(room) = self.registry.destroy(room_id, &host) else {
            self.connections.unassign_if_in(&host, room_id);
            return Departure::NotInRoom;
        };

        self.connections.unassign_if_in(&host, room_id);
        let notified = room.others(&host);
        for member in &notified {
            self.connections.unassign_if_in(member, room_id);
        }
        info!(
            "Host {} left room {}, releasing {} member(s)",
            host,
            room_id,
            notified.len()
        );

        let msg = ServerMessage::HostLeft {
            room_id: room_id.clone(),
        };
        self.output.deliver_all(&notified, msg).await;

        let stranded = self.pending.drain_room(room_id);
        let msg = ServerMessage::RoomNotFound {
            room_id: room_id.clone(),
        };
        self.output.deliver_all(&stranded, msg).await;

        Departure::HostLeft { notified }
    }
}
