use crate::admission::{AdmissionController, PendingRequests};
use crate::connection::ConnectionTable;
use crate::presence::PresenceNotifier;
use crate::room::RoomRegistry;
use crate::signaling::{Signal, SignalingOutput, SignalingRelay};
use std::sync::Arc;
use tandem_core::{ClientMessage, ConnectionId, Role, RoomId, ServerMessage};
use tracing::{debug, info};

/// Routes each decoded client frame to the component that owns it.
///
/// A connection's frames are handled one at a time, in arrival order, by the
/// task that owns the socket.
#[derive(Clone)]
pub struct Dispatcher {
    registry: RoomRegistry,
    connections: ConnectionTable,
    pending: PendingRequests,
    admission: AdmissionController,
    relay: SignalingRelay,
    presence: PresenceNotifier,
    output: Arc<dyn SignalingOutput>,
}

impl Dispatcher {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        let registry = RoomRegistry::new();
        let connections = ConnectionTable::new();
        let pending = PendingRequests::new();

        let presence = PresenceNotifier::new(
            registry.clone(),
            connections.clone(),
            pending.clone(),
            output.clone(),
        );
        let admission = AdmissionController::new(
            registry.clone(),
            connections.clone(),
            pending.clone(),
            presence.clone(),
            output.clone(),
        );
        let relay = SignalingRelay::new(registry.clone(), connections.clone(), output.clone());

        Self {
            registry,
            connections,
            pending,
            admission,
            relay,
            presence,
            output,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.connections
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub fn connect(&self, conn: ConnectionId) {
        self.connections.register(conn);
    }

    pub async fn handle(&self, conn: ConnectionId, msg: ClientMessage) {
        debug!("{} -> {}", conn, msg.op());

        match msg {
            ClientMessage::CreateRoom { room_id, name } => {
                self.create_room(conn, room_id, &name).await;
            }

            ClientMessage::RequestToJoin { room_id, name } => {
                // A missing room has already been reported to the requester.
                let _ = self.admission.request_join(conn, room_id, &name).await;
            }

            ClientMessage::RespondToJoin { allow, to, room_id } => {
                self.admission
                    .respond_to_join(conn, to, room_id, allow)
                    .await;
            }

            ClientMessage::Offer {
                offer,
                room_id,
                name,
            } => {
                self.relay
                    .relay(conn, room_id, Signal::Offer { offer, name })
                    .await;
            }

            ClientMessage::Answer {
                answer,
                room_id,
                name,
            } => {
                self.relay
                    .relay(conn, room_id, Signal::Answer { answer, name })
                    .await;
            }

            ClientMessage::IceCandidate { candidate, room_id } => {
                self.relay
                    .relay(conn, room_id, Signal::Candidate { candidate })
                    .await;
            }

            ClientMessage::SendMessage { text } => {
                self.relay.chat(conn, text).await;
            }

            ClientMessage::LeaveRoom { room_id, .. } => {
                self.leave_room(conn, &room_id).await;
            }
        }
    }

    /// Transport-level disconnect: forget the connection and release
    /// whatever room it was in.
    ///
    /// The connection leaves the table before its room is released, so an
    /// admission racing with the disconnect either sees it gone or has
    /// already recorded the room this departure releases.
    pub async fn disconnect(&self, conn: ConnectionId) {
        self.pending.forget_requester(&conn);

        let Some(connection) = self.connections.remove(&conn) else {
            return;
        };
        if let Some(room_id) = &connection.room {
            self.presence.depart(conn, &connection.name, room_id).await;
        }
        info!("Connection {} cleaned up", conn);
    }

    async fn create_room(&self, conn: ConnectionId, room_id: RoomId, name: &str) {
        let Some(connection) = self.connections.get(&conn) else {
            return;
        };
        if connection.room.as_ref() == Some(&room_id) {
            debug!("{} re-sent createRoom for its own room {}", conn, room_id);
            self.output
                .deliver(conn, ServerMessage::RoomAlreadyExists { room_id })
                .await;
            return;
        }

        if let Err(e) = self.registry.create_room(room_id.clone(), conn) {
            debug!("createRoom from {} rejected: {}", conn, e);
            self.output
                .deliver(conn, ServerMessage::RoomAlreadyExists { room_id })
                .await;
            return;
        }

        // The new room is reserved; only now give up the previous one.
        if let Some(previous) = &connection.room {
            self.presence.depart(conn, &connection.name, previous).await;
        }
        self.connections.set_name(&conn, name);

        if !self.connections.assign(&conn, room_id.clone(), Role::Host) {
            debug!("{} disconnected while creating {}", conn, room_id);
            self.registry.destroy(&room_id, &conn);
            return;
        }
        self.output
            .deliver(conn, ServerMessage::RoomCreated { room_id })
            .await;
    }

    async fn leave_room(&self, conn: ConnectionId, room_id: &RoomId) {
        let Some(connection) = self.connections.get(&conn) else {
            return;
        };
        if connection.room.as_ref() != Some(room_id) {
            debug!("{} asked to leave {} but is not in it", conn, room_id);
            return;
        }
        self.presence.depart(conn, &connection.name, room_id).await;
    }
}
