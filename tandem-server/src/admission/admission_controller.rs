use crate::admission::{JoinRequest, PendingRequests};
use crate::connection::ConnectionTable;
use crate::error::AdmissionError;
use crate::presence::PresenceNotifier;
use crate::room::RoomRegistry;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tandem_core::{ConnectionId, Role, RoomId, ServerMessage};
use tracing::{debug, info};

/// How a host's `respondToJoin` was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Admitted,
    Rejected,
    /// The room disappeared between the request and the verdict.
    RoomGone,
    /// Not the host, no pending request, or the requester is gone.
    Ignored,
}

/// Host-gated admission: `Requested -> Admitted | Rejected`.
#[derive(Clone)]
pub struct AdmissionController {
    registry: RoomRegistry,
    connections: ConnectionTable,
    pending: PendingRequests,
    presence: PresenceNotifier,
    output: Arc<dyn SignalingOutput>,
}

impl AdmissionController {
    pub fn new(
        registry: RoomRegistry,
        connections: ConnectionTable,
        pending: PendingRequests,
        presence: PresenceNotifier,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            registry,
            connections,
            pending,
            presence,
            output,
        }
    }

    /// Forwards a join request to the room's host. The requester stays
    /// unassigned until the host answers.
    pub async fn request_join(
        &self,
        requester: ConnectionId,
        room_id: RoomId,
        name: &str,
    ) -> Result<(), AdmissionError> {
        self.connections.set_name(&requester, name);

        let room = match self.registry.lookup(&room_id) {
            Ok(room) => room,
            Err(_) => {
                debug!("{} asked to join missing room {}", requester, room_id);
                self.output
                    .deliver(
                        requester,
                        ServerMessage::RoomNotFound {
                            room_id: room_id.clone(),
                        },
                    )
                    .await;
                return Err(AdmissionError::RoomNotFound(room_id));
            }
        };

        if room.is_member(&requester) {
            debug!("{} is already a member of {}", requester, room_id);
            return Ok(());
        }

        self.pending.insert(JoinRequest {
            requester,
            room_id: room_id.clone(),
            name: name.to_owned(),
        });
        info!("{} ({}) requests to join room {}", name, requester, room_id);

        let msg = ServerMessage::JoinRequest {
            socket_id: requester,
            name: name.to_owned(),
            room_id,
        };
        self.output.deliver(room.host(), msg).await;
        Ok(())
    }

    /// Applies the host's verdict on `requester`. Calls from anyone but the
    /// room's host are ignored.
    pub async fn respond_to_join(
        &self,
        responder: ConnectionId,
        requester: ConnectionId,
        room_id: RoomId,
        allow: bool,
    ) -> Resolution {
        match self.registry.lookup(&room_id) {
            Ok(room) if room.host() == responder => {}
            _ => {
                debug!(
                    "Ignoring respondToJoin from non-host {} for room {}",
                    responder, room_id
                );
                return Resolution::Ignored;
            }
        }

        let Some(request) = self.pending.take(&room_id, &requester) else {
            debug!("No pending request from {} for {}", requester, room_id);
            return Resolution::Ignored;
        };
        let Some(connection) = self.connections.get(&requester) else {
            debug!("Requester {} disconnected before the verdict", requester);
            return Resolution::Ignored;
        };

        if !allow {
            info!("Host rejected {} ({}) for room {}", request.name, requester, room_id);
            let msg = ServerMessage::JoinResponse {
                allow: false,
                room_id,
            };
            self.output.deliver(requester, msg).await;
            return Resolution::Rejected;
        }

        if let Some(previous) = connection.room.as_ref().filter(|r| **r != room_id) {
            self.presence
                .depart(requester, &connection.name, previous)
                .await;
        }

        let room = match self.registry.add_member(&room_id, requester) {
            Ok(room) => room,
            Err(e) => {
                debug!("Admission of {} failed: {}", requester, e);
                let msg = ServerMessage::RoomNotFound { room_id };
                self.output.deliver(requester, msg).await;
                return Resolution::RoomGone;
            }
        };

        if !self
            .connections
            .assign(&requester, room_id.clone(), Role::Guest)
        {
            debug!("Requester {} disconnected during admission", requester);
            if let Err(e) = self.registry.remove_member(&room_id, &requester) {
                debug!("Rollback of {} from {}: {}", requester, room_id, e);
            }
            return Resolution::Ignored;
        }
        info!("{} ({}) admitted to room {}", request.name, requester, room_id);

        let msg = ServerMessage::JoinResponse {
            allow: true,
            room_id,
        };
        self.output.deliver(requester, msg).await;
        self.presence.peer_joined(&room, requester).await;

        Resolution::Admitted
    }
}
