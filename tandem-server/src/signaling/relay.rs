use crate::connection::ConnectionTable;
use crate::room::RoomRegistry;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tandem_core::{ConnectionId, IceCandidate, RoomId, ServerMessage, SessionDescription};
use tracing::debug;

/// One negotiation message as it travels through the relay. The payloads are
/// never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Offer {
        offer: SessionDescription,
        name: String,
    },
    Answer {
        answer: SessionDescription,
        name: String,
    },
    Candidate {
        candidate: IceCandidate,
    },
}

impl Signal {
    fn into_message(self, room_id: RoomId) -> ServerMessage {
        match self {
            Signal::Offer { offer, name } => ServerMessage::Offer {
                offer,
                room_id,
                name,
            },
            Signal::Answer { answer, name } => ServerMessage::Answer {
                answer,
                room_id,
                name,
            },
            Signal::Candidate { candidate } => ServerMessage::IceCandidate { candidate, room_id },
        }
    }
}

/// Routes offers, answers, candidates and chat lines to the other members of
/// the sender's room.
#[derive(Clone)]
pub struct SignalingRelay {
    registry: RoomRegistry,
    connections: ConnectionTable,
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(
        registry: RoomRegistry,
        connections: ConnectionTable,
        output: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            registry,
            connections,
            output,
        }
    }

    /// Returns how many members the signal was handed to. Signals from
    /// non-members are dropped and count as zero.
    pub async fn relay(&self, sender: ConnectionId, room_id: RoomId, signal: Signal) -> usize {
        let room = match self.registry.lookup(&room_id) {
            Ok(room) => room,
            Err(e) => {
                debug!("Dropping signal from {}: {}", sender, e);
                return 0;
            }
        };
        if !room.is_member(&sender) {
            debug!("Dropping signal from non-member {} for {}", sender, room_id);
            return 0;
        }

        let recipients = room.others(&sender);
        self.output
            .deliver_all(&recipients, signal.into_message(room_id))
            .await;
        recipients.len()
    }

    /// Fans a chat line out to the sender's room, tagged with its name.
    pub async fn chat(&self, sender: ConnectionId, text: String) -> usize {
        let Some(connection) = self.connections.get(&sender) else {
            return 0;
        };
        let Some(room_id) = connection.room else {
            debug!("Dropping chat from unassigned connection {}", sender);
            return 0;
        };
        let Ok(room) = self.registry.lookup(&room_id) else {
            return 0;
        };

        let recipients = room.others(&sender);
        let msg = ServerMessage::ReceiveMessage {
            text,
            name: connection.name,
        };
        self.output.deliver_all(&recipients, msg).await;
        recipients.len()
    }
}
