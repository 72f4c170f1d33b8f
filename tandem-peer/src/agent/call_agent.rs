use std::pin::Pin;

use tandem_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio::time::{Sleep, sleep};
use tracing::{debug, info};

use crate::error::PeerError;
use crate::negotiation::{NegotiationRole, NegotiationSession, Phase};
use crate::transport::TransportEvent;

/// Commands the UI can send into a running call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCommand {
    Hangup,
}

/// How a call ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEnd {
    HungUp,
    PeerLeft { name: String },
    HostLeft,
}

/// Drives a [`NegotiationSession`] from the signaling connection, the
/// transport's events and local commands.
///
/// Frames the call itself does not consume (join requests, chat, ...) are
/// forwarded to the notice channel when one is set.
pub struct CallAgent {
    session: NegotiationSession,
    signals: mpsc::UnboundedReceiver<ServerMessage>,
    events: mpsc::Receiver<TransportEvent>,
    commands: mpsc::UnboundedReceiver<CallCommand>,
    notices: Option<mpsc::UnboundedSender<ServerMessage>>,
}

impl CallAgent {
    pub fn new(
        session: NegotiationSession,
        signals: mpsc::UnboundedReceiver<ServerMessage>,
        events: mpsc::Receiver<TransportEvent>,
    ) -> (Self, mpsc::UnboundedSender<CallCommand>) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let agent = Self {
            session,
            signals,
            events,
            commands,
            notices: None,
        };
        (agent, command_tx)
    }

    pub fn with_notices(mut self, notices: mpsc::UnboundedSender<ServerMessage>) -> Self {
        self.notices = Some(notices);
        self
    }

    pub fn session(&self) -> &NegotiationSession {
        &self.session
    }

    /// Runs the call to completion. The transport is torn down on every
    /// return path.
    pub async fn run(mut self) -> Result<CallEnd, PeerError> {
        let result = match self.session.attach_media().await {
            Ok(()) => self.event_loop().await,
            Err(e) => Err(e),
        };
        self.session.teardown().await;

        match &result {
            Ok(end) => info!("Call ended: {:?}", end),
            Err(e) => info!("Call aborted: {}", e),
        }
        result
    }

    async fn event_loop(&mut self) -> Result<CallEnd, PeerError> {
        let mut settle: Option<Pin<Box<Sleep>>> = None;
        let mut events_open = true;
        let mut commands_open = true;

        loop {
            tokio::select! {
                msg = self.signals.recv() => {
                    let Some(msg) = msg else {
                        return Err(PeerError::SignalingClosed);
                    };
                    if let Some(end) = self.on_signal(msg, &mut settle).await? {
                        return Ok(end);
                    }
                }

                event = self.events.recv(), if events_open => match event {
                    Some(TransportEvent::LocalCandidate(candidate)) => {
                        self.session.relay_local_candidate(candidate);
                    }
                    Some(TransportEvent::Health(health)) => {
                        self.session.handle_health(health).await?;
                    }
                    None => events_open = false,
                },

                cmd = self.commands.recv(), if commands_open => match cmd {
                    Some(CallCommand::Hangup) => {
                        self.leave_room();
                        return Ok(CallEnd::HungUp);
                    }
                    None => commands_open = false,
                },

                () = settled(&mut settle) => {
                    settle = None;
                    if self.session.phase() == Phase::Idle {
                        // Conflicts are logged by the session.
                        let _ = self.session.start_offer().await;
                    }
                }
            }
        }
    }

    async fn on_signal(
        &mut self,
        msg: ServerMessage,
        settle: &mut Option<Pin<Box<Sleep>>>,
    ) -> Result<Option<CallEnd>, PeerError> {
        match msg {
            ServerMessage::PeerJoined { name, socket_id } => {
                info!("{} ({}) joined the room", name, socket_id);
                if self.session.role() == NegotiationRole::Offerer
                    && self.session.phase() == Phase::Idle
                {
                    let delay = self.session.config().settle_delay;
                    debug!("Offering in {:?}", delay);
                    *settle = Some(Box::pin(sleep(delay)));
                }
            }

            ServerMessage::Offer { offer, name, .. } => {
                debug!("Offer from {}", name);
                let _ = self.session.handle_offer(offer).await;
            }

            ServerMessage::Answer { answer, name, .. } => {
                debug!("Answer from {}", name);
                let _ = self.session.handle_answer(answer).await;
            }

            ServerMessage::IceCandidate { candidate, .. } => {
                let _ = self.session.handle_candidate(candidate).await;
            }

            ServerMessage::PeerLeft { name, .. } => {
                return Ok(Some(CallEnd::PeerLeft { name }));
            }

            ServerMessage::HostLeft { room_id } if room_id == *self.session.room_id() => {
                return Ok(Some(CallEnd::HostLeft));
            }

            ServerMessage::RoomNotFound { room_id } if room_id == *self.session.room_id() => {
                return Err(PeerError::RoomNotFound(room_id));
            }

            ServerMessage::JoinResponse {
                allow: false,
                room_id,
            } if room_id == *self.session.room_id() => {
                return Err(PeerError::AdmissionRejected(room_id));
            }

            other => self.notify(other),
        }
        Ok(None)
    }

    fn notify(&self, msg: ServerMessage) {
        match &self.notices {
            Some(notices) => {
                let _ = notices.send(msg);
            }
            None => debug!("Ignoring {} during call", msg.op()),
        }
    }

    fn leave_room(&self) {
        self.session.send_signal(ClientMessage::LeaveRoom {
            room_id: self.session.room_id().clone(),
            name: self.session.name().to_owned(),
        });
    }
}

async fn settled(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.await,
        None => std::future::pending().await,
    }
}
