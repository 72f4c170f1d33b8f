use std::sync::Arc;

use tandem_core::{ClientMessage, IceCandidate, RoomId, SessionDescription};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{Dropped, PeerError};
use crate::negotiation::{
    CandidateQueue, HealthState, NegotiationConfig, NegotiationRole, Phase, SignalingState,
};
use crate::transport::MediaTransport;

/// Client-side offer/answer state machine for one call.
///
/// Every transition runs on the caller's task; the session owns no tasks of
/// its own. Outbound signaling goes through `outbound`, already addressed to
/// the session's room.
pub struct NegotiationSession {
    room_id: RoomId,
    name: String,
    role: NegotiationRole,
    config: NegotiationConfig,

    phase: Phase,
    signaling: SignalingState,
    health: HealthState,
    candidates: CandidateQueue,
    has_remote_description: bool,
    restarts: u32,
    torn_down: bool,

    transport: Arc<dyn MediaTransport>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
}

impl NegotiationSession {
    pub fn new(
        room_id: RoomId,
        name: impl Into<String>,
        role: NegotiationRole,
        config: NegotiationConfig,
        transport: Arc<dyn MediaTransport>,
        outbound: mpsc::UnboundedSender<ClientMessage>,
    ) -> Self {
        Self {
            room_id,
            name: name.into(),
            role,
            config,
            phase: Phase::Idle,
            signaling: SignalingState::Stable,
            health: HealthState::New,
            candidates: CandidateQueue::new(),
            has_remote_description: false,
            restarts: 0,
            torn_down: false,
            transport,
            outbound,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn signaling_state(&self) -> SignalingState {
        self.signaling
    }

    pub fn health(&self) -> HealthState {
        self.health
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn has_remote_description(&self) -> bool {
        self.has_remote_description
    }

    pub fn pending_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Attaches local capture. Failure is fatal for the call.
    pub async fn attach_media(&mut self) -> Result<(), PeerError> {
        self.transport
            .attach_local_media()
            .await
            .map_err(|e| PeerError::MediaAcquisition(format!("{e:#}")))
    }

    /// Creates, applies and relays the first offer.
    pub async fn start_offer(&mut self) -> Result<(), Dropped> {
        self.ensure_open()?;
        if self.signaling != SignalingState::Stable {
            warn!(
                "Not starting an offer in signaling state {}",
                self.signaling
            );
            return Err(Dropped::SignalingStateConflict(self.signaling));
        }

        self.send_offer(false).await?;
        self.phase = Phase::Negotiating;
        Ok(())
    }

    /// Applies a remote offer and relays the answer. Offers that collide with
    /// an outstanding one are dropped without touching the session.
    pub async fn handle_offer(&mut self, offer: SessionDescription) -> Result<(), Dropped> {
        self.ensure_open()?;
        if self.signaling != SignalingState::Stable {
            warn!(
                "Dropping offer for room {}: signaling state is {}",
                self.room_id, self.signaling
            );
            return Err(Dropped::SignalingStateConflict(self.signaling));
        }

        self.transport
            .set_remote_description(offer)
            .await
            .map_err(transport_step("apply remote offer"))?;
        self.signaling = SignalingState::HaveRemoteOffer;
        self.remote_description_set().await;

        if let Err(dropped) = self.send_answer().await {
            self.signaling = SignalingState::Stable;
            return Err(dropped);
        }
        self.signaling = SignalingState::Stable;
        self.phase = Phase::Negotiating;
        Ok(())
    }

    /// Applies the remote answer to our outstanding offer.
    pub async fn handle_answer(&mut self, answer: SessionDescription) -> Result<(), Dropped> {
        self.ensure_open()?;
        if self.signaling != SignalingState::HaveLocalOffer {
            debug!(
                "Ignoring answer for room {} in signaling state {}",
                self.room_id, self.signaling
            );
            return Err(Dropped::UnexpectedAnswer(self.signaling));
        }

        self.transport
            .set_remote_description(answer)
            .await
            .map_err(transport_step("apply remote answer"))?;
        self.signaling = SignalingState::Stable;
        self.remote_description_set().await;
        Ok(())
    }

    /// Applies a remote candidate, or buffers it until a remote description
    /// exists.
    pub async fn handle_candidate(&mut self, candidate: IceCandidate) -> Result<(), Dropped> {
        self.ensure_open()?;
        if !self.has_remote_description {
            debug!("Buffering candidate until the remote description is set");
            self.candidates.push(candidate);
            return Ok(());
        }

        self.transport
            .add_ice_candidate(candidate)
            .await
            .map_err(transport_step("add remote candidate"))
    }

    /// Relays a candidate gathered by the local transport.
    pub fn relay_local_candidate(&self, candidate: IceCandidate) {
        if self.torn_down {
            return;
        }
        self.send_signal(ClientMessage::IceCandidate {
            candidate,
            room_id: self.room_id.clone(),
        });
    }

    /// Reacts to a transport health change. A failure restarts ICE until the
    /// restart budget is spent.
    pub async fn handle_health(&mut self, health: HealthState) -> Result<(), PeerError> {
        if self.torn_down {
            return Ok(());
        }
        self.health = health;

        match health {
            HealthState::Connected => {
                if self.restarts > 0 {
                    info!("Connection recovered after {} restart(s)", self.restarts);
                }
                self.restarts = 0;
                self.phase = Phase::Connected;
            }
            HealthState::Failed => {
                self.phase = Phase::Failed;
                if self.restarts >= self.config.max_restarts {
                    warn!(
                        "Connection in room {} failed after {} restart(s), giving up",
                        self.room_id, self.restarts
                    );
                    return Err(PeerError::NegotiationFailure {
                        attempts: self.restarts,
                    });
                }
                self.restarts += 1;
                self.restart_ice().await;
            }
            HealthState::New | HealthState::Connecting | HealthState::Closed => {}
        }
        Ok(())
    }

    /// Closes the transport, stops local media and detaches every listener.
    /// Safe to call more than once.
    pub async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.phase = Phase::Closed;
        self.health = HealthState::Closed;
        self.candidates.clear();

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport: {:#}", e);
        }
        self.transport.stop_local_media().await;
        self.transport.deregister_listeners();
        info!("Call in room {} torn down", self.room_id);
    }

    async fn restart_ice(&mut self) {
        if self.role != NegotiationRole::Offerer {
            info!(
                "Connection failed (restart {}/{}), waiting for the offerer",
                self.restarts, self.config.max_restarts
            );
            return;
        }

        info!(
            "Connection failed, restarting ICE ({}/{})",
            self.restarts, self.config.max_restarts
        );
        match self.send_offer(true).await {
            Ok(()) => self.phase = Phase::Negotiating,
            Err(dropped) => warn!("ICE restart offer not sent: {}", dropped),
        }
    }

    async fn send_offer(&mut self, ice_restart: bool) -> Result<(), Dropped> {
        let offer = self
            .transport
            .create_offer(ice_restart)
            .await
            .map_err(transport_step("create offer"))?;
        self.transport
            .set_local_description(offer.clone())
            .await
            .map_err(transport_step("apply local offer"))?;
        self.signaling = SignalingState::HaveLocalOffer;

        self.send_signal(ClientMessage::Offer {
            offer,
            room_id: self.room_id.clone(),
            name: self.name.clone(),
        });
        Ok(())
    }

    async fn send_answer(&mut self) -> Result<(), Dropped> {
        let answer = self
            .transport
            .create_answer()
            .await
            .map_err(transport_step("create answer"))?;
        self.transport
            .set_local_description(answer.clone())
            .await
            .map_err(transport_step("apply local answer"))?;

        self.send_signal(ClientMessage::Answer {
            answer,
            room_id: self.room_id.clone(),
            name: self.name.clone(),
        });
        Ok(())
    }

    async fn remote_description_set(&mut self) {
        self.has_remote_description = true;
        if self.candidates.is_empty() {
            return;
        }

        debug!("Applying {} buffered candidate(s)", self.candidates.len());
        let buffered: Vec<_> = self.candidates.drain().collect();
        for candidate in buffered {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Failed to add buffered candidate: {:#}", e);
            }
        }
    }

    /// Queues a frame on the signaling connection.
    pub fn send_signal(&self, msg: ClientMessage) {
        if self.outbound.send(msg).is_err() {
            debug!("Signaling channel closed, dropping outbound frame");
        }
    }

    fn ensure_open(&self) -> Result<(), Dropped> {
        if self.torn_down {
            Err(Dropped::Closed)
        } else {
            Ok(())
        }
    }
}

impl Drop for NegotiationSession {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            return;
        };

        let transport = self.transport.clone();
        handle.spawn(async move {
            if let Err(e) = transport.close().await {
                warn!("Failed to close abandoned transport: {:#}", e);
            }
            transport.stop_local_media().await;
            transport.deregister_listeners();
        });
    }
}

fn transport_step(step: &'static str) -> impl Fn(anyhow::Error) -> Dropped {
    move |e| {
        warn!("Transport failed to {}: {:#}", step, e);
        Dropped::Transport(format!("{step}: {e:#}"))
    }
}
