use tandem_core::RoomId;
use thiserror::Error;

use crate::negotiation::SignalingState;

/// Fatal outcomes of a call. Anything not listed here is absorbed by the
/// session and only logged.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),

    #[error("room {0} already exists")]
    RoomAlreadyExists(RoomId),

    #[error("host rejected the request to join room {0}")]
    AdmissionRejected(RoomId),

    /// Local capture devices could not be attached to the transport.
    #[error("failed to acquire local media: {0}")]
    MediaAcquisition(String),

    /// The connection kept failing after every allowed ICE restart.
    #[error("negotiation failed after {attempts} restart attempt(s)")]
    NegotiationFailure { attempts: u32 },

    #[error("signaling transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("signaling connection closed")]
    SignalingClosed,

    #[error("unexpected signaling frame: {0}")]
    Protocol(String),
}

/// Why an inbound step was skipped without changing the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Dropped {
    /// An offer arrived while a local or remote offer was outstanding.
    #[error("offer received in signaling state {0}")]
    SignalingStateConflict(SignalingState),

    #[error("answer received in signaling state {0}")]
    UnexpectedAnswer(SignalingState),

    #[error("session is closed")]
    Closed,

    /// The transport refused the step; the session keeps running.
    #[error("transport rejected the step: {0}")]
    Transport(String),
}
