//! Error types for the rendezvous server.
//!
//! None of these ever terminate a connection handler: callers turn them into
//! a response frame for the requester or a log line.

use tandem_core::{ConnectionId, RoomId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `create_room` with an id that is already taken.
    #[error("Room already exists: {0}")]
    AlreadyExists(RoomId),

    #[error("Room not found: {0}")]
    NotFound(RoomId),

    #[error("Connection {conn} is not a member of room {room}")]
    NotMember { room: RoomId, conn: ConnectionId },

    /// The host only leaves a room by destroying it.
    #[error("Connection {conn} hosts room {room} and cannot be removed as a member")]
    HostMember { room: RoomId, conn: ConnectionId },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid allowed origin: {0}")]
    InvalidOrigin(String),

    #[error("TURN server {0} requires both a username and a credential")]
    MissingTurnCredentials(String),
}
