use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use crate::model::signaling::{IceCandidate, IceServerConfig, SessionDescription};
use serde::{Deserialize, Serialize};

/// Frames a client sends to the signaling server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    CreateRoom { room_id: RoomId, name: String },

    #[serde(rename_all = "camelCase")]
    RequestToJoin { room_id: RoomId, name: String },

    /// Host's verdict on a pending join request; `to` is the requester.
    #[serde(rename_all = "camelCase")]
    RespondToJoin {
        allow: bool,
        to: ConnectionId,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    Offer {
        offer: SessionDescription,
        room_id: RoomId,
        #[serde(default)]
        name: String,
    },

    #[serde(rename_all = "camelCase")]
    Answer {
        answer: SessionDescription,
        room_id: RoomId,
        #[serde(default)]
        name: String,
    },

    #[serde(rename = "ice-candidate", rename_all = "camelCase")]
    IceCandidate {
        candidate: IceCandidate,
        room_id: RoomId,
    },

    SendMessage { text: String },

    #[serde(rename_all = "camelCase")]
    LeaveRoom {
        room_id: RoomId,
        #[serde(default)]
        name: String,
    },
}

impl ClientMessage {
    pub fn op(&self) -> &'static str {
        match self {
            ClientMessage::CreateRoom { .. } => "createRoom",
            ClientMessage::RequestToJoin { .. } => "requestToJoin",
            ClientMessage::RespondToJoin { .. } => "respondToJoin",
            ClientMessage::Offer { .. } => "offer",
            ClientMessage::Answer { .. } => "answer",
            ClientMessage::IceCandidate { .. } => "ice-candidate",
            ClientMessage::SendMessage { .. } => "sendMessage",
            ClientMessage::LeaveRoom { .. } => "leaveRoom",
        }
    }
}

/// Frames the signaling server pushes to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "camelCase")]
pub enum ServerMessage {
    /// First frame on every connection: the id the server assigned.
    #[serde(rename_all = "camelCase")]
    Welcome { socket_id: ConnectionId },

    #[serde(rename_all = "camelCase")]
    IceConfig { ice_servers: Vec<IceServerConfig> },

    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    RoomAlreadyExists { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    JoinRequest {
        socket_id: ConnectionId,
        name: String,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    JoinResponse { allow: bool, room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    RoomNotFound { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    Offer {
        offer: SessionDescription,
        room_id: RoomId,
        name: String,
    },

    #[serde(rename_all = "camelCase")]
    Answer {
        answer: SessionDescription,
        room_id: RoomId,
        name: String,
    },

    #[serde(rename = "ice-candidate", rename_all = "camelCase")]
    IceCandidate {
        candidate: IceCandidate,
        room_id: RoomId,
    },

    ReceiveMessage { text: String, name: String },

    #[serde(rename_all = "camelCase")]
    PeerJoined { name: String, socket_id: ConnectionId },

    #[serde(rename_all = "camelCase")]
    PeerLeft { name: String, socket_id: ConnectionId },

    #[serde(rename_all = "camelCase")]
    HostLeft { room_id: RoomId },
}

impl ServerMessage {
    pub fn op(&self) -> &'static str {
        match self {
            ServerMessage::Welcome { .. } => "welcome",
            ServerMessage::IceConfig { .. } => "iceConfig",
            ServerMessage::RoomCreated { .. } => "roomCreated",
            ServerMessage::RoomAlreadyExists { .. } => "roomAlreadyExists",
            ServerMessage::JoinRequest { .. } => "joinRequest",
            ServerMessage::JoinResponse { .. } => "joinResponse",
            ServerMessage::RoomNotFound { .. } => "roomNotFound",
            ServerMessage::Offer { .. } => "offer",
            ServerMessage::Answer { .. } => "answer",
            ServerMessage::IceCandidate { .. } => "ice-candidate",
            ServerMessage::ReceiveMessage { .. } => "receiveMessage",
            ServerMessage::PeerJoined { .. } => "peerJoined",
            ServerMessage::PeerLeft { .. } => "peerLeft",
            ServerMessage::HostLeft { .. } => "hostLeft",
        }
    }
}
