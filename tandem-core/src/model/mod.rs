mod connection;
mod protocol;
mod room;
mod signaling;

pub use connection::{ConnectionId, Role};
pub use protocol::{ClientMessage, ServerMessage};
pub use room::RoomId;
pub use signaling::{IceCandidate, IceServerConfig, SdpKind, SessionDescription};
