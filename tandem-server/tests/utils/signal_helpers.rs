use tandem_core::{ClientMessage, ConnectionId, IceCandidate, RoomId, SessionDescription};
use tandem_server::Dispatcher;

pub fn room(id: &str) -> RoomId {
    RoomId::from(id)
}

/// Connects a new client and has it create `room_id`.
pub async fn host_room(dispatcher: &Dispatcher, room_id: &str, name: &str) -> ConnectionId {
    let host = ConnectionId::new();
    dispatcher.connect(host);
    dispatcher
        .handle(
            host,
            ClientMessage::CreateRoom {
                room_id: room(room_id),
                name: name.to_string(),
            },
        )
        .await;
    host
}

/// Connects a new client and has it ask to join `room_id`.
pub async fn request_join(dispatcher: &Dispatcher, room_id: &str, name: &str) -> ConnectionId {
    let guest = ConnectionId::new();
    dispatcher.connect(guest);
    dispatcher
        .handle(
            guest,
            ClientMessage::RequestToJoin {
                room_id: room(room_id),
                name: name.to_string(),
            },
        )
        .await;
    guest
}

pub async fn respond(
    dispatcher: &Dispatcher,
    responder: ConnectionId,
    requester: ConnectionId,
    room_id: &str,
    allow: bool,
) {
    dispatcher
        .handle(
            responder,
            ClientMessage::RespondToJoin {
                allow,
                to: requester,
                room_id: room(room_id),
            },
        )
        .await;
}

/// Host "Alice" with admitted guest "Bob" in `room_id`.
pub async fn host_with_guest(dispatcher: &Dispatcher, room_id: &str) -> (ConnectionId, ConnectionId) {
    let host = host_room(dispatcher, room_id, "Alice").await;
    let guest = request_join(dispatcher, room_id, "Bob").await;
    respond(dispatcher, host, guest, room_id, true).await;
    (host, guest)
}

pub fn offer(room_id: &str, sdp: &str, name: &str) -> ClientMessage {
    ClientMessage::Offer {
        offer: SessionDescription::offer(sdp),
        room_id: room(room_id),
        name: name.to_string(),
    }
}

pub fn answer(room_id: &str, sdp: &str, name: &str) -> ClientMessage {
    ClientMessage::Answer {
        answer: SessionDescription::answer(sdp),
        room_id: room(room_id),
        name: name.to_string(),
    }
}

pub fn candidate(room_id: &str, line: &str) -> ClientMessage {
    ClientMessage::IceCandidate {
        candidate: IceCandidate::new(line),
        room_id: room(room_id),
    }
}
