use tandem_core::{ClientMessage, ConnectionId, RoomId, ServerMessage};
use tandem_peer::{
    CallCommand, CallEnd, HealthState, NegotiationConfig, NegotiationRole, PeerError,
    TransportEvent,
};
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{
    MockTransport, TransportCall, agent_harness, candidate, room, server_answer, server_offer,
};

fn assert_torn_down(transport: &MockTransport) {
    assert_eq!(transport.count(&TransportCall::Close), 1);
    assert_eq!(transport.count(&TransportCall::StopLocalMedia), 1);
    assert_eq!(transport.count(&TransportCall::DeregisterListeners), 1);
}

#[tokio::test]
async fn test_guest_answers_and_relays_candidates() {
    init_tracing();

    let mut h = agent_harness(NegotiationRole::Answerer, NegotiationConfig::default());
    let call = tokio::spawn(h.agent.run());

    h.server_tx
        .send(ServerMessage::IceCandidate {
            candidate: candidate("candidate:remote"),
            room_id: room(),
        })
        .unwrap();
    h.server_tx.send(server_offer("remote-offer")).unwrap();

    let answer = h.outbound_rx.recv().await.unwrap();
    assert!(matches!(answer, ClientMessage::Answer { .. }));
    assert_eq!(h.transport.applied_candidates(), vec!["candidate:remote"]);

    h.event_tx
        .send(TransportEvent::LocalCandidate(candidate("candidate:local")))
        .await
        .unwrap();
    let relayed = h.outbound_rx.recv().await.unwrap();
    assert!(matches!(
        relayed,
        ClientMessage::IceCandidate { candidate, .. } if candidate.candidate == "candidate:local"
    ));

    h.server_tx
        .send(ServerMessage::HostLeft { room_id: room() })
        .unwrap();

    assert_eq!(call.await.unwrap().unwrap(), CallEnd::HostLeft);
    assert_torn_down(&h.transport);
}

#[tokio::test]
async fn test_hangup_leaves_room_and_tears_down() {
    init_tracing();

    let mut h = agent_harness(NegotiationRole::Offerer, NegotiationConfig::default());
    let call = tokio::spawn(h.agent.run());

    h.commands.send(CallCommand::Hangup).unwrap();

    assert_eq!(call.await.unwrap().unwrap(), CallEnd::HungUp);
    assert!(matches!(
        h.outbound_rx.recv().await.unwrap(),
        ClientMessage::LeaveRoom { room_id, name } if room_id == room() && name == "Alice"
    ));
    assert_eq!(h.transport.calls()[0], TransportCall::AttachLocalMedia);
    assert_torn_down(&h.transport);
}

#[tokio::test]
async fn test_peer_left_ends_call() {
    init_tracing();

    let h = agent_harness(NegotiationRole::Offerer, NegotiationConfig::default());
    let call = tokio::spawn(h.agent.run());

    h.server_tx
        .send(ServerMessage::PeerLeft {
            name: "Bob".to_string(),
            socket_id: ConnectionId::new(),
        })
        .unwrap();

    assert_eq!(
        call.await.unwrap().unwrap(),
        CallEnd::PeerLeft {
            name: "Bob".to_string()
        }
    );
    assert_torn_down(&h.transport);
}

#[tokio::test]
async fn test_media_failure_is_fatal() {
    init_tracing();

    let mut h = agent_harness(NegotiationRole::Offerer, NegotiationConfig::default());
    h.transport.fail_media_acquisition();

    let result = h.agent.run().await;

    assert!(matches!(result, Err(PeerError::MediaAcquisition(_))));
    assert!(h.outbound_rx.try_recv().is_err());
    assert_torn_down(&h.transport);
}

#[tokio::test]
async fn test_restart_exhaustion_ends_call() {
    init_tracing();

    let h = agent_harness(
        NegotiationRole::Offerer,
        NegotiationConfig {
            max_restarts: 1,
            ..NegotiationConfig::default()
        },
    );
    let call = tokio::spawn(h.agent.run());

    h.event_tx
        .send(TransportEvent::Health(HealthState::Failed))
        .await
        .unwrap();
    h.server_tx.send(server_answer("restart-answer")).unwrap();
    h.event_tx
        .send(TransportEvent::Health(HealthState::Failed))
        .await
        .unwrap();

    let result = call.await.unwrap();
    assert!(matches!(
        result,
        Err(PeerError::NegotiationFailure { attempts: 1 })
    ));
    assert_torn_down(&h.transport);
}

#[tokio::test]
async fn test_closed_signaling_aborts_call() {
    init_tracing();

    let h = agent_harness(NegotiationRole::Answerer, NegotiationConfig::default());
    let transport = h.transport.clone();
    drop(h.server_tx);

    let result = h.agent.run().await;

    assert!(matches!(result, Err(PeerError::SignalingClosed)));
    assert_torn_down(&transport);
}

#[tokio::test]
async fn test_unrelated_frames_reach_notices() {
    init_tracing();

    let h = agent_harness(NegotiationRole::Offerer, NegotiationConfig::default());
    let (notice_tx, mut notices) = mpsc::unbounded_channel();
    let call = tokio::spawn(h.agent.with_notices(notice_tx).run());

    let requester = ConnectionId::new();
    let request = ServerMessage::JoinRequest {
        socket_id: requester,
        name: "Carol".to_string(),
        room_id: room(),
    };
    h.server_tx.send(request.clone()).unwrap();
    h.server_tx
        .send(ServerMessage::HostLeft {
            room_id: RoomId::from("elsewhere"),
        })
        .unwrap();

    assert_eq!(notices.recv().await.unwrap(), request);
    assert_eq!(
        notices.recv().await.unwrap(),
        ServerMessage::HostLeft {
            room_id: RoomId::from("elsewhere")
        }
    );

    h.commands.send(CallCommand::Hangup).unwrap();
    assert_eq!(call.await.unwrap().unwrap(), CallEnd::HungUp);
}
