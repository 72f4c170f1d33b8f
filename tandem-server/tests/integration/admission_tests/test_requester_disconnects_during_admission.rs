use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tandem_core::{ClientMessage, ConnectionId, ServerMessage};
use tandem_server::{ConnectionTable, Dispatcher, SignalingOutput};

use crate::integration::init_tracing;
use crate::utils::{MockSignalingOutput, host_room, request_join, respond, room};

/// Drops `gone` from the connection table the moment a `peerLeft` frame is
/// delivered, the way its socket task would on a concurrent disconnect.
struct DisconnectOnPeerLeft {
    inner: MockSignalingOutput,
    target: Arc<OnceLock<(ConnectionTable, ConnectionId)>>,
}

#[async_trait]
impl SignalingOutput for DisconnectOnPeerLeft {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage) {
        if let (ServerMessage::PeerLeft { .. }, Some((table, gone))) = (&msg, self.target.get()) {
            table.remove(gone);
        }
        self.inner.deliver(to, msg).await;
    }
}

#[tokio::test]
async fn test_requester_gone_before_assignment_is_rolled_back() {
    init_tracing();

    let signaling = MockSignalingOutput::new_stored_only();
    let target = Arc::new(OnceLock::new());
    let dispatcher = Dispatcher::new(Arc::new(DisconnectOnPeerLeft {
        inner: signaling.clone(),
        target: target.clone(),
    }));

    // Bob sits in Carol's room, then asks Alice for admission elsewhere.
    let carol = host_room(&dispatcher, "first", "Carol").await;
    let bob = request_join(&dispatcher, "first", "Bob").await;
    respond(&dispatcher, carol, bob, "first", true).await;

    let alice = host_room(&dispatcher, "abc", "Alice").await;
    dispatcher
        .handle(
            bob,
            ClientMessage::RequestToJoin {
                room_id: room("abc"),
                name: "Bob".to_string(),
            },
        )
        .await;
    let _ = target.set((dispatcher.connections().clone(), bob));

    // Leaving "first" notifies Carol; Bob's socket dies during that delivery.
    respond(&dispatcher, alice, bob, "abc", true).await;

    assert_eq!(signaling.ops_for(&carol, "peerLeft").await.len(), 1);
    assert!(signaling.ops_for(&alice, "peerJoined").await.is_empty());
    assert!(signaling.ops_for(&bob, "joinResponse").await.iter().all(|msg| {
        !matches!(msg, ServerMessage::JoinResponse { room_id, .. } if *room_id == room("abc"))
    }));

    let snapshot = dispatcher.registry().lookup(&room("abc")).unwrap();
    assert_eq!(snapshot.members(), &[alice]);
    assert!(!dispatcher.connections().contains(&bob));
}

#[tokio::test]
async fn test_disconnect_after_admission_releases_membership() {
    init_tracing();

    let signaling = MockSignalingOutput::new_stored_only();
    let dispatcher = Dispatcher::new(Arc::new(signaling.clone()));

    let alice = host_room(&dispatcher, "abc", "Alice").await;
    let bob = request_join(&dispatcher, "abc", "Bob").await;
    respond(&dispatcher, alice, bob, "abc", true).await;

    dispatcher.disconnect(bob).await;
    dispatcher.disconnect(bob).await;

    assert_eq!(
        signaling.ops_for(&alice, "peerLeft").await,
        vec![ServerMessage::PeerLeft {
            name: "Bob".to_string(),
            socket_id: bob,
        }]
    );
    assert_eq!(
        dispatcher.registry().lookup(&room("abc")).unwrap().members(),
        &[alice]
    );
    assert!(!dispatcher.connections().contains(&bob));
}
