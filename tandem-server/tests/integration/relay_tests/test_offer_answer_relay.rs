use tandem_core::{IceCandidate, ServerMessage, SessionDescription};

use crate::integration::{create_test_dispatcher, init_tracing};
use crate::utils::{answer, candidate, host_with_guest, offer, request_join, respond, room};

#[tokio::test]
async fn test_offer_answer_relay() {
    init_tracing();

    let (dispatcher, signaling) = create_test_dispatcher();
    let (alice, bob) = host_with_guest(&dispatcher, "abc").await;
    signaling.clear().await;

    dispatcher.handle(alice, offer("abc", "offer-sdp", "Alice")).await;
    dispatcher.handle(bob, answer("abc", "answer-sdp", "Bob")).await;

    assert_eq!(
        signaling.delivered_to(&bob).await,
        vec![ServerMessage::Offer {
            offer: SessionDescription::offer("offer-sdp"),
            room_id: room("abc"),
            name: "Alice".to_string(),
        }]
    );
    assert_eq!(
        signaling.delivered_to(&alice).await,
        vec![ServerMessage::Answer {
            answer: SessionDescription::answer("answer-sdp"),
            room_id: room("abc"),
            name: "Bob".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_candidates_keep_sender_order_and_never_echo() {
    init_tracing();

    let (dispatcher, signaling) = create_test_dispatcher();
    let (alice, bob) = host_with_guest(&dispatcher, "abc").await;
    signaling.clear().await;

    for line in ["candidate:1", "candidate:2", "candidate:3"] {
        dispatcher.handle(alice, candidate("abc", line)).await;
    }

    let received: Vec<_> = signaling
        .delivered_to(&bob)
        .await
        .into_iter()
        .map(|msg| match msg {
            ServerMessage::IceCandidate { candidate, .. } => candidate,
            other => panic!("unexpected frame {other:?}"),
        })
        .collect();
    assert_eq!(
        received,
        vec![
            IceCandidate::new("candidate:1"),
            IceCandidate::new("candidate:2"),
            IceCandidate::new("candidate:3"),
        ]
    );
    assert!(signaling.delivered_to(&alice).await.is_empty());
}

#[tokio::test]
async fn test_relay_reaches_every_other_member() {
    init_tracing();

    let (dispatcher, signaling) = create_test_dispatcher();
    let (alice, bob) = host_with_guest(&dispatcher, "abc").await;
    let carol = request_join(&dispatcher, "abc", "Carol").await;
    respond(&dispatcher, alice, carol, "abc", true).await;
    signaling.clear().await;

    dispatcher.handle(bob, offer("abc", "sdp", "Bob")).await;

    assert_eq!(signaling.ops_for(&alice, "offer").await.len(), 1);
    assert_eq!(signaling.ops_for(&carol, "offer").await.len(), 1);
    assert!(signaling.delivered_to(&bob).await.is_empty());
}
