use crate::integration::{create_test_dispatcher, init_tracing};
use crate::utils::{host_with_guest, request_join, respond, room};

#[tokio::test]
async fn test_non_host_response_ignored() {
    init_tracing();

    let (dispatcher, signaling) = create_test_dispatcher();
    let (_alice, bob) = host_with_guest(&dispatcher, "abc").await;
    let carol = request_join(&dispatcher, "abc", "Carol").await;
    signaling.clear().await;

    // Bob is a member but not the host.
    respond(&dispatcher, bob, carol, "abc", true).await;

    assert_eq!(signaling.total().await, 0);
    assert!(!dispatcher.registry().lookup(&room("abc")).unwrap().is_member(&carol));
    assert!(dispatcher.pending().contains(&room("abc"), &carol));
}

#[tokio::test]
async fn test_requester_disconnect_discards_request() {
    init_tracing();

    let (dispatcher, signaling) = create_test_dispatcher();
    let (alice, _bob) = host_with_guest(&dispatcher, "abc").await;
    let carol = request_join(&dispatcher, "abc", "Carol").await;

    dispatcher.disconnect(carol).await;
    signaling.clear().await;
    respond(&dispatcher, alice, carol, "abc", true).await;

    assert_eq!(signaling.total().await, 0);
    assert_eq!(dispatcher.registry().lookup(&room("abc")).unwrap().len(), 2);
}
