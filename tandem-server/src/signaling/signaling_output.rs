use async_trait::async_trait;
use tandem_core::{ConnectionId, ServerMessage};

/// Outbound side of the signaling server: hands a frame to one connection.
///
/// Delivery is fire-and-forget. Implementations drop frames addressed to
/// connections that are already gone.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage);

    async fn deliver_all(&self, recipients: &[ConnectionId], msg: ServerMessage) {
        for to in recipients {
            self.deliver(*to, msg.clone()).await;
        }
    }
}
