use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{ConnectionId, ServerMessage};
use tandem_server::SignalingOutput;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures every delivered frame.
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel to stream captured frames.
    tx: mpsc::UnboundedSender<(ConnectionId, ServerMessage)>,
    /// All captured frames, in delivery order.
    delivered: Arc<Mutex<Vec<(ConnectionId, ServerMessage)>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(ConnectionId, ServerMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            delivered: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    /// Create a MockSignalingOutput without a receiver (frames are only stored).
    pub fn new_stored_only() -> Self {
        let (signaling, _rx) = Self::new();
        signaling
    }

    /// Every frame delivered to `conn`, oldest first.
    pub async fn delivered_to(&self, conn: &ConnectionId) -> Vec<ServerMessage> {
        self.delivered
            .lock()
            .await
            .iter()
            .filter(|(to, _)| to == conn)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// Frames delivered to `conn` whose op matches.
    pub async fn ops_for(&self, conn: &ConnectionId, op: &str) -> Vec<ServerMessage> {
        self.delivered_to(conn)
            .await
            .into_iter()
            .filter(|msg| msg.op() == op)
            .collect()
    }

    pub async fn total(&self) -> usize {
        self.delivered.lock().await.len()
    }

    pub async fn clear(&self) {
        self.delivered.lock().await.clear();
    }
}

impl Default for MockSignalingOutput {
    fn default() -> Self {
        Self::new_stored_only()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage) {
        tracing::debug!("[MockSignaling] {} -> {}", msg.op(), to);

        self.delivered.lock().await.push((to, msg.clone()));
        let _ = self.tx.send((to, msg));
    }
}
