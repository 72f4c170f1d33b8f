use crate::signaling::{Dispatcher, SignalingOutput};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{ClientMessage, ConnectionId, IceServerConfig, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Outbound channel of every live WebSocket, keyed by connection.
#[derive(Default)]
pub struct PeerChannels {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

#[async_trait]
impl SignalingOutput for PeerChannels {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage) {
        let Some(peer) = self.peers.get(&to).map(|tx| tx.clone()) else {
            debug!("Dropping {} for disconnected connection {}", msg.op(), to);
            return;
        };
        if peer.send(msg).is_err() {
            debug!("Outbound channel of {} already closed", to);
        }
    }
}

/// Shared state behind the `/ws` endpoint.
#[derive(Clone)]
pub struct SignalingService {
    channels: Arc<PeerChannels>,
    dispatcher: Dispatcher,
    ice_servers: Arc<Vec<IceServerConfig>>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        let channels = Arc::new(PeerChannels::default());
        let dispatcher = Dispatcher::new(channels.clone());

        Self {
            channels,
            dispatcher,
            ice_servers: Arc::new(ice_servers),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.ice_servers.as_ref().clone()
    }

    /// Registers a fresh connection and greets it with its id and the ICE
    /// servers to use.
    pub fn connect(&self, tx: mpsc::UnboundedSender<ServerMessage>) -> ConnectionId {
        let conn = ConnectionId::new();
        self.dispatcher.connect(conn);

        let _ = tx.send(ServerMessage::Welcome { socket_id: conn });
        let _ = tx.send(ServerMessage::IceConfig {
            ice_servers: self.get_ice_servers(),
        });
        self.channels.peers.insert(conn, tx);

        info!("Connection {} opened", conn);
        conn
    }

    pub async fn handle(&self, conn: ConnectionId, msg: ClientMessage) {
        self.dispatcher.handle(conn, msg).await;
    }

    /// Runs presence cleanup first so the leaving connection's peers are told
    /// before its own channel goes away.
    pub async fn disconnect(&self, conn: ConnectionId) {
        self.dispatcher.disconnect(conn).await;
        self.channels.peers.remove(&conn);
        info!("Connection {} closed", conn);
    }

    pub fn connection_count(&self) -> usize {
        self.channels.peers.len()
    }
}
