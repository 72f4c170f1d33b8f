use futures::{SinkExt, StreamExt};
use tandem_core::{ClientMessage, ConnectionId, IceServerConfig, RoomId, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::PeerError;

/// WebSocket connection to a tandem signaling server.
///
/// Frames are pumped by two background tasks; the client itself only holds
/// the typed channel ends. Dropping every sender closes the socket.
pub struct SignalingClient {
    socket_id: ConnectionId,
    ice_servers: Vec<IceServerConfig>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    inbound: mpsc::UnboundedReceiver<ServerMessage>,
}

impl SignalingClient {
    /// Connects and waits for the server's greeting (`welcome`, then
    /// `iceConfig`).
    pub async fn connect(url: &str) -> Result<Self, PeerError> {
        let (ws_stream, _) = connect_async(url).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let mut socket_id = None;
        let mut ice_servers = None;
        while socket_id.is_none() || ice_servers.is_none() {
            let frame = ws_receiver.next().await.ok_or(PeerError::SignalingClosed)??;
            let Message::Text(text) = frame else {
                continue;
            };
            match serde_json::from_str::<ServerMessage>(text.as_str()) {
                Ok(ServerMessage::Welcome { socket_id: id }) => socket_id = Some(id),
                Ok(ServerMessage::IceConfig { ice_servers: servers }) => {
                    ice_servers = Some(servers)
                }
                Ok(other) => {
                    return Err(PeerError::Protocol(format!(
                        "expected greeting, got {}",
                        other.op()
                    )));
                }
                Err(e) => warn!("Invalid ServerMessage: {}", e),
            }
        }
        let (Some(socket_id), Some(ice_servers)) = (socket_id, ice_servers) else {
            return Err(PeerError::SignalingClosed);
        };
        info!("Connected to {} as {}", url, socket_id);

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel::<ServerMessage>();

        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize {}: {}", msg.op(), e);
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = ws_sender.close().await;
        });

        tokio::spawn(async move {
            while let Some(Ok(frame)) = ws_receiver.next().await {
                match frame {
                    Message::Text(text) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => {
                                if inbound_tx.send(msg).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Invalid ServerMessage: {}", e),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            debug!("Signaling socket closed");
        });

        Ok(Self {
            socket_id,
            ice_servers,
            outbound,
            inbound,
        })
    }

    pub fn socket_id(&self) -> ConnectionId {
        self.socket_id
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<ClientMessage> {
        self.outbound.clone()
    }

    pub fn send(&self, msg: ClientMessage) -> Result<(), PeerError> {
        self.outbound
            .send(msg)
            .map_err(|_| PeerError::SignalingClosed)
    }

    pub async fn recv(&mut self) -> Result<ServerMessage, PeerError> {
        self.inbound.recv().await.ok_or(PeerError::SignalingClosed)
    }

    /// Creates `room_id` with this connection as host.
    pub async fn create_room(&mut self, room_id: &RoomId, name: &str) -> Result<(), PeerError> {
        self.send(ClientMessage::CreateRoom {
            room_id: room_id.clone(),
            name: name.to_owned(),
        })?;

        loop {
            match self.recv().await? {
                ServerMessage::RoomCreated { room_id: created } if created == *room_id => {
                    return Ok(());
                }
                ServerMessage::RoomAlreadyExists { room_id: taken } if taken == *room_id => {
                    return Err(PeerError::RoomAlreadyExists(taken));
                }
                other => debug!("Skipping {} while creating room", other.op()),
            }
        }
    }

    /// Asks the host of `room_id` for admission and waits for the verdict.
    pub async fn request_join(&mut self, room_id: &RoomId, name: &str) -> Result<(), PeerError> {
        self.send(ClientMessage::RequestToJoin {
            room_id: room_id.clone(),
            name: name.to_owned(),
        })?;

        loop {
            match self.recv().await? {
                ServerMessage::JoinResponse {
                    allow,
                    room_id: answered,
                } if answered == *room_id => {
                    return if allow {
                        Ok(())
                    } else {
                        Err(PeerError::AdmissionRejected(answered))
                    };
                }
                ServerMessage::RoomNotFound { room_id: missing } if missing == *room_id => {
                    return Err(PeerError::RoomNotFound(missing));
                }
                other => debug!("Skipping {} while waiting for admission", other.op()),
            }
        }
    }

    /// Splits the client into its raw channel ends for a [`CallAgent`].
    ///
    /// [`CallAgent`]: crate::CallAgent
    pub fn into_channels(
        self,
    ) -> (
        mpsc::UnboundedSender<ClientMessage>,
        mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        (self.outbound, self.inbound)
    }
}
