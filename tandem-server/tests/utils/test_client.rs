use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tandem_core::{ClientMessage, ConnectionId, IceServerConfig, ServerMessage};
use tandem_server::{SignalingService, build_router};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts the real HTTP/WebSocket stack on an ephemeral port.
pub async fn spawn_server(ice_servers: Vec<IceServerConfig>) -> Result<(SocketAddr, SignalingService)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let service = SignalingService::new(ice_servers);
    let app = build_router(service.clone(), None);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((addr, service))
}

/// Signaling client speaking the JSON wire protocol over a real socket.
pub struct TestClient {
    /// The id the server assigned in its welcome frame.
    pub id: ConnectionId,
    /// ICE servers announced right after the welcome.
    pub ice_servers: Vec<IceServerConfig>,
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("Failed to open signaling socket")?;

        let mut client = Self {
            id: ConnectionId::new(),
            ice_servers: Vec::new(),
            ws,
        };

        match client.recv().await? {
            ServerMessage::Welcome { socket_id } => client.id = socket_id,
            other => bail!("Expected welcome, got {:?}", other),
        }
        match client.recv().await? {
            ServerMessage::IceConfig { ice_servers } => client.ice_servers = ice_servers,
            other => bail!("Expected iceConfig, got {:?}", other),
        }

        Ok(client)
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.ws.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_owned().into())).await?;
        Ok(())
    }

    /// Next protocol frame, failing after a timeout.
    pub async fn recv(&mut self) -> Result<ServerMessage> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .context("Timed out waiting for a frame")?;

            match frame {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(text.as_str())?),
                Some(Ok(Message::Close(_))) | None => bail!("Socket closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// True if nothing arrives within `wait`.
    pub async fn is_quiet(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.ws.next()).await.is_err()
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
