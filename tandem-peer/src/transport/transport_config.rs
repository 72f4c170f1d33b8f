use tandem_core::IceServerConfig;
use tandem_core::utils::default_stun_urls;

/// Configuration for the WebRTC transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl TransportConfig {
    /// Uses the servers announced by the signaling server, falling back to
    /// the public STUN defaults when the list is empty.
    pub fn from_announced(ice_servers: Vec<IceServerConfig>) -> Self {
        if ice_servers.is_empty() {
            Self::default()
        } else {
            Self { ice_servers }
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(default_stun_urls())],
        }
    }
}
