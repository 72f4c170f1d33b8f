//! Server configuration.
//!
//! Every flag can also be supplied through its `TANDEM_*` environment
//! variable.

use crate::error::ConfigError;
use axum::http::HeaderValue;
use clap::Parser;
use std::fmt;
use std::net::SocketAddr;
use tandem_core::IceServerConfig;
use tandem_core::utils::default_stun_urls;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

#[derive(Clone, Parser)]
#[command(name = "tandem-server", about = "Rendezvous and signaling server for two-party calls")]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    #[arg(long, env = "TANDEM_BIND", default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: SocketAddr,

    /// STUN/TURN urls handed to clients (comma separated). Defaults to
    /// public STUN servers.
    #[arg(long = "ice-server", env = "TANDEM_ICE_SERVERS", value_delimiter = ',')]
    pub ice_servers: Vec<String>,

    #[arg(long, env = "TANDEM_ICE_USERNAME")]
    pub ice_username: Option<String>,

    #[arg(long, env = "TANDEM_ICE_CREDENTIAL", hide_env_values = true)]
    pub ice_credential: Option<String>,

    /// Browser origin allowed by CORS. Any origin when unset.
    #[arg(long, env = "TANDEM_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,
}

/// Redacts the TURN credential.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("ice_servers", &self.ice_servers)
            .field("ice_username", &self.ice_username)
            .field("ice_credential", &self.ice_credential.as_ref().map(|_| "[REDACTED]"))
            .field("allowed_origin", &self.allowed_origin)
            .finish()
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(origin) = &self.allowed_origin {
            self.origin_header(origin)?;
        }

        let has_credentials = self.ice_username.is_some() && self.ice_credential.is_some();
        if let Some(turn) = self
            .ice_servers
            .iter()
            .find(|url| url.starts_with("turn:") || url.starts_with("turns:"))
        {
            if !has_credentials {
                return Err(ConfigError::MissingTurnCredentials(turn.clone()));
            }
        }
        Ok(())
    }

    pub fn allowed_origin_header(&self) -> Result<Option<HeaderValue>, ConfigError> {
        self.allowed_origin
            .as_deref()
            .map(|origin| self.origin_header(origin))
            .transpose()
    }

    fn origin_header(&self, origin: &str) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.to_owned()))
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        if self.ice_servers.is_empty() {
            return vec![IceServerConfig::stun(default_stun_urls())];
        }

        vec![IceServerConfig {
            urls: self.ice_servers.clone(),
            username: self.ice_username.clone(),
            credential: self.ice_credential.clone(),
        }]
    }
}
