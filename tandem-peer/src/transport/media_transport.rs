use anyhow::Result;
use async_trait::async_trait;
use tandem_core::{IceCandidate, SessionDescription};

/// The local peer-connection object a [`NegotiationSession`] drives.
///
/// Implementations report asynchronous happenings (local candidates, health
/// changes) through the [`TransportEvent`] channel they were built with.
///
/// [`NegotiationSession`]: crate::NegotiationSession
/// [`TransportEvent`]: crate::TransportEvent
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Adds the local capture tracks. Must succeed before any offer or answer.
    async fn attach_local_media(&self) -> Result<()>;

    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn stop_local_media(&self);

    /// Stops further [`TransportEvent`](crate::TransportEvent)s from being
    /// emitted.
    fn deregister_listeners(&self);

    async fn close(&self) -> Result<()>;
}
