use std::time::Duration;

/// Delay between `peerJoined` and the host's first offer, leaving the guest
/// time to attach its media.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2000);

pub const DEFAULT_MAX_RESTARTS: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct NegotiationConfig {
    pub settle_delay: Duration,
    /// ICE restarts allowed before the call is declared failed. Reset every
    /// time the transport reports `connected`.
    pub max_restarts: u32,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_restarts: DEFAULT_MAX_RESTARTS,
        }
    }
}
