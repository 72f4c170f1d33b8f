use tandem_core::IceCandidate;

use crate::negotiation::HealthState;

/// Events the transport emits for the call loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A local candidate was gathered and must be relayed to the remote side.
    LocalCandidate(IceCandidate),

    /// The connection moved to a new health state.
    Health(HealthState),
}
