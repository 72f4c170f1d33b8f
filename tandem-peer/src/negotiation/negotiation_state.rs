use std::fmt;

use tandem_core::Role;

/// Which side of the offer/answer exchange this client plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Offerer,
    Answerer,
}

impl NegotiationRole {
    /// The host offers once a guest has joined; everyone else answers.
    pub fn for_room_role(role: Role) -> Self {
        match role {
            Role::Host => NegotiationRole::Offerer,
            Role::Guest | Role::Unassigned => NegotiationRole::Answerer,
        }
    }
}

/// Lifecycle of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Negotiating,
    Connected,
    Failed,
    Closed,
}

/// Offer/answer state as JSEP defines it, restricted to the states a
/// perfect-exchange client can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalingState::Stable => "stable",
            SignalingState::HaveLocalOffer => "have-local-offer",
            SignalingState::HaveRemoteOffer => "have-remote-offer",
        };
        f.write_str(name)
    }
}

/// Connection health as reported by the media transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    New,
    Connecting,
    Connected,
    Failed,
    Closed,
}
