mod candidate_queue;
mod negotiation_config;
mod negotiation_session;
mod negotiation_state;

pub use candidate_queue::*;
pub use negotiation_config::*;
pub use negotiation_session::*;
pub use negotiation_state::*;
