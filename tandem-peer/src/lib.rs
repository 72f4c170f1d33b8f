pub mod agent;
pub mod client;
pub mod error;
pub mod negotiation;
pub mod transport;

pub use agent::*;
pub use client::*;
pub use error::*;
pub use negotiation::*;
pub use transport::*;
