pub mod admission;
pub mod app;
pub mod config;
pub mod connection;
pub mod error;
pub mod presence;
pub mod room;
pub mod signaling;

pub use admission::*;
pub use app::build_router;
pub use config::ServerConfig;
pub use connection::*;
pub use error::*;
pub use presence::*;
pub use room::*;
pub use signaling::*;
