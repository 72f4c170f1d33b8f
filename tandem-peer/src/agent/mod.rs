mod call_agent;

pub use call_agent::*;
