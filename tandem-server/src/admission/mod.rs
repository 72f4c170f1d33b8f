mod admission_controller;
mod pending_requests;

pub use admission_controller::*;
pub use pending_requests::*;
