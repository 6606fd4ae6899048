pub mod backend;
pub mod gate;

pub use backend::{Backend, ForwardedRequest, ForwardedResponse, HttpBackend, LoginRequest};
pub use gate::{evaluate, Destination, GateDecision, Rule};
