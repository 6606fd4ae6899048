pub mod access_gate;
pub mod request_id;

pub use access_gate::access_gate_middleware;
pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId};
