pub mod access;
pub mod headers;

pub use access::access_guard_middleware;
pub use headers::{content_security_policy, csp_layer};
