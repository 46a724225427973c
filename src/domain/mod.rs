// Domain layer: result records, session labels, request shape and ports.

pub mod identifiers;
pub mod model;
pub mod ports;
pub mod request;
pub mod session;
