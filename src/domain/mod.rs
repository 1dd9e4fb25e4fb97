// Domain layer: request/record models and ports (interfaces).

pub mod model;
pub mod ports;
