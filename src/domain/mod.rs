// Domain layer: run models and the ports the capture loop talks through.

pub mod model;
pub mod ports;
