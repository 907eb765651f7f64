// Domain layer: models, analysis shapes and ports. No HTTP or filesystem access here.

pub mod analysis;
pub mod model;
pub mod ports;
