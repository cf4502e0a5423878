// Domain layer: registry models and the predicate seam. No dependencies beyond serde/chrono.

pub mod model;
pub mod ports;
