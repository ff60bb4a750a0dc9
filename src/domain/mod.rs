// Domain layer: entities and the ports the core needs from its collaborators.

pub mod model;
pub mod ports;
