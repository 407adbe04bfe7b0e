// Domain layer: cart model, operation outcomes and ports to the outside world.

pub mod model;
pub mod outcome;
pub mod ports;
