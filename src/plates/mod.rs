pub mod seed;
pub mod grow;
pub mod properties;
pub mod boundary;
pub mod distance;
pub mod slope;

pub use boundary::{BoundaryStats, Interaction};
pub use properties::{Craton, PlateType, UNASSIGNED};
