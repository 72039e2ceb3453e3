pub mod axes;
pub mod measurement;
pub mod pipeline;
pub mod planes;
pub mod planner;
pub mod schedule;
pub mod structs;

pub use planner::{Planner, PlannerConfig, REQUIRED_LANDMARKS};
pub use structs::{Derived, OffsetState};
