pub mod error;
pub mod geom;
pub mod landmark;
pub mod model;
pub mod report;

pub use error::{PlanningError, Result};
pub use geom::Rotation;
pub use landmark::{Landmark, LandmarkKey, LandmarkStore};
pub use model::{Axis, ClipSurface, Entity, EntityKey, Plane, Segment};
