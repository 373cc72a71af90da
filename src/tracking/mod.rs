mod entity;
mod error;
mod motion;
mod projection;
mod table;
mod trail;
mod types;

pub use entity::{AircraftEntity, Liveness};
pub use error::TrackingError;
pub use motion::{MotionConfig, MotionIntegrator};
pub use projection::{ProjectionConfig, Projector, ScenePosition};
pub use table::{IngestReport, LivenessPolicy, SweepReport, TrackingTable};
pub use trail::TrailConfig;
pub use types::{AircraftId, TelemetryRecord};
