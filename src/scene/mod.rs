mod graph;

pub use graph::{NodeKind, SceneGraph, SceneNode};

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::tracking::ScenePosition;

/// Non-owning reference to a renderable that lives in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RenderHandle(pub u64);

impl fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the tracking core tells the renderer.
///
/// Creating a node does not attach it, the caller decides when it becomes
/// visible. Released handles must not be used again.
pub trait SceneSink {
    fn create_aircraft(&mut self, label: &str) -> RenderHandle;
    fn create_trail(&mut self, capacity: usize) -> RenderHandle;
    fn attach(&mut self, handle: RenderHandle);
    fn detach(&mut self, handle: RenderHandle);
    fn release(&mut self, handle: RenderHandle);
    /// `samples` is the valid range `[0, len)` of the trail.
    fn update_trail_range(&mut self, trail: RenderHandle, samples: &[ScenePosition]);
    fn set_position(&mut self, handle: RenderHandle, position: ScenePosition);
    fn set_yaw(&mut self, handle: RenderHandle, radians: f64);
    fn set_label(&mut self, handle: RenderHandle, label: &str);
}
