use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::{RenderHandle, SceneSink};
use crate::tracking::ScenePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Aircraft,
    Trail,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SceneNode {
    pub handle: RenderHandle,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip)]
    pub attached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<ScenePosition>,
    pub yaw_rad: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trail: Vec<ScenePosition>,
}

impl SceneNode {
    fn new(handle: RenderHandle, kind: NodeKind, label: Option<String>) -> Self {
        Self {
            handle,
            kind,
            label,
            attached: false,
            position: None,
            yaw_rad: 0.0,
            trail: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    next_handle: u64,
    nodes: BTreeMap<RenderHandle, SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, handle: RenderHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn is_attached(&self, handle: RenderHandle) -> bool {
        self.node(handle).is_some_and(|n| n.attached)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn visible(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values().filter(|n| n.attached)
    }

    fn insert(&mut self, kind: NodeKind, label: Option<String>) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.nodes.insert(handle, SceneNode::new(handle, kind, label));
        handle
    }

    fn with_node(&mut self, handle: RenderHandle, f: impl FnOnce(&mut SceneNode)) {
        match self.nodes.get_mut(&handle) {
            Some(node) => f(node),
            None => log::debug!("ignoring update of unknown scene node {}", handle),
        }
    }
}

impl SceneSink for SceneGraph {
    fn create_aircraft(&mut self, label: &str) -> RenderHandle {
        self.insert(NodeKind::Aircraft, Some(label.to_string()))
    }

    fn create_trail(&mut self, capacity: usize) -> RenderHandle {
        let handle = self.insert(NodeKind::Trail, None);
        self.with_node(handle, |n| n.trail.reserve(capacity));
        handle
    }

    fn attach(&mut self, handle: RenderHandle) {
        self.with_node(handle, |n| n.attached = true);
    }

    fn detach(&mut self, handle: RenderHandle) {
        self.with_node(handle, |n| n.attached = false);
    }

    fn release(&mut self, handle: RenderHandle) {
        self.nodes.remove(&handle);
    }

    fn update_trail_range(&mut self, trail: RenderHandle, samples: &[ScenePosition]) {
        self.with_node(trail, |n| {
            n.trail.clear();
            n.trail.extend_from_slice(samples);
        });
    }

    fn set_position(&mut self, handle: RenderHandle, position: ScenePosition) {
        self.with_node(handle, |n| n.position = Some(position));
    }

    fn set_yaw(&mut self, handle: RenderHandle, radians: f64) {
        self.with_node(handle, |n| n.yaw_rad = radians);
    }

    fn set_label(&mut self, handle: RenderHandle, label: &str) {
        self.with_node(handle, |n| n.label = Some(label.to_string()));
    }
}
