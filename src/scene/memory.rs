//! In-memory host scene
//!
//! A self-contained [`SceneAdapter`] implementation: a node hierarchy with
//! display layers, selection sets, namespaces, rest transforms and
//! linearly-interpolated animation tracks. It backs the integration tests
//! and any headless embedding that wants to feed the serializer without a
//! DCC attached.

use glam::DMat4;
use indexmap::IndexMap;

use crate::error::SceneError;
use crate::math::{compose, RotationOrder, Trs};
use crate::scene::{
    LinearUnit, MeshSample, NodeHandle, NodeKind, SceneAdapter, SkinSample, UpAxis,
};

/// Keyable transform channel of a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TrackChannel {
    /// Local translation.
    Translate,
    /// Local euler rotation, in degrees.
    Rotate,
    /// Local scale.
    Scale,
}

#[derive(Debug, Default)]
struct Track {
    // (frame, value), kept sorted by frame.
    keys: Vec<(f64, f64)>,
}

impl Track {
    fn insert(&mut self, frame: f64, value: f64) {
        match self.keys.binary_search_by(|(f, _)| f.total_cmp(&frame)) {
            Ok(at) => self.keys[at].1 = value,
            Err(at) => self.keys.insert(at, (frame, value)),
        }
    }

    fn sample(&self, frame: f64) -> Option<f64> {
        let keys = &self.keys;
        let last = keys.last()?;

        if frame <= keys[0].0 {
            return Some(keys[0].1);
        }
        if frame >= last.0 {
            return Some(last.1);
        }

        let next = keys.partition_point(|(f, _)| *f < frame);
        let (f1, v1) = keys[next];
        let (f0, v0) = keys[next - 1];
        if f1 == f0 {
            return Some(v1);
        }

        let t = (frame - f0) / (f1 - f0);
        Some(v0 + (v1 - v0) * t)
    }
}

#[derive(Debug)]
struct MemoryNode {
    name: String,
    kind: NodeKind,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    rotation_order: RotationOrder,
    rest: Trs,
    bind: Option<Trs>,
    tracks: IndexMap<(TrackChannel, usize), Track>,
    mesh: Option<MeshSample>,
    skin: Option<SkinSample>,
}

/// An in-memory scene graph implementing [`SceneAdapter`].
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: IndexMap<NodeHandle, MemoryNode>,
    layers: IndexMap<String, Vec<NodeHandle>>,
    selection_sets: IndexMap<String, Vec<NodeHandle>>,
    next_handle: NodeHandle,
    current_frame: f64,
    timeline: Option<(f64, f64)>,
    up: Option<UpAxis>,
    unit: Option<LinearUnit>,
    suspended: u32,
}

impl MemoryScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        MemoryScene::default()
    }

    /// Adds a node and returns its handle.
    ///
    /// Use a namespace-qualified name (`"ns:node"`) to place the node in a
    /// namespace.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        parent: Option<NodeHandle>,
    ) -> NodeHandle {
        self.next_handle += 1;
        let handle = self.next_handle;

        if let Some(parent) = parent {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.push(handle);
            }
        }

        self.nodes.insert(
            handle,
            MemoryNode {
                name: name.into(),
                kind,
                parent,
                children: Vec::new(),
                rotation_order: RotationOrder::Xyz,
                rest: Trs::identity(),
                bind: None,
                tracks: IndexMap::new(),
                mesh: None,
                skin: None,
            },
        );

        handle
    }

    /// Mutable access to a node; unknown handles are ignored by the
    /// builder methods below, the way an absent parent is.
    fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut MemoryNode> {
        self.nodes.get_mut(&handle)
    }

    /// Sets a node's rest transform.
    pub fn set_rest(&mut self, handle: NodeHandle, rest: Trs) {
        if let Some(node) = self.node_mut(handle) {
            node.rest = rest;
        }
    }

    /// Sets a node's bind transform; defaults to the rest transform.
    pub fn set_bind(&mut self, handle: NodeHandle, bind: Trs) {
        if let Some(node) = self.node_mut(handle) {
            node.bind = Some(bind);
        }
    }

    /// Sets a node's euler rotation order.
    pub fn set_rotation_order(&mut self, handle: NodeHandle, order: RotationOrder) {
        if let Some(node) = self.node_mut(handle) {
            node.rotation_order = order;
        }
    }

    /// Keys one axis of a transform channel at a frame.
    ///
    /// Rotation values are degrees. Sampling between keys interpolates
    /// linearly; outside the keyed range the nearest key holds.
    pub fn set_key(
        &mut self,
        handle: NodeHandle,
        channel: TrackChannel,
        axis: usize,
        frame: f64,
        value: f64,
    ) {
        if let Some(node) = self.node_mut(handle) {
            node.tracks
                .entry((channel, axis))
                .or_default()
                .insert(frame, value);
        }
    }

    /// Attaches a mesh sample to a node.
    pub fn attach_mesh(&mut self, handle: NodeHandle, mesh: MeshSample) {
        if let Some(node) = self.node_mut(handle) {
            node.mesh = Some(mesh);
        }
    }

    /// Attaches a skin sample to a node.
    pub fn attach_skin(&mut self, handle: NodeHandle, skin: SkinSample) {
        if let Some(node) = self.node_mut(handle) {
            node.skin = Some(skin);
        }
    }

    /// Adds nodes to a display layer.
    pub fn assign_layer(&mut self, layer: impl Into<String>, members: &[NodeHandle]) {
        self.layers
            .entry(layer.into())
            .or_default()
            .extend_from_slice(members);
    }

    /// Adds nodes to a selection set.
    pub fn assign_selection_set(&mut self, set: impl Into<String>, members: &[NodeHandle]) {
        self.selection_sets
            .entry(set.into())
            .or_default()
            .extend_from_slice(members);
    }

    /// Overrides the active timeline range.
    pub fn set_timeline(&mut self, start: f64, end: f64) {
        self.timeline = Some((start, end));
    }

    /// Overrides the world up-axis (defaults to Y).
    pub fn set_up_axis(&mut self, up: UpAxis) {
        self.up = Some(up);
    }

    /// Overrides the authored linear unit (defaults to centimeters).
    pub fn set_linear_unit(&mut self, unit: LinearUnit) {
        self.unit = Some(unit);
    }

    /// Number of outstanding viewport suspensions; zero means drawing.
    pub fn viewport_suspensions(&self) -> u32 {
        self.suspended
    }

    fn sampled_trs(&self, node: &MemoryNode) -> Trs {
        let mut trs = node.rest;
        let frame = self.current_frame;

        for ((channel, axis), track) in &node.tracks {
            let Some(value) = track.sample(frame) else {
                continue;
            };

            let target = match channel {
                TrackChannel::Translate => &mut trs.translation,
                TrackChannel::Rotate => &mut trs.euler_degrees,
                TrackChannel::Scale => &mut trs.scale,
            };

            match axis {
                0 => target.x = value,
                1 => target.y = value,
                _ => target.z = value,
            }
        }

        trs
    }

    fn get(&self, handle: NodeHandle) -> Result<&MemoryNode, SceneError> {
        self.nodes
            .get(&handle)
            .ok_or(SceneError::UnknownHandle(handle))
    }
}

impl SceneAdapter for MemoryScene {
    fn node_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(handle, _)| *handle)
    }

    fn nodes_in_layer(&self, layer: &str) -> Vec<NodeHandle> {
        self.layers.get(layer).cloned().unwrap_or_default()
    }

    fn nodes_in_selection_set(&self, set: &str) -> Vec<NodeHandle> {
        self.selection_sets.get(set).cloned().unwrap_or_default()
    }

    fn nodes(&self) -> Vec<NodeHandle> {
        self.nodes.keys().copied().collect()
    }

    fn children(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        self.nodes
            .get(&handle)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn kind(&self, handle: NodeHandle) -> Result<NodeKind, SceneError> {
        Ok(self.get(handle)?.kind)
    }

    fn name(&self, handle: NodeHandle) -> Result<String, SceneError> {
        Ok(self.get(handle)?.name.clone())
    }

    fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(&handle).and_then(|node| node.parent)
    }

    fn local_matrix(&self, handle: NodeHandle) -> Result<DMat4, SceneError> {
        let node = self.get(handle)?;
        Ok(compose(&self.sampled_trs(node), node.rotation_order))
    }

    fn bind_matrix(&self, handle: NodeHandle) -> Result<DMat4, SceneError> {
        let node = self.get(handle)?;
        let bind = node.bind.unwrap_or(node.rest);
        Ok(compose(&bind, node.rotation_order))
    }

    fn rotation_order(&self, handle: NodeHandle) -> Result<RotationOrder, SceneError> {
        Ok(self.get(handle)?.rotation_order)
    }

    fn mesh(&self, handle: NodeHandle) -> Result<MeshSample, SceneError> {
        let node = self.get(handle)?;
        node.mesh
            .clone()
            .ok_or_else(|| SceneError::MissingMesh(node.name.clone()))
    }

    fn skin(&self, handle: NodeHandle) -> Result<Option<SkinSample>, SceneError> {
        Ok(self.get(handle)?.skin.clone())
    }

    fn current_frame(&self) -> f64 {
        self.current_frame
    }

    fn set_frame(&mut self, frame: f64) {
        self.current_frame = frame;
    }

    fn timeline(&self) -> (f64, f64) {
        self.timeline.unwrap_or((0.0, 1.0))
    }

    fn suspend_viewport(&mut self) {
        self.suspended += 1;
    }

    fn resume_viewport(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    fn up_axis(&self) -> UpAxis {
        self.up.unwrap_or(UpAxis::Y)
    }

    fn linear_unit(&self) -> LinearUnit {
        self.unit.unwrap_or(LinearUnit::Centimeter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn tracks_interpolate_linearly() {
        let mut track = Track::default();
        track.insert(0.0, 0.0);
        track.insert(10.0, 10.0);

        assert_eq!(track.sample(5.0), Some(5.0));
        assert_eq!(track.sample(2.5), Some(2.5));
        assert_eq!(track.sample(-1.0), Some(0.0));
        assert_eq!(track.sample(99.0), Some(10.0));
    }

    #[test]
    fn keyed_channel_overrides_rest() {
        let mut scene = MemoryScene::new();
        let joint = scene.add_node("root", NodeKind::Joint, None);
        scene.set_rest(
            joint,
            Trs {
                translation: DVec3::new(5.0, 6.0, 7.0),
                ..Trs::identity()
            },
        );
        scene.set_key(joint, TrackChannel::Translate, 0, 0.0, 0.0);
        scene.set_key(joint, TrackChannel::Translate, 0, 10.0, 10.0);

        scene.set_frame(4.0);
        let matrix = scene.local_matrix(joint).unwrap();
        assert_eq!(matrix.w_axis.x, 4.0);
        // Unkeyed axes keep the rest pose.
        assert_eq!(matrix.w_axis.y, 6.0);
        assert_eq!(matrix.w_axis.z, 7.0);
    }
}
