//! Read-only view of the host scene
//!
//! The serializer never talks to a DCC directly; everything it needs is
//! behind [`SceneAdapter`]. Host integrations implement the trait, and
//! [`memory::MemoryScene`] provides a complete in-process implementation
//! for tests and headless use.

use glam::{DMat4, DVec2, DVec3, DVec4};
use indexmap::IndexMap;

use crate::error::SceneError;
use crate::math::RotationOrder;

pub mod memory;

/// Stable identifier of a scene node for the duration of one export.
///
/// Handles are opaque and never persisted; a fresh export may hand out a
/// completely different numbering.
pub type NodeHandle = u64;

/// What a scene node fundamentally is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A plain transform with no attribute of interest.
    Transform,
    /// A skeleton joint.
    Joint,
    /// A polygonal mesh.
    Mesh,
    /// A camera.
    Camera,
}

/// World up-axis reported by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UpAxis {
    /// X up.
    X,
    /// Y up.
    Y,
    /// Z up.
    Z,
}

/// Linear unit reported by the host.
///
/// The writer coerces everything to centimeters; this only records what the
/// host said.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LinearUnit {
    /// Millimeters.
    Millimeter,
    /// Centimeters.
    Centimeter,
    /// Meters.
    Meter,
    /// Inches.
    Inch,
    /// Feet.
    Foot,
}

/// One (material, texture) assignment on a mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialAssignment {
    /// Handle of the material node, when the host exposes one.
    pub node: Option<NodeHandle>,
    /// Diffuse texture path; empty when untextured.
    pub texture_path: String,
}

/// A named vertex-color channel in face-vertex order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSet {
    /// Channel name as authored in the host.
    pub name: String,
    /// RGBA values.
    pub colors: Vec<DVec4>,
    /// Per-face-vertex index into `colors`.
    pub face_vertex_indices: Vec<i32>,
}

/// A named UV channel with optional tangent-space vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct UvSet {
    /// Channel name as authored in the host.
    pub name: String,
    /// Unique UV coordinates.
    pub uvs: Vec<DVec2>,
    /// Per-face-vertex index into `uvs`.
    pub face_vertex_indices: Vec<i32>,
    /// Per-face-vertex tangents for this channel, when computed.
    pub tangents: Option<Vec<DVec3>>,
    /// Per-face-vertex binormals for this channel, when computed.
    pub binormals: Option<Vec<DVec3>>,
}

/// A snapshot of one mesh's geometry tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshSample {
    /// Vertex positions.
    pub positions: Vec<DVec3>,
    /// Vertex indices of each face, in face order.
    pub face_vertex_indices: Vec<Vec<u32>>,
    /// Material slot of each face.
    pub face_material_indices: Vec<i32>,
    /// Normals in face-vertex order (flattened across faces).
    pub face_vertex_normals: Vec<DVec3>,
    /// Per-edge smoothing flags, when the host models smoothing on edges.
    pub edge_smoothings: Option<Vec<bool>>,
    /// Per-face smoothing groups, when the host models smoothing on faces.
    pub smoothing_groups: Option<Vec<i32>>,
    /// Named vertex-color channels.
    pub color_sets: Vec<ColorSet>,
    /// Named UV channels.
    pub uv_sets: Vec<UvSet>,
    /// Assigned materials in slot order.
    pub materials: Vec<MaterialAssignment>,
}

impl MeshSample {
    /// Total number of face-vertices across all faces.
    pub fn num_face_vertices(&self) -> usize {
        self.face_vertex_indices.iter().map(Vec::len).sum()
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.face_vertex_indices.len()
    }
}

/// A snapshot of one skin's bindings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkinSample {
    /// Ordered `influence id -> influencing node` map.
    pub influences: IndexMap<u32, NodeHandle>,
    /// `vertex index -> (influence id -> weight)` table. Weights are taken
    /// as authored; no normalization happens downstream.
    pub weights: IndexMap<u32, IndexMap<u32, ordered_float::OrderedFloat<f64>>>,
}

/// Read-only capability set the export pipeline requires of a host scene.
///
/// Every query takes the scene's *current time* into account where that
/// matters (local matrices); [`SceneAdapter::set_frame`] is the only
/// mutation the pipeline performs.
pub trait SceneAdapter {
    /// Resolves a (namespace-qualified) node name to a handle.
    fn node_by_name(&self, name: &str) -> Option<NodeHandle>;

    /// Members of a display layer, in layer order.
    fn nodes_in_layer(&self, layer: &str) -> Vec<NodeHandle>;

    /// Members of a selection set, in set order.
    fn nodes_in_selection_set(&self, set: &str) -> Vec<NodeHandle>;

    /// Every node in the scene, in scene order.
    fn nodes(&self) -> Vec<NodeHandle>;

    /// Direct children of a node, in scene order.
    fn children(&self, handle: NodeHandle) -> Vec<NodeHandle>;

    /// Kind of a node.
    fn kind(&self, handle: NodeHandle) -> Result<NodeKind, SceneError>;

    /// Full (namespace-qualified) name of a node.
    fn name(&self, handle: NodeHandle) -> Result<String, SceneError>;

    /// Parent of a node, if it has one.
    fn parent(&self, handle: NodeHandle) -> Option<NodeHandle>;

    /// Local transform at the current time.
    fn local_matrix(&self, handle: NodeHandle) -> Result<DMat4, SceneError>;

    /// Local bind (rest) transform.
    fn bind_matrix(&self, handle: NodeHandle) -> Result<DMat4, SceneError>;

    /// Euler rotation order of a transform.
    fn rotation_order(&self, handle: NodeHandle) -> Result<RotationOrder, SceneError>;

    /// Geometry snapshot of a mesh node.
    fn mesh(&self, handle: NodeHandle) -> Result<MeshSample, SceneError>;

    /// Skin snapshot of a mesh node, when one is bound.
    fn skin(&self, handle: NodeHandle) -> Result<Option<SkinSample>, SceneError>;

    /// Current frame of the host timeline.
    fn current_frame(&self) -> f64;

    /// Moves the host to the given (possibly fractional) frame.
    fn set_frame(&mut self, frame: f64);

    /// Active timeline range as `(start, end)` frames.
    fn timeline(&self) -> (f64, f64);

    /// Disables viewport redraw for a long-running operation.
    fn suspend_viewport(&mut self);

    /// Re-enables viewport redraw.
    fn resume_viewport(&mut self);

    /// World up-axis.
    fn up_axis(&self) -> UpAxis;

    /// Authored linear unit.
    fn linear_unit(&self) -> LinearUnit;
}

/// Strips the namespace qualifier from a node name.
pub fn short_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(at) => &name[at + 1..],
        None => name,
    }
}
