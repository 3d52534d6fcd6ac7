//! Export configuration data model
//!
//! These types hold the settings an export reads; they carry no behavior of
//! their own beyond defaulting. The serializer and gatherer consume them
//! read-only.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// How an object-set pattern list resolves to scene nodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ObjectSetType {
    /// Patterns are node names.
    Nodes = 0,
    /// Patterns are display-layer names.
    Layers = 1,
    /// Patterns are selection-set names.
    SelectionSets = 2,
    /// Patterns are regular expressions matched against short node names.
    Regex = 3,
}

impl Default for ObjectSetType {
    fn default() -> Self {
        ObjectSetType::Nodes
    }
}

/// A named group of include/exclude patterns resolving to scene nodes.
///
/// The set's own `name` acts as an implicit first include pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectSet {
    /// Name of this set; doubles as the implicit root pattern.
    pub name: String,
    /// How `include_objects` resolves.
    pub include_type: ObjectSetType,
    /// Patterns for nodes to include.
    pub include_objects: Vec<String>,
    /// Whether included nodes also pull in their descendants (`Nodes` mode only).
    pub include_children: bool,
    /// How `exclude_objects` resolves.
    pub exclude_type: ObjectSetType,
    /// Patterns for nodes to exclude.
    pub exclude_objects: Vec<String>,
    /// Whether excluded nodes also push out their descendants (`Nodes` mode only).
    pub exclude_children: bool,
}

impl ObjectSet {
    /// Creates an empty set with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        ObjectSet {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for ObjectSet {
    fn default() -> Self {
        ObjectSet {
            name: String::new(),
            include_type: ObjectSetType::Nodes,
            include_objects: Vec::new(),
            include_children: false,
            exclude_type: ObjectSetType::Nodes,
            exclude_objects: Vec::new(),
            exclude_children: false,
        }
    }
}

/// Geometry-inclusion switches carried next to the mesh object-set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshSettings {
    /// Emit a face-vertex normal element.
    pub include_normals: bool,
    /// Emit edge smoothings or smoothing groups.
    pub include_smoothings: bool,
    /// Emit vertex-color elements for every named color set.
    pub include_color_sets: bool,
    /// Emit tangent/binormal elements per UV set (requires `include_normals`).
    pub include_tangents_and_binormals: bool,
    /// Emit a skin deformer for skinned meshes.
    pub include_skins: bool,
    /// Observed but unsupported; logged and skipped.
    pub include_blendshapes: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        MeshSettings {
            include_normals: true,
            include_smoothings: true,
            include_color_sets: false,
            include_tangents_and_binormals: false,
            include_skins: true,
            include_blendshapes: false,
        }
    }
}

/// A named grouping of skeleton, mesh and camera sets for one FBX output.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportSet {
    /// Display name; also the default file stem.
    pub name: String,
    /// Export scale, consumed by the builtin-export path only.
    pub scale: f64,
    /// Re-root exported nodes at the origin (builtin-export post-pass).
    pub move_to_origin: bool,
    /// Strip display layers in the builtin-export post-pass.
    pub remove_display_layers: bool,
    /// Strip containers in the builtin-export post-pass.
    pub remove_containers: bool,
    /// Joints to export.
    pub skeleton: ObjectSet,
    /// Cameras to export.
    pub camera: ObjectSet,
    /// Meshes to export.
    pub mesh: ObjectSet,
    /// Geometry-inclusion switches for `mesh`.
    pub mesh_settings: MeshSettings,
}

impl Default for ExportSet {
    fn default() -> Self {
        ExportSet {
            name: String::new(),
            scale: 1.0,
            move_to_origin: false,
            remove_display_layers: true,
            remove_containers: true,
            skeleton: ObjectSet::default(),
            camera: ObjectSet::default(),
            mesh: ObjectSet::default(),
            mesh_settings: MeshSettings::default(),
        }
    }
}

/// An animation take bound to an export set for baking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportRange {
    /// Display name; also the default file stem.
    pub name: String,
    /// First baked frame.
    pub start_frame: f64,
    /// Last baked frame.
    pub end_frame: f64,
    /// Frame increment; fractional steps produce sub-frame keys.
    pub step: f64,
    /// Use the host's active timeline instead of `start_frame`/`end_frame`.
    pub use_timeline: bool,
    /// Replace root-level motion with the bind transform after baking.
    pub move_to_origin: bool,
    /// Ordinal of the export set this range bakes, within its asset.
    pub export_set_id: usize,
}

impl Default for ExportRange {
    fn default() -> Self {
        ExportRange {
            name: String::new(),
            start_frame: 0.0,
            end_frame: 1.0,
            step: 1.0,
            use_timeline: true,
            move_to_origin: false,
            export_set_id: 0,
        }
    }
}
