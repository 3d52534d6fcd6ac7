//! FBX document assembly and emission
//!
//! [`FbxDocument`] owns the object table, the connection list and the
//! global settings, and lowers the whole scene into the raw record tree
//! the writers emit. It is plain owned data: one document per export,
//! dropped with its serializer, nothing process-wide.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::DMat4;
use indexmap::IndexMap;
use log::info;

use crate::error::{Error, StructuralError};
use crate::objects::{
    AnimCurve, AnimCurveNode, AnimLayer, AnimStack, BindPose, Cluster, Connection, ConnectionKind,
    FbxObject, Geometry, Material, Model, ModelKind, NodeAttribute, NodeAttributeKind, ObjectId,
    ObjectNode, Skin, Texture,
};
use crate::scene::UpAxis;
use crate::time::{FbxTime, TimeMode};
use crate::tree::{ascii, binary, Attribute, RawNode};
use crate::version::{FileFormat, FileVersion};

/// Creator string stamped into every file.
///
/// Fixed (no timestamp) so identical documents produce identical bytes.
const CREATOR: &str = concat!("fbxport ", env!("CARGO_PKG_VERSION"));

const FILE_ID: [u8; 16] = [
    0x28, 0xb3, 0x2a, 0xeb, 0xb6, 0x24, 0xcc, 0xc2, 0xbf, 0xc8, 0xb0, 0x2a, 0xa9, 0x2b, 0xfc, 0xf1,
];

/// First id handed out to document objects.
const FIRST_OBJECT_ID: i64 = 100_000_000;

/// Axis triple `(axis, sign)` entries for the global settings.
fn axis_settings(up: UpAxis) -> [(i32, i32); 3] {
    // (up, front, coord), each with its sign.
    match up {
        UpAxis::X => [(0, 1), (2, 1), (1, 1)],
        UpAxis::Y => [(1, 1), (2, 1), (0, 1)],
        UpAxis::Z => [(2, 1), (1, -1), (0, 1)],
    }
}

/// An FBX scene being assembled for emission.
#[derive(Debug)]
pub struct FbxDocument {
    objects: IndexMap<ObjectId, FbxObject>,
    connections: Vec<Connection>,
    up_axis: UpAxis,
    time_mode: TimeMode,
    time_span: (FbxTime, FbxTime),
    active_stack: Option<ObjectId>,
    next_id: i64,
}

impl Default for FbxDocument {
    fn default() -> Self {
        FbxDocument::new()
    }
}

impl FbxDocument {
    /// Creates an empty document with Y-up axes and the default time mode.
    pub fn new() -> Self {
        FbxDocument {
            objects: IndexMap::new(),
            connections: Vec::new(),
            up_axis: UpAxis::Y,
            time_mode: TimeMode::default(),
            time_span: (FbxTime(0), FbxTime(0)),
            active_stack: None,
            next_id: FIRST_OBJECT_ID,
        }
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Sets the world up-axis written to the global settings.
    pub fn set_up_axis(&mut self, up: UpAxis) {
        self.up_axis = up;
    }

    /// The world up-axis.
    pub fn up_axis(&self) -> UpAxis {
        self.up_axis
    }

    /// Sets the frame-rate mode written to the global settings.
    pub fn set_time_mode(&mut self, mode: TimeMode) {
        self.time_mode = mode;
    }

    /// The frame-rate mode.
    pub fn time_mode(&self) -> TimeMode {
        self.time_mode
    }

    /// Sets the default time span, mirrored onto the active stack.
    pub fn set_time_span(&mut self, start: FbxTime, stop: FbxTime) {
        self.time_span = (start, stop);
        if let Some(stack) = self.active_stack {
            if let Some(FbxObject::AnimStack(stack)) = self.objects.get_mut(&stack) {
                stack.span = (start, stop);
            }
        }
    }

    /// The default time span.
    pub fn time_span(&self) -> (FbxTime, FbxTime) {
        self.time_span
    }

    /// Marks a stack as the scene's current one.
    pub fn set_active_stack(&mut self, stack: ObjectId) {
        self.active_stack = Some(stack);
    }

    /// The current stack, if one was set.
    pub fn active_stack(&self) -> Option<ObjectId> {
        self.active_stack
    }

    /// Adds a model node.
    pub fn add_model(&mut self, name: impl Into<String>, kind: ModelKind) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::Model(Model::new(id, name, kind)));
        id
    }

    /// Adds a node attribute object.
    pub fn add_node_attribute(
        &mut self,
        name: impl Into<String>,
        kind: NodeAttributeKind,
    ) -> ObjectId {
        let id = self.allocate_id();
        self.objects.insert(
            id,
            FbxObject::NodeAttribute(NodeAttribute::new(id, name, kind)),
        );
        id
    }

    /// Adds an empty mesh geometry.
    pub fn add_geometry(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::Geometry(Geometry::new(id, name)));
        id
    }

    /// Adds a Lambert material.
    pub fn add_material(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::Material(Material::new(id, name)));
        id
    }

    /// Adds a file texture.
    pub fn add_texture(
        &mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
    ) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::Texture(Texture::new(id, name, file_name)));
        id
    }

    /// Adds a skin deformer.
    pub fn add_skin(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects.insert(id, FbxObject::Skin(Skin::new(id, name)));
        id
    }

    /// Adds a skin cluster.
    pub fn add_cluster(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::Cluster(Cluster::new(id, name)));
        id
    }

    /// Adds a bind pose.
    pub fn add_bind_pose(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::BindPose(BindPose::new(id, name)));
        id
    }

    /// Adds an animation stack.
    pub fn add_anim_stack(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::AnimStack(AnimStack::new(id, name)));
        id
    }

    /// Adds an animation layer.
    pub fn add_anim_layer(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::AnimLayer(AnimLayer::new(id, name)));
        id
    }

    /// Adds a per-channel curve node.
    pub fn add_curve_node(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::AnimCurveNode(AnimCurveNode::new(id, name)));
        id
    }

    /// Adds a sampled curve.
    pub fn add_anim_curve(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocate_id();
        self.objects
            .insert(id, FbxObject::AnimCurve(AnimCurve::new(id, name)));
        id
    }

    /// Connects two objects (`child` flows into `parent`).
    pub fn connect_oo(&mut self, child: ObjectId, parent: ObjectId) {
        self.connections.push(Connection {
            kind: ConnectionKind::ObjectObject,
            child,
            parent,
        });
    }

    /// Connects an object to a named property of another object.
    pub fn connect_op(&mut self, child: ObjectId, parent: ObjectId, property: impl Into<String>) {
        self.connections.push(Connection {
            kind: ConnectionKind::ObjectProperty(property.into()),
            child,
            parent,
        });
    }

    /// Parents a model under another model, or under the scene root.
    ///
    /// Any previous model-parent connection is dropped first, so relinking
    /// is idempotent.
    pub fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) {
        let is_model_parent = |document: &Self, connection: &Connection| {
            connection.child == child
                && connection.kind == ConnectionKind::ObjectObject
                && (connection.parent == ObjectId::ROOT
                    || matches!(
                        document.objects.get(&connection.parent),
                        Some(FbxObject::Model(_))
                    ))
        };

        let mut index = 0;
        while index < self.connections.len() {
            if is_model_parent(self, &self.connections[index]) {
                self.connections.remove(index);
            } else {
                index += 1;
            }
        }

        self.connect_oo(child, parent.unwrap_or(ObjectId::ROOT));
    }

    /// Model parent of a model; [`ObjectId::ROOT`] when unparented.
    pub fn parent_of(&self, child: ObjectId) -> ObjectId {
        self.connections
            .iter()
            .find(|connection| {
                connection.child == child
                    && connection.kind == ConnectionKind::ObjectObject
                    && (connection.parent == ObjectId::ROOT
                        || matches!(
                            self.objects.get(&connection.parent),
                            Some(FbxObject::Model(_))
                        ))
            })
            .map(|connection| connection.parent)
            .unwrap_or(ObjectId::ROOT)
    }

    /// Models connected directly under the scene root.
    pub fn children_of_root(&self) -> Vec<ObjectId> {
        self.connections
            .iter()
            .filter(|connection| {
                connection.parent == ObjectId::ROOT
                    && connection.kind == ConnectionKind::ObjectObject
                    && matches!(self.objects.get(&connection.child), Some(FbxObject::Model(_)))
            })
            .map(|connection| connection.child)
            .collect()
    }

    /// Evaluates a model's global transform from the document hierarchy.
    pub fn global_transform(&self, model: ObjectId) -> Result<DMat4, StructuralError> {
        let mut matrix = self.model(model)?.local_matrix();
        let mut current = model;

        // Bounded walk so a malformed cycle cannot spin forever.
        for _ in 0..256 {
            let parent = self.parent_of(current);
            if parent == ObjectId::ROOT {
                return Ok(matrix);
            }
            matrix = self.model(parent)?.local_matrix() * matrix;
            current = parent;
        }

        Ok(matrix)
    }

    /// Curve nodes attached to any property of a model.
    pub fn curve_nodes_of(&self, model: ObjectId) -> Vec<ObjectId> {
        self.connections
            .iter()
            .filter(|connection| {
                connection.parent == model
                    && matches!(connection.kind, ConnectionKind::ObjectProperty(_))
                    && matches!(
                        self.objects.get(&connection.child),
                        Some(FbxObject::AnimCurveNode(_))
                    )
            })
            .map(|connection| connection.child)
            .collect()
    }

    /// Curves feeding a curve node.
    pub fn curves_of(&self, curve_node: ObjectId) -> Vec<ObjectId> {
        self.connections
            .iter()
            .filter(|connection| {
                connection.parent == curve_node
                    && matches!(
                        self.objects.get(&connection.child),
                        Some(FbxObject::AnimCurve(_))
                    )
            })
            .map(|connection| connection.child)
            .collect()
    }

    /// Removes an object and every connection touching it.
    pub fn remove_object(&mut self, id: ObjectId) {
        self.objects.shift_remove(&id);
        self.connections
            .retain(|connection| connection.child != id && connection.parent != id);
    }

    /// All objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = &FbxObject> {
        self.objects.values()
    }

    /// All connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Typed access to a model.
    pub fn model(&self, id: ObjectId) -> Result<&Model, StructuralError> {
        match self.objects.get(&id) {
            Some(FbxObject::Model(model)) => Ok(model),
            _ => Err(StructuralError::WrongObjectClass(id.0, "Model")),
        }
    }

    /// Mutable typed access to a model.
    pub fn model_mut(&mut self, id: ObjectId) -> Result<&mut Model, StructuralError> {
        match self.objects.get_mut(&id) {
            Some(FbxObject::Model(model)) => Ok(model),
            _ => Err(StructuralError::WrongObjectClass(id.0, "Model")),
        }
    }

    /// Typed access to a geometry.
    pub fn geometry(&self, id: ObjectId) -> Result<&Geometry, StructuralError> {
        match self.objects.get(&id) {
            Some(FbxObject::Geometry(geometry)) => Ok(geometry),
            _ => Err(StructuralError::WrongObjectClass(id.0, "Geometry")),
        }
    }

    /// Mutable typed access to a geometry.
    pub fn geometry_mut(&mut self, id: ObjectId) -> Result<&mut Geometry, StructuralError> {
        match self.objects.get_mut(&id) {
            Some(FbxObject::Geometry(geometry)) => Ok(geometry),
            _ => Err(StructuralError::WrongObjectClass(id.0, "Geometry")),
        }
    }

    /// Mutable typed access to a cluster.
    pub fn cluster_mut(&mut self, id: ObjectId) -> Result<&mut Cluster, StructuralError> {
        match self.objects.get_mut(&id) {
            Some(FbxObject::Cluster(cluster)) => Ok(cluster),
            _ => Err(StructuralError::WrongObjectClass(id.0, "Cluster")),
        }
    }

    /// Mutable typed access to a bind pose.
    pub fn bind_pose_mut(&mut self, id: ObjectId) -> Result<&mut BindPose, StructuralError> {
        match self.objects.get_mut(&id) {
            Some(FbxObject::BindPose(pose)) => Ok(pose),
            _ => Err(StructuralError::WrongObjectClass(id.0, "BindPose")),
        }
    }

    /// Typed access to a curve.
    pub fn anim_curve(&self, id: ObjectId) -> Result<&AnimCurve, StructuralError> {
        match self.objects.get(&id) {
            Some(FbxObject::AnimCurve(curve)) => Ok(curve),
            _ => Err(StructuralError::WrongObjectClass(id.0, "AnimCurve")),
        }
    }

    /// Mutable typed access to a curve.
    pub fn anim_curve_mut(&mut self, id: ObjectId) -> Result<&mut AnimCurve, StructuralError> {
        match self.objects.get_mut(&id) {
            Some(FbxObject::AnimCurve(curve)) => Ok(curve),
            _ => Err(StructuralError::WrongObjectClass(id.0, "AnimCurve")),
        }
    }

    /// Mutable typed access to a curve node.
    pub fn curve_node_mut(&mut self, id: ObjectId) -> Result<&mut AnimCurveNode, StructuralError> {
        match self.objects.get_mut(&id) {
            Some(FbxObject::AnimCurveNode(node)) => Ok(node),
            _ => Err(StructuralError::WrongObjectClass(id.0, "AnimCurveNode")),
        }
    }

    fn header_extension(&self, version: FileVersion) -> RawNode {
        let timestamp = RawNode::new("CreationTimeStamp")
            .child(RawNode::with("Version", vec![Attribute::I32(1000)]))
            .child(RawNode::with("Year", vec![Attribute::I32(1970)]))
            .child(RawNode::with("Month", vec![Attribute::I32(1)]))
            .child(RawNode::with("Day", vec![Attribute::I32(1)]))
            .child(RawNode::with("Hour", vec![Attribute::I32(0)]))
            .child(RawNode::with("Minute", vec![Attribute::I32(0)]))
            .child(RawNode::with("Second", vec![Attribute::I32(0)]))
            .child(RawNode::with("Millisecond", vec![Attribute::I32(0)]));

        RawNode::new("FBXHeaderExtension")
            .child(RawNode::with("FBXHeaderVersion", vec![Attribute::I32(1003)]))
            .child(RawNode::with(
                "FBXVersion",
                vec![Attribute::I32(u32::from(version) as i32)],
            ))
            .child(RawNode::with("EncryptionType", vec![Attribute::I32(0)]))
            .child(timestamp)
            .child(RawNode::with("Creator", vec![Attribute::from(CREATOR)]))
    }

    fn global_settings(&self) -> RawNode {
        use crate::objects::{p_double, p_enum, p_int, p_ktime};

        let [(up, up_sign), (front, front_sign), (coord, coord_sign)] =
            axis_settings(self.up_axis);

        let properties = crate::objects::properties70(vec![
            p_int("UpAxis", up),
            p_int("UpAxisSign", up_sign),
            p_int("FrontAxis", front),
            p_int("FrontAxisSign", front_sign),
            p_int("CoordAxis", coord),
            p_int("CoordAxisSign", coord_sign),
            p_int("OriginalUpAxis", -1),
            p_int("OriginalUpAxisSign", 1),
            // Centimeters; non-centimeter sources are coerced upstream.
            p_double("UnitScaleFactor", 1.0),
            p_double("OriginalUnitScaleFactor", 1.0),
            p_enum("TimeMode", i32::from(self.time_mode)),
            p_ktime("TimeSpanStart", self.time_span.0),
            p_ktime("TimeSpanStop", self.time_span.1),
            p_double("CustomFrameRate", -1.0),
        ]);

        RawNode::new("GlobalSettings")
            .child(RawNode::with("Version", vec![Attribute::I32(1000)]))
            .child(properties)
    }

    fn active_stack_name(&self) -> String {
        self.active_stack
            .and_then(|id| self.objects.get(&id))
            .map(|stack| stack.name().to_string())
            .unwrap_or_default()
    }

    fn documents_section(&self) -> RawNode {
        let properties = crate::objects::properties70(vec![crate::objects::p_string(
            "ActiveAnimStackName",
            &self.active_stack_name(),
        )]);

        RawNode::new("Documents")
            .child(RawNode::with("Count", vec![Attribute::I32(1)]))
            .child(
                RawNode::with(
                    "Document",
                    vec![
                        Attribute::I64(self.next_id),
                        crate::tree::name_class("", "Document"),
                        Attribute::from("Scene"),
                    ],
                )
                .child(properties)
                .child(RawNode::with("RootNode", vec![Attribute::I64(0)])),
            )
    }

    fn definitions(&self) -> RawNode {
        let mut counts: IndexMap<&'static str, i32> = IndexMap::new();
        counts.insert("GlobalSettings", 1);
        for object in self.objects.values() {
            *counts.entry(object.record_class()).or_insert(0) += 1;
        }

        let total: i32 = counts.values().sum();
        let mut node = RawNode::new("Definitions")
            .child(RawNode::with("Version", vec![Attribute::I32(100)]))
            .child(RawNode::with("Count", vec![Attribute::I32(total)]));

        for (class, count) in counts {
            node.push(
                RawNode::with("ObjectType", vec![Attribute::from(class)])
                    .child(RawNode::with("Count", vec![Attribute::I32(count)])),
            );
        }

        node
    }

    fn takes(&self) -> RawNode {
        let mut node = RawNode::new("Takes").child(RawNode::with(
            "Current",
            vec![Attribute::from(self.active_stack_name().as_str())],
        ));

        if let Some(FbxObject::AnimStack(stack)) =
            self.active_stack.and_then(|id| self.objects.get(&id))
        {
            let file_name = format!("{}.tak", stack.name().replace(' ', "_"));
            node.push(
                RawNode::with("Take", vec![Attribute::from(stack.name())])
                    .child(RawNode::with(
                        "FileName",
                        vec![Attribute::from(file_name.as_str())],
                    ))
                    .child(RawNode::with(
                        "LocalTime",
                        vec![Attribute::I64(stack.span.0 .0), Attribute::I64(stack.span.1 .0)],
                    ))
                    .child(RawNode::with(
                        "ReferenceTime",
                        vec![Attribute::I64(stack.span.0 .0), Attribute::I64(stack.span.1 .0)],
                    )),
            );
        }

        node
    }

    /// Lowers the document into the top-level record list.
    pub fn to_records(&self, version: FileVersion, format: FileFormat) -> Vec<RawNode> {
        let mut records = vec![self.header_extension(version)];

        if format == FileFormat::Binary {
            records.push(RawNode::with(
                "FileId",
                vec![Attribute::Bytes(FILE_ID.to_vec())],
            ));
        }
        records.push(RawNode::with(
            "CreationTime",
            vec![Attribute::from("1970-01-01 00:00:00:000")],
        ));
        records.push(RawNode::with("Creator", vec![Attribute::from(CREATOR)]));

        records.push(self.global_settings());
        records.push(self.documents_section());
        records.push(RawNode::new("References"));
        records.push(self.definitions());

        let mut objects = RawNode::new("Objects");
        for object in self.objects.values() {
            objects.push(object.to_record());
        }
        records.push(objects);

        let mut connections = RawNode::new("Connections");
        for connection in &self.connections {
            connections.push(connection.to_record());
        }
        records.push(connections);

        records.push(self.takes());
        records
    }

    /// Serializes into a writer.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        version: FileVersion,
        format: FileFormat,
    ) -> Result<(), Error> {
        let records = self.to_records(version, format);
        match format {
            FileFormat::Binary => binary::write_binary(writer, &records, version),
            FileFormat::Ascii => ascii::write_ascii(writer, &records, version),
        }
    }

    /// Writes the document to a file, creating parent directories.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        version: FileVersion,
        format: FileFormat,
    ) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, version, format)?;
        writer.flush()?;

        info!("Saved FBX file to: {}", path.display());
        Ok(())
    }
}
