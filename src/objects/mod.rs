//! Typed FBX scene objects
//!
//! Each object owns its record lowering; [`FbxObject`] dispatches the
//! shared surface across the variants. Objects reference each other only
//! through [`Connection`]s resolved by id, never by direct pointers, which
//! is what lets shells be allocated before they are linked.

use enum_dispatch::enum_dispatch;
use glam::DVec3;

use crate::time::FbxTime;
use crate::tree::{name_class, Attribute, RawNode};

pub mod animation;
pub mod deformer;
pub mod geometry;
pub mod material;
pub mod model;

pub use animation::{AnimCurve, AnimCurveNode, AnimLayer, AnimStack, TransformChannel};
pub use deformer::{BindPose, Cluster, Skin};
pub use geometry::{
    ColorElement, Geometry, MappingMode, NormalElement, ReferenceMode, SmoothingElement,
    UvElement, VectorElement,
};
pub use material::{Material, Texture};
pub use model::{InheritType, Model, ModelKind, NodeAttribute, NodeAttributeKind};

/// Identifier of an object inside one document.
///
/// Ids are assigned monotonically by the document; id `0` is the implicit
/// scene root and never appears in the object table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub i64);

impl ObjectId {
    /// The implicit scene root.
    pub const ROOT: ObjectId = ObjectId(0);
}

/// How two objects are connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Object-to-object.
    ObjectObject,
    /// Object-to-property; carries the destination property name.
    ObjectProperty(String),
}

/// A directed child-to-parent connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Connection flavor.
    pub kind: ConnectionKind,
    /// Source (child) object.
    pub child: ObjectId,
    /// Destination (parent) object, or [`ObjectId::ROOT`].
    pub parent: ObjectId,
}

impl Connection {
    pub(crate) fn to_record(&self) -> RawNode {
        match &self.kind {
            ConnectionKind::ObjectObject => RawNode::with(
                "C",
                vec![
                    Attribute::from("OO"),
                    Attribute::I64(self.child.0),
                    Attribute::I64(self.parent.0),
                ],
            ),
            ConnectionKind::ObjectProperty(property) => RawNode::with(
                "C",
                vec![
                    Attribute::from("OP"),
                    Attribute::I64(self.child.0),
                    Attribute::I64(self.parent.0),
                    Attribute::from(property.as_str()),
                ],
            ),
        }
    }
}

/// Shared surface of every typed object.
#[enum_dispatch]
pub trait ObjectNode {
    /// Document-unique id.
    fn id(&self) -> ObjectId;

    /// Object name, without the class qualifier.
    fn name(&self) -> &str;

    /// Top-level record name (`Model`, `Geometry`, `Deformer`, ...).
    fn record_class(&self) -> &'static str;

    /// Class half of the combined name-class attribute.
    fn name_class(&self) -> &'static str;

    /// Third record attribute (`LimbNode`, `Skin`, `""`, ...).
    fn subclass(&self) -> &'static str;

    /// Lowers the object into its record.
    fn to_record(&self) -> RawNode;
}

/// Sum of every object the document can hold.
#[enum_dispatch(ObjectNode)]
#[derive(Debug, Clone, PartialEq)]
pub enum FbxObject {
    /// A transform-bearing scene node.
    Model,
    /// A limb-node or camera attribute.
    NodeAttribute,
    /// Mesh geometry.
    Geometry,
    /// A Lambert surface material.
    Material,
    /// A file texture.
    Texture,
    /// A skin deformer.
    Skin,
    /// A per-influence skin cluster.
    Cluster,
    /// A bind pose.
    BindPose,
    /// An animation stack.
    AnimStack,
    /// An animation layer.
    AnimLayer,
    /// A per-channel curve node.
    AnimCurveNode,
    /// A single sampled curve.
    AnimCurve,
}

pub(crate) fn record_header(object: &dyn ObjectNode) -> RawNode {
    RawNode::with(
        object.record_class(),
        vec![
            Attribute::I64(object.id().0),
            name_class(object.name(), object.name_class()),
            Attribute::from(object.subclass()),
        ],
    )
}

pub(crate) fn p_bool(name: &str, value: bool) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("bool"),
            Attribute::from(""),
            Attribute::from(""),
            Attribute::I32(value as i32),
        ],
    )
}

pub(crate) fn p_int(name: &str, value: i32) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("int"),
            Attribute::from("Integer"),
            Attribute::from(""),
            Attribute::I32(value),
        ],
    )
}

pub(crate) fn p_enum(name: &str, value: i32) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("enum"),
            Attribute::from(""),
            Attribute::from(""),
            Attribute::I32(value),
        ],
    )
}

pub(crate) fn p_double(name: &str, value: f64) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("double"),
            Attribute::from("Number"),
            Attribute::from(""),
            Attribute::F64(value),
        ],
    )
}

pub(crate) fn p_number_animatable(name: &str, value: f64) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("Number"),
            Attribute::from(""),
            Attribute::from("A"),
            Attribute::F64(value),
        ],
    )
}

pub(crate) fn p_string(name: &str, value: &str) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("KString"),
            Attribute::from(""),
            Attribute::from(""),
            Attribute::from(value),
        ],
    )
}

pub(crate) fn p_ktime(name: &str, value: FbxTime) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("KTime"),
            Attribute::from("Time"),
            Attribute::from(""),
            Attribute::I64(value.0),
        ],
    )
}

pub(crate) fn p_vector(name: &str, type_name: &str, value: DVec3) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from(type_name),
            Attribute::from(""),
            Attribute::from("A"),
            Attribute::F64(value.x),
            Attribute::F64(value.y),
            Attribute::F64(value.z),
        ],
    )
}

pub(crate) fn p_color(name: &str, value: DVec3) -> RawNode {
    RawNode::with(
        "P",
        vec![
            Attribute::from(name),
            Attribute::from("Color"),
            Attribute::from(""),
            Attribute::from("A"),
            Attribute::F64(value.x),
            Attribute::F64(value.y),
            Attribute::F64(value.z),
        ],
    )
}

pub(crate) fn properties70(properties: Vec<RawNode>) -> RawNode {
    let mut node = RawNode::new("Properties70");
    node.children = properties;
    node
}
