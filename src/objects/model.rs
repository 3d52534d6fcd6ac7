//! Transform-bearing scene nodes and their attributes

use glam::{DMat4, DVec3};
use indexmap::IndexMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::math::{compose, RotationOrder, Trs};
use crate::objects::{
    p_bool, p_enum, p_int, p_vector, properties70, record_header, ObjectId, ObjectNode,
};
use crate::tree::{Attribute, RawNode};

/// What a model node represents, which decides its attribute subclass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Skeleton limb.
    LimbNode,
    /// Polygonal mesh carrier.
    Mesh,
    /// Camera carrier.
    Camera,
    /// Plain transform.
    Null,
}

impl ModelKind {
    /// Record subclass string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LimbNode => "LimbNode",
            ModelKind::Mesh => "Mesh",
            ModelKind::Camera => "Camera",
            ModelKind::Null => "Null",
        }
    }
}

/// Transform inheritance mode.
///
/// Only `RSrs` (parent rotation and scale inherited, no segment-scale
/// compensation) is ever written; the other members exist because the wire
/// enum has them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum InheritType {
    /// Parent rotation applied before child scale.
    RrSs = 0,
    /// Parent rotation and scale applied before the child's.
    RSrs = 1,
    /// Parent scale not inherited.
    Rrs = 2,
}

/// A scene node with a local transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    id: ObjectId,
    name: String,
    kind: ModelKind,
    /// Local translation.
    pub translation: DVec3,
    /// Local euler rotation in degrees, per axis.
    pub rotation: DVec3,
    /// Local scale.
    pub scaling: DVec3,
    /// Euler order of `rotation`.
    pub rotation_order: RotationOrder,
    /// Whether rotation limits/order participate in evaluation.
    pub rotation_active: bool,
    /// Transform inheritance mode.
    pub inherit_type: InheritType,
    non_savable: IndexMap<String, String>,
}

impl Model {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>, kind: ModelKind) -> Self {
        Model {
            id,
            name: name.into(),
            kind,
            translation: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scaling: DVec3::ONE,
            rotation_order: RotationOrder::Xyz,
            rotation_active: false,
            inherit_type: InheritType::RSrs,
            non_savable: IndexMap::new(),
        }
    }

    /// What this model represents.
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Sets a property that exists only in memory.
    ///
    /// Non-savable properties never reach the emitted file; the serializer
    /// keeps its reverse-lookup handle here.
    pub fn set_non_savable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.non_savable.insert(name.into(), value.into());
    }

    /// Reads a non-savable property.
    pub fn non_savable(&self, name: &str) -> Option<&str> {
        self.non_savable.get(name).map(String::as_str)
    }

    /// Local transform matrix composed from the keyable components.
    pub fn local_matrix(&self) -> DMat4 {
        compose(
            &Trs {
                translation: self.translation,
                euler_degrees: self.rotation,
                scale: self.scaling,
            },
            self.rotation_order,
        )
    }
}

impl ObjectNode for Model {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "Model"
    }

    fn name_class(&self) -> &'static str {
        "Model"
    }

    fn subclass(&self) -> &'static str {
        self.kind.as_str()
    }

    fn to_record(&self) -> RawNode {
        let properties = vec![
            p_bool("RotationActive", self.rotation_active),
            p_enum("RotationOrder", i32::from(self.rotation_order)),
            p_enum("InheritType", i32::from(self.inherit_type)),
            p_int("DefaultAttributeIndex", 0),
            p_vector("Lcl Translation", "Lcl Translation", self.translation),
            p_vector("Lcl Rotation", "Lcl Rotation", self.rotation),
            p_vector("Lcl Scaling", "Lcl Scaling", self.scaling),
        ];

        record_header(self)
            .child(RawNode::with("Version", vec![Attribute::I32(232)]))
            .child(properties70(properties))
            .child(RawNode::with("Shading", vec![Attribute::Bool(true)]))
            .child(RawNode::with(
                "Culling",
                vec![Attribute::from("CullingOff")],
            ))
    }
}

/// Kind of node attribute attached to a model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeAttributeKind {
    /// Skeleton limb attribute.
    LimbNode,
    /// Camera attribute.
    Camera,
}

/// A model's typed attribute object.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttribute {
    id: ObjectId,
    name: String,
    kind: NodeAttributeKind,
}

impl NodeAttribute {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>, kind: NodeAttributeKind) -> Self {
        NodeAttribute {
            id,
            name: name.into(),
            kind,
        }
    }

    /// Attribute flavor.
    pub fn kind(&self) -> NodeAttributeKind {
        self.kind
    }
}

impl ObjectNode for NodeAttribute {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "NodeAttribute"
    }

    fn name_class(&self) -> &'static str {
        "NodeAttribute"
    }

    fn subclass(&self) -> &'static str {
        match self.kind {
            NodeAttributeKind::LimbNode => "LimbNode",
            NodeAttributeKind::Camera => "Camera",
        }
    }

    fn to_record(&self) -> RawNode {
        match self.kind {
            NodeAttributeKind::LimbNode => record_header(self).child(RawNode::with(
                "TypeFlags",
                vec![Attribute::from("Skeleton")],
            )),
            NodeAttributeKind::Camera => record_header(self)
                .child(properties70(vec![p_int("AspectW", 1920), p_int("AspectH", 1080)]))
                .child(RawNode::with("TypeFlags", vec![Attribute::from("Camera")]))
                .child(RawNode::with("GeometryVersion", vec![Attribute::I32(124)]))
                .child(RawNode::with(
                    "Position",
                    vec![
                        Attribute::F64(0.0),
                        Attribute::F64(0.0),
                        Attribute::F64(0.0),
                    ],
                ))
                .child(RawNode::with(
                    "Up",
                    vec![
                        Attribute::F64(0.0),
                        Attribute::F64(1.0),
                        Attribute::F64(0.0),
                    ],
                ))
                .child(RawNode::with(
                    "LookAt",
                    vec![
                        Attribute::F64(0.0),
                        Attribute::F64(0.0),
                        Attribute::F64(-1.0),
                    ],
                )),
        }
    }
}
