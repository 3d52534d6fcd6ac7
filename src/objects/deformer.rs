//! Skin deformers, clusters and bind poses

use glam::DMat4;

use crate::objects::{record_header, ObjectId, ObjectNode};
use crate::tree::{Attribute, RawNode};

fn matrix_attribute(matrix: &DMat4) -> Attribute {
    Attribute::F64Array(matrix.to_cols_array().to_vec())
}

/// A linear skin deformer.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    id: ObjectId,
    name: String,
}

impl Skin {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Skin {
            id,
            name: name.into(),
        }
    }
}

impl ObjectNode for Skin {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "Deformer"
    }

    fn name_class(&self) -> &'static str {
        "Deformer"
    }

    fn subclass(&self) -> &'static str {
        "Skin"
    }

    fn to_record(&self) -> RawNode {
        record_header(self)
            .child(RawNode::with("Version", vec![Attribute::I32(101)]))
            .child(RawNode::with(
                "Link_DeformAcuracy",
                vec![Attribute::F64(50.0)],
            ))
            .child(RawNode::with(
                "SkinningType",
                vec![Attribute::from("Linear")],
            ))
    }
}

/// One influence's weighted vertex bindings inside a skin.
///
/// The link mode is always `TotalOne`; weights are written as authored.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ObjectId,
    name: String,
    /// Vertex indices carrying a weight for this influence.
    pub indexes: Vec<i32>,
    /// Weight per entry of `indexes`.
    pub weights: Vec<f64>,
    /// Global transform of the deformed geometry at bind time.
    pub transform: DMat4,
    /// Global transform of the linked limb at bind time.
    pub transform_link: DMat4,
}

impl Cluster {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Cluster {
            id,
            name: name.into(),
            indexes: Vec::new(),
            weights: Vec::new(),
            transform: DMat4::IDENTITY,
            transform_link: DMat4::IDENTITY,
        }
    }

    /// Appends one weighted vertex.
    pub fn add_control_point_index(&mut self, vertex: i32, weight: f64) {
        self.indexes.push(vertex);
        self.weights.push(weight);
    }
}

impl ObjectNode for Cluster {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "Deformer"
    }

    fn name_class(&self) -> &'static str {
        "SubDeformer"
    }

    fn subclass(&self) -> &'static str {
        "Cluster"
    }

    fn to_record(&self) -> RawNode {
        record_header(self)
            .child(RawNode::with("Version", vec![Attribute::I32(100)]))
            .child(RawNode::with(
                "UserData",
                vec![Attribute::from(""), Attribute::from("")],
            ))
            .child(RawNode::with("Mode", vec![Attribute::from("Total1")]))
            .child(RawNode::with(
                "Indexes",
                vec![Attribute::I32Array(self.indexes.clone())],
            ))
            .child(RawNode::with(
                "Weights",
                vec![Attribute::F64Array(self.weights.clone())],
            ))
            .child(RawNode::with(
                "Transform",
                vec![matrix_attribute(&self.transform)],
            ))
            .child(RawNode::with(
                "TransformLink",
                vec![matrix_attribute(&self.transform_link)],
            ))
    }
}

/// A bind pose covering the limbs of one skin.
///
/// Named after the deformer it belongs to; importers in other DCCs match
/// poses to skins by that name.
#[derive(Debug, Clone, PartialEq)]
pub struct BindPose {
    id: ObjectId,
    name: String,
    /// `(model id, global bind matrix)` per posed node.
    pub entries: Vec<(ObjectId, DMat4)>,
}

impl BindPose {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        BindPose {
            id,
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Adds one posed node.
    pub fn add(&mut self, model: ObjectId, global_matrix: DMat4) {
        self.entries.push((model, global_matrix));
    }
}

impl ObjectNode for BindPose {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "Pose"
    }

    fn name_class(&self) -> &'static str {
        "Pose"
    }

    fn subclass(&self) -> &'static str {
        "BindPose"
    }

    fn to_record(&self) -> RawNode {
        let mut record = record_header(self)
            .child(RawNode::with("Type", vec![Attribute::from("BindPose")]))
            .child(RawNode::with("Version", vec![Attribute::I32(100)]))
            .child(RawNode::with(
                "NbPoseNodes",
                vec![Attribute::I32(self.entries.len() as i32)],
            ));

        for (model, matrix) in &self.entries {
            record.push(
                RawNode::new("PoseNode")
                    .child(RawNode::with("Node", vec![Attribute::I64(model.0)]))
                    .child(RawNode::with("Matrix", vec![matrix_attribute(matrix)])),
            );
        }

        record
    }
}
