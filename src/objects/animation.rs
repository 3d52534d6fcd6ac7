//! Animation stack, layer and curves

use std::collections::BTreeMap;

use glam::DVec3;

use crate::objects::{p_ktime, p_number_animatable, properties70, record_header, ObjectId, ObjectNode};
use crate::time::FbxTime;
use crate::tree::{Attribute, RawNode};

/// Keyable transform channel of a model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransformChannel {
    /// `Lcl Translation`.
    Translation,
    /// `Lcl Rotation`.
    Rotation,
    /// `Lcl Scaling`.
    Scaling,
}

impl TransformChannel {
    /// The model property this channel drives.
    pub fn property(&self) -> &'static str {
        match self {
            TransformChannel::Translation => "Lcl Translation",
            TransformChannel::Rotation => "Lcl Rotation",
            TransformChannel::Scaling => "Lcl Scaling",
        }
    }

    /// The lowercase name used in generated curve names.
    pub fn curve_name(&self) -> &'static str {
        match self {
            TransformChannel::Translation => "translate",
            TransformChannel::Rotation => "rotate",
            TransformChannel::Scaling => "scale",
        }
    }

    /// All three channels, in key-writing order.
    pub fn all() -> [TransformChannel; 3] {
        [
            TransformChannel::Translation,
            TransformChannel::Rotation,
            TransformChannel::Scaling,
        ]
    }
}

/// The animation take container.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimStack {
    id: ObjectId,
    name: String,
    /// Local time span of the take.
    pub span: (FbxTime, FbxTime),
}

impl AnimStack {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        AnimStack {
            id,
            name: name.into(),
            span: (FbxTime(0), FbxTime(0)),
        }
    }
}

impl ObjectNode for AnimStack {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "AnimationStack"
    }

    fn name_class(&self) -> &'static str {
        "AnimStack"
    }

    fn subclass(&self) -> &'static str {
        ""
    }

    fn to_record(&self) -> RawNode {
        record_header(self).child(properties70(vec![
            p_ktime("LocalStart", self.span.0),
            p_ktime("LocalStop", self.span.1),
            p_ktime("ReferenceStart", self.span.0),
            p_ktime("ReferenceStop", self.span.1),
        ]))
    }
}

/// A single blend layer inside a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimLayer {
    id: ObjectId,
    name: String,
}

impl AnimLayer {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        AnimLayer {
            id,
            name: name.into(),
        }
    }
}

impl ObjectNode for AnimLayer {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "AnimationLayer"
    }

    fn name_class(&self) -> &'static str {
        "AnimLayer"
    }

    fn subclass(&self) -> &'static str {
        ""
    }

    fn to_record(&self) -> RawNode {
        record_header(self)
    }
}

/// Per-channel curve bundle connecting curves to a model property.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimCurveNode {
    id: ObjectId,
    name: String,
    /// Channel defaults (`d|X`, `d|Y`, `d|Z`).
    pub defaults: DVec3,
}

impl AnimCurveNode {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        AnimCurveNode {
            id,
            name: name.into(),
            defaults: DVec3::ZERO,
        }
    }
}

impl ObjectNode for AnimCurveNode {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "AnimationCurveNode"
    }

    fn name_class(&self) -> &'static str {
        "AnimCurveNode"
    }

    fn subclass(&self) -> &'static str {
        ""
    }

    fn to_record(&self) -> RawNode {
        record_header(self).child(properties70(vec![
            p_number_animatable("d|X", self.defaults.x),
            p_number_animatable("d|Y", self.defaults.y),
            p_number_animatable("d|Z", self.defaults.z),
        ]))
    }
}

/// Linear interpolation flag of the key attribute block.
const KEY_LINEAR: i32 = 0x0000_0004;

/// A sampled single-value curve.
///
/// Keys are held sorted by time; adding a key at an existing time replaces
/// its value. Every key carries linear in/out tangents.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimCurve {
    id: ObjectId,
    name: String,
    keys: BTreeMap<FbxTime, f64>,
}

impl AnimCurve {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        AnimCurve {
            id,
            name: name.into(),
            keys: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a key.
    pub fn add_key(&mut self, time: FbxTime, value: f64) {
        self.keys.insert(time, value);
    }

    /// Keys in time order.
    pub fn keys(&self) -> impl Iterator<Item = (FbxTime, f64)> + '_ {
        self.keys.iter().map(|(time, value)| (*time, *value))
    }

    /// Number of keys.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl ObjectNode for AnimCurve {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "AnimationCurve"
    }

    fn name_class(&self) -> &'static str {
        "AnimCurve"
    }

    fn subclass(&self) -> &'static str {
        ""
    }

    fn to_record(&self) -> RawNode {
        let times: Vec<i64> = self.keys.keys().map(|time| time.0).collect();
        let values: Vec<f32> = self.keys.values().map(|value| *value as f32).collect();
        let count = times.len();

        record_header(self)
            .child(RawNode::with("Default", vec![Attribute::F64(0.0)]))
            .child(RawNode::with("KeyVer", vec![Attribute::I32(4008)]))
            .child(RawNode::with(
                "KeyTime",
                vec![Attribute::I64Array(times)],
            ))
            .child(RawNode::with(
                "KeyValueFloat",
                vec![Attribute::F32Array(values)],
            ))
            .child(RawNode::with(
                "KeyAttrFlags",
                vec![Attribute::I32Array(vec![KEY_LINEAR])],
            ))
            .child(RawNode::with(
                "KeyAttrDataFloat",
                vec![Attribute::F32Array(vec![0.0, 0.0, 0.0, 0.0])],
            ))
            .child(RawNode::with(
                "KeyAttrRefCount",
                vec![Attribute::I32Array(vec![count as i32])],
            ))
    }
}
