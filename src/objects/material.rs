//! Surface materials and file textures

use glam::DVec3;

use crate::objects::{
    p_bool, p_color, p_double, p_string, properties70, record_header, ObjectId, ObjectNode,
};
use crate::tree::{Attribute, RawNode};

/// A Lambert surface material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    id: ObjectId,
    name: String,
    /// Diffuse color.
    pub diffuse_color: DVec3,
}

impl Material {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Material {
            id,
            name: name.into(),
            diffuse_color: DVec3::new(0.8, 0.8, 0.8),
        }
    }
}

impl ObjectNode for Material {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "Material"
    }

    fn name_class(&self) -> &'static str {
        "Material"
    }

    fn subclass(&self) -> &'static str {
        ""
    }

    fn to_record(&self) -> RawNode {
        record_header(self)
            .child(RawNode::with("Version", vec![Attribute::I32(102)]))
            .child(RawNode::with(
                "ShadingModel",
                vec![Attribute::from("lambert")],
            ))
            .child(RawNode::with("MultiLayer", vec![Attribute::I32(0)]))
            .child(properties70(vec![
                p_string("ShadingModel", "lambert"),
                p_color("DiffuseColor", self.diffuse_color),
                p_double("DiffuseFactor", 1.0),
            ]))
    }
}

/// A file texture feeding a material input.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    id: ObjectId,
    name: String,
    /// Absolute path of the image file.
    pub file_name: String,
}

impl Texture {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Texture {
            id,
            name: name.into(),
            file_name: file_name.into(),
        }
    }
}

impl ObjectNode for Texture {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "Texture"
    }

    fn name_class(&self) -> &'static str {
        "Texture"
    }

    fn subclass(&self) -> &'static str {
        ""
    }

    fn to_record(&self) -> RawNode {
        record_header(self)
            .child(RawNode::with(
                "Type",
                vec![Attribute::from("TextureVideoClip")],
            ))
            .child(RawNode::with("Version", vec![Attribute::I32(202)]))
            .child(RawNode::with(
                "TextureName",
                vec![crate::tree::name_class(&self.name, "Texture")],
            ))
            .child(properties70(vec![
                p_string("UVSet", "default"),
                p_bool("UseMaterial", true),
            ]))
            .child(RawNode::with(
                "FileName",
                vec![Attribute::from(self.file_name.as_str())],
            ))
            .child(RawNode::with("RelativeFilename", vec![Attribute::from("")]))
            .child(RawNode::with(
                "ModelUVTranslation",
                vec![Attribute::F64(0.0), Attribute::F64(0.0)],
            ))
            .child(RawNode::with(
                "ModelUVScaling",
                vec![Attribute::F64(1.0), Attribute::F64(1.0)],
            ))
            .child(RawNode::with(
                "Texture_Alpha_Source",
                vec![Attribute::from("None")],
            ))
            .child(RawNode::with(
                "Cropping",
                vec![
                    Attribute::I32(0),
                    Attribute::I32(0),
                    Attribute::I32(0),
                    Attribute::I32(0),
                ],
            ))
    }
}
