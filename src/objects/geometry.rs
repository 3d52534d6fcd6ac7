//! Mesh geometry and layer elements

use glam::{DVec2, DVec3, DVec4};

use crate::error::StructuralError;
use crate::objects::{record_header, ObjectId, ObjectNode};
use crate::tree::{Attribute, RawNode};

/// How a layer element binds to the geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MappingMode {
    /// One value per polygon.
    ByPolygon,
    /// One value per face-vertex.
    ByPolygonVertex,
    /// One value per edge.
    ByEdge,
}

impl MappingMode {
    /// Wire string of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingMode::ByPolygon => "ByPolygon",
            MappingMode::ByPolygonVertex => "ByPolygonVertex",
            MappingMode::ByEdge => "ByEdge",
        }
    }
}

/// How a layer element's values are addressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceMode {
    /// Values stored one per addressable item.
    Direct,
    /// Unique values plus an index array.
    IndexToDirect,
}

impl ReferenceMode {
    /// Wire string of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceMode::Direct => "Direct",
            ReferenceMode::IndexToDirect => "IndexToDirect",
        }
    }
}

/// Face-vertex normals with an identity index array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalElement {
    /// One unit normal per face-vertex, in face-vertex order.
    pub values: Vec<DVec3>,
}

/// Smoothing data, on whichever topology the source models it.
#[derive(Debug, Clone, PartialEq)]
pub enum SmoothingElement {
    /// One flag per edge.
    ByEdge(Vec<bool>),
    /// One smoothing group per polygon.
    ByPolygon(Vec<i32>),
}

/// A named vertex-color channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorElement {
    /// Channel name.
    pub name: String,
    /// Unique RGBA values.
    pub colors: Vec<DVec4>,
    /// Per-face-vertex index into `colors`.
    pub indices: Vec<i32>,
}

/// A named UV channel.
#[derive(Debug, Clone, PartialEq)]
pub struct UvElement {
    /// Channel name.
    pub name: String,
    /// Unique UV coordinates.
    pub uvs: Vec<DVec2>,
    /// Per-face-vertex index into `uvs`.
    pub indices: Vec<i32>,
}

/// A named per-face-vertex vector channel (tangents or binormals).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorElement {
    /// Channel name, matching the UV set it belongs to.
    pub name: String,
    /// One vector per face-vertex.
    pub values: Vec<DVec3>,
}

/// Mesh geometry under construction.
///
/// Polygons are assembled through the begin/add/end calls and the edge
/// array must be built exactly once, after every polygon; both rules come
/// from the underlying format, where adjacency is derived from the
/// face-vertex stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    id: ObjectId,
    name: String,
    control_points: Vec<DVec3>,
    polygons: Vec<Vec<u32>>,
    open_polygon: Option<Vec<u32>>,
    edges: Option<Vec<i32>>,
    /// Per-polygon material slots (`ByPolygon`, `IndexToDirect`).
    pub material_indices: Vec<i32>,
    /// Optional face-vertex normals.
    pub normals: Option<NormalElement>,
    /// Optional smoothing data; never both topologies at once.
    pub smoothing: Option<SmoothingElement>,
    /// Vertex-color channels in creation order.
    pub color_sets: Vec<ColorElement>,
    /// UV channels in creation order.
    pub uv_sets: Vec<UvElement>,
    /// Tangent channels, index-aligned with `uv_sets`.
    pub tangent_sets: Vec<VectorElement>,
    /// Binormal channels, index-aligned with `uv_sets`.
    pub binormal_sets: Vec<VectorElement>,
}

impl Geometry {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Geometry {
            id,
            name: name.into(),
            control_points: Vec::new(),
            polygons: Vec::new(),
            open_polygon: None,
            edges: None,
            material_indices: Vec::new(),
            normals: None,
            smoothing: None,
            color_sets: Vec::new(),
            uv_sets: Vec::new(),
            tangent_sets: Vec::new(),
            binormal_sets: Vec::new(),
        }
    }

    /// Allocates `count` control points at the origin.
    pub fn init_control_points(&mut self, count: usize) {
        self.control_points = vec![DVec3::ZERO; count];
    }

    /// Sets one control point.
    pub fn set_control_point(&mut self, index: usize, position: DVec3) {
        if let Some(point) = self.control_points.get_mut(index) {
            *point = position;
        }
    }

    /// Control points as written.
    pub fn control_points(&self) -> &[DVec3] {
        &self.control_points
    }

    /// Starts the next polygon.
    pub fn begin_polygon(&mut self) {
        self.open_polygon = Some(Vec::new());
    }

    /// Adds a vertex to the open polygon.
    pub fn add_polygon_vertex(&mut self, vertex: u32) {
        if let Some(polygon) = self.open_polygon.as_mut() {
            polygon.push(vertex);
        }
    }

    /// Completes the open polygon.
    pub fn end_polygon(&mut self) {
        if let Some(polygon) = self.open_polygon.take() {
            self.polygons.push(polygon);
        }
    }

    /// Completed polygons.
    pub fn polygons(&self) -> &[Vec<u32>] {
        &self.polygons
    }

    /// Number of face-vertices across all polygons.
    pub fn num_face_vertices(&self) -> usize {
        self.polygons.iter().map(Vec::len).sum()
    }

    /// Derives the edge array from the polygon stream.
    ///
    /// Must be called after the last `end_polygon`; calling it twice is a
    /// structural error because the derived adjacency would go stale.
    pub fn build_edge_array(&mut self) -> Result<(), StructuralError> {
        if self.edges.is_some() {
            return Err(StructuralError::EdgesAlreadyBuilt(self.name.clone()));
        }

        let mut seen = std::collections::HashSet::new();
        let mut edges = Vec::new();
        let mut offset = 0i32;

        for polygon in &self.polygons {
            if polygon.is_empty() {
                continue;
            }
            for (corner, vertex) in polygon.iter().enumerate() {
                let next = polygon[(corner + 1) % polygon.len()];
                let key = if *vertex < next {
                    (*vertex, next)
                } else {
                    (next, *vertex)
                };
                if seen.insert(key) {
                    // An edge is referenced by the position of its first
                    // half-edge in the face-vertex stream.
                    edges.push(offset + corner as i32);
                }
            }
            offset += polygon.len() as i32;
        }

        self.edges = Some(edges);
        Ok(())
    }

    /// The derived edge array, if built.
    pub fn edges(&self) -> Option<&[i32]> {
        self.edges.as_deref()
    }

    fn polygon_vertex_index(&self) -> Vec<i32> {
        let mut indices = Vec::with_capacity(self.num_face_vertices());
        for polygon in &self.polygons {
            for (corner, vertex) in polygon.iter().enumerate() {
                let value = *vertex as i32;
                if corner + 1 == polygon.len() {
                    // Final corner of a polygon is stored bitwise-negated.
                    indices.push(-(value + 1));
                } else {
                    indices.push(value);
                }
            }
        }
        indices
    }

    fn layer_count(&self) -> usize {
        self.uv_sets
            .len()
            .max(self.color_sets.len())
            .max(self.tangent_sets.len())
            .max(1)
    }

    fn layer_record(&self, channel: usize) -> RawNode {
        let mut layer = RawNode::with("Layer", vec![Attribute::I32(channel as i32)])
            .child(RawNode::with("Version", vec![Attribute::I32(100)]));

        let element = |type_name: &str| {
            RawNode::new("LayerElement")
                .child(RawNode::with("Type", vec![Attribute::from(type_name)]))
                .child(RawNode::with("TypedIndex", vec![Attribute::I32(channel as i32)]))
        };

        if channel == 0 {
            if self.normals.is_some() {
                layer.push(element("LayerElementNormal"));
            }
            if self.smoothing.is_some() {
                layer.push(element("LayerElementSmoothing"));
            }
            if !self.material_indices.is_empty() {
                layer.push(element("LayerElementMaterial"));
            }
        }
        if channel < self.color_sets.len() {
            layer.push(element("LayerElementColor"));
        }
        if channel < self.uv_sets.len() {
            layer.push(element("LayerElementUV"));
        }
        if channel < self.tangent_sets.len() {
            layer.push(element("LayerElementTangent"));
        }
        if channel < self.binormal_sets.len() {
            layer.push(element("LayerElementBinormal"));
        }

        layer
    }
}

fn element_header(
    name: &str,
    channel: i32,
    version: i32,
    element_name: &str,
    mapping: MappingMode,
    reference: ReferenceMode,
) -> RawNode {
    RawNode::with(name, vec![Attribute::I32(channel)])
        .child(RawNode::with("Version", vec![Attribute::I32(version)]))
        .child(RawNode::with("Name", vec![Attribute::from(element_name)]))
        .child(RawNode::with(
            "MappingInformationType",
            vec![Attribute::from(mapping.as_str())],
        ))
        .child(RawNode::with(
            "ReferenceInformationType",
            vec![Attribute::from(reference.as_str())],
        ))
}

fn flatten3(values: &[DVec3]) -> Vec<f64> {
    let mut flat = Vec::with_capacity(values.len() * 3);
    for value in values {
        flat.extend_from_slice(&[value.x, value.y, value.z]);
    }
    flat
}

fn flatten2(values: &[DVec2]) -> Vec<f64> {
    let mut flat = Vec::with_capacity(values.len() * 2);
    for value in values {
        flat.extend_from_slice(&[value.x, value.y]);
    }
    flat
}

fn flatten4(values: &[DVec4]) -> Vec<f64> {
    let mut flat = Vec::with_capacity(values.len() * 4);
    for value in values {
        flat.extend_from_slice(&[value.x, value.y, value.z, value.w]);
    }
    flat
}

impl ObjectNode for Geometry {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn record_class(&self) -> &'static str {
        "Geometry"
    }

    fn name_class(&self) -> &'static str {
        "Geometry"
    }

    fn subclass(&self) -> &'static str {
        "Mesh"
    }

    fn to_record(&self) -> RawNode {
        let mut record = record_header(self)
            .child(RawNode::with("GeometryVersion", vec![Attribute::I32(124)]))
            .child(RawNode::with(
                "Vertices",
                vec![Attribute::F64Array(flatten3(&self.control_points))],
            ))
            .child(RawNode::with(
                "PolygonVertexIndex",
                vec![Attribute::I32Array(self.polygon_vertex_index())],
            ));

        if let Some(edges) = &self.edges {
            record.push(RawNode::with(
                "Edges",
                vec![Attribute::I32Array(edges.clone())],
            ));
        }

        if let Some(normals) = &self.normals {
            let count = normals.values.len();
            let mut node = element_header(
                "LayerElementNormal",
                0,
                101,
                "",
                MappingMode::ByPolygonVertex,
                ReferenceMode::IndexToDirect,
            );
            node.push(RawNode::with(
                "Normals",
                vec![Attribute::F64Array(flatten3(&normals.values))],
            ));
            node.push(RawNode::with(
                "NormalsW",
                vec![Attribute::F64Array(vec![1.0; count])],
            ));
            node.push(RawNode::with(
                "NormalsIndex",
                vec![Attribute::I32Array((0..count as i32).collect())],
            ));
            record.push(node);
        }

        match &self.smoothing {
            Some(SmoothingElement::ByEdge(flags)) => {
                let mut node = element_header(
                    "LayerElementSmoothing",
                    0,
                    102,
                    "",
                    MappingMode::ByEdge,
                    ReferenceMode::Direct,
                );
                node.push(RawNode::with(
                    "Smoothing",
                    vec![Attribute::I32Array(
                        flags.iter().map(|flag| *flag as i32).collect(),
                    )],
                ));
                record.push(node);
            }
            Some(SmoothingElement::ByPolygon(groups)) => {
                let mut node = element_header(
                    "LayerElementSmoothing",
                    0,
                    102,
                    "",
                    MappingMode::ByPolygon,
                    ReferenceMode::Direct,
                );
                node.push(RawNode::with(
                    "Smoothing",
                    vec![Attribute::I32Array(groups.clone())],
                ));
                record.push(node);
            }
            None => {}
        }

        for (channel, colors) in self.color_sets.iter().enumerate() {
            let mut node = element_header(
                "LayerElementColor",
                channel as i32,
                101,
                &colors.name,
                MappingMode::ByPolygonVertex,
                ReferenceMode::IndexToDirect,
            );
            node.push(RawNode::with(
                "Colors",
                vec![Attribute::F64Array(flatten4(&colors.colors))],
            ));
            node.push(RawNode::with(
                "ColorIndex",
                vec![Attribute::I32Array(colors.indices.clone())],
            ));
            record.push(node);
        }

        for (channel, uvs) in self.uv_sets.iter().enumerate() {
            let mut node = element_header(
                "LayerElementUV",
                channel as i32,
                101,
                &uvs.name,
                MappingMode::ByPolygonVertex,
                ReferenceMode::IndexToDirect,
            );
            node.push(RawNode::with(
                "UV",
                vec![Attribute::F64Array(flatten2(&uvs.uvs))],
            ));
            node.push(RawNode::with(
                "UVIndex",
                vec![Attribute::I32Array(uvs.indices.clone())],
            ));
            record.push(node);
        }

        for (channel, tangents) in self.tangent_sets.iter().enumerate() {
            let mut node = element_header(
                "LayerElementTangent",
                channel as i32,
                102,
                &tangents.name,
                MappingMode::ByPolygonVertex,
                ReferenceMode::Direct,
            );
            node.push(RawNode::with(
                "Tangents",
                vec![Attribute::F64Array(flatten3(&tangents.values))],
            ));
            record.push(node);
        }

        for (channel, binormals) in self.binormal_sets.iter().enumerate() {
            let mut node = element_header(
                "LayerElementBinormal",
                channel as i32,
                102,
                &binormals.name,
                MappingMode::ByPolygonVertex,
                ReferenceMode::Direct,
            );
            node.push(RawNode::with(
                "Binormals",
                vec![Attribute::F64Array(flatten3(&binormals.values))],
            ));
            record.push(node);
        }

        if !self.material_indices.is_empty() {
            let mut node = element_header(
                "LayerElementMaterial",
                0,
                101,
                "",
                MappingMode::ByPolygon,
                ReferenceMode::IndexToDirect,
            );
            node.push(RawNode::with(
                "Materials",
                vec![Attribute::I32Array(self.material_indices.clone())],
            ));
            record.push(node);
        }

        for channel in 0..self.layer_count() {
            record.push(self.layer_record(channel));
        }

        record
    }
}
