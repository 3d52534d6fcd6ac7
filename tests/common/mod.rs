#![allow(dead_code)]

pub mod reader;

use fbxport::math::Trs;
use fbxport::scene::memory::{MemoryScene, TrackChannel};
use fbxport::scene::{
    ColorSet, MaterialAssignment, MeshSample, NodeHandle, NodeKind, SkinSample, UvSet,
};
use glam::{DVec2, DVec3, DVec4};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

/// A unit cube: 8 vertices, 6 quads, one face-vertex normal per corner,
/// per-face smoothing groups and one UV set named `map1`.
pub fn cube_mesh(material: Option<NodeHandle>) -> MeshSample {
    let positions = vec![
        DVec3::new(-0.5, -0.5, -0.5),
        DVec3::new(0.5, -0.5, -0.5),
        DVec3::new(0.5, 0.5, -0.5),
        DVec3::new(-0.5, 0.5, -0.5),
        DVec3::new(-0.5, -0.5, 0.5),
        DVec3::new(0.5, -0.5, 0.5),
        DVec3::new(0.5, 0.5, 0.5),
        DVec3::new(-0.5, 0.5, 0.5),
    ];

    let faces: Vec<Vec<u32>> = vec![
        vec![0, 1, 5, 4],
        vec![3, 7, 6, 2],
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
    ];

    let face_normals = [
        DVec3::new(0.0, -1.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(0.0, 0.0, -1.0),
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(-1.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
    ];
    let mut face_vertex_normals = Vec::new();
    for normal in face_normals {
        for _ in 0..4 {
            face_vertex_normals.push(normal);
        }
    }

    let uvs = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(0.0, 1.0),
    ];
    let uv_indices: Vec<i32> = (0..6).flat_map(|_| [0, 1, 2, 3]).collect();

    MeshSample {
        positions,
        face_vertex_indices: faces,
        face_material_indices: vec![0; 6],
        face_vertex_normals,
        edge_smoothings: None,
        smoothing_groups: Some(vec![1; 6]),
        color_sets: Vec::new(),
        uv_sets: vec![UvSet {
            name: "map1".to_string(),
            uvs,
            face_vertex_indices: uv_indices,
            tangents: None,
            binormals: None,
        }],
        materials: vec![MaterialAssignment {
            node: material,
            texture_path: String::new(),
        }],
    }
}

/// All-weights-on-one-joint skin for an 8-vertex mesh.
pub fn rigid_skin(joint: NodeHandle) -> SkinSample {
    let mut influences = IndexMap::new();
    influences.insert(0u32, joint);

    let mut weights = IndexMap::new();
    for vertex in 0u32..8 {
        let mut vertex_weights = IndexMap::new();
        vertex_weights.insert(0u32, OrderedFloat(1.0));
        weights.insert(vertex, vertex_weights);
    }

    SkinSample {
        influences,
        weights,
    }
}

/// One joint `root` at the origin plus a skinned cube, the way scenario
/// tests expect them: the cube is fully weighted to `root`.
pub fn single_joint_cube_scene() -> (MemoryScene, NodeHandle, NodeHandle) {
    let mut scene = MemoryScene::new();

    let root = scene.add_node("root", NodeKind::Joint, None);
    let material = scene.add_node("lambert1", NodeKind::Transform, None);
    let cube = scene.add_node("cube", NodeKind::Mesh, None);

    scene.attach_mesh(cube, cube_mesh(Some(material)));
    scene.attach_skin(cube, rigid_skin(root));

    (scene, root, cube)
}

/// A four-joint chain `spine_01 -> ... -> spine_04`.
pub fn spine_chain_scene() -> (MemoryScene, Vec<NodeHandle>) {
    let mut scene = MemoryScene::new();

    let mut joints = Vec::new();
    let mut parent = None;
    for index in 1..=4 {
        let joint = scene.add_node(format!("spine_{index:02}"), NodeKind::Joint, parent);
        scene.set_rest(
            joint,
            Trs {
                translation: DVec3::new(0.0, 10.0, 0.0),
                ..Trs::identity()
            },
        );
        joints.push(joint);
        parent = Some(joint);
    }

    (scene, joints)
}

/// A joint whose X translation tracks the frame number over `0..=10`.
pub fn animated_root_scene() -> (MemoryScene, NodeHandle) {
    let mut scene = MemoryScene::new();
    let root = scene.add_node("root", NodeKind::Joint, None);

    for frame in 0..=10 {
        scene.set_key(root, TrackChannel::Translate, 0, frame as f64, frame as f64);
    }

    scene.set_timeline(0.0, 10.0);
    (scene, root)
}

/// Same as [`animated_root_scene`] but the joint sits under an offset
/// parent that is not part of any export set.
pub fn offset_root_scene() -> (MemoryScene, NodeHandle) {
    let mut scene = MemoryScene::new();

    let offset = scene.add_node("offset", NodeKind::Transform, None);
    scene.set_rest(
        offset,
        Trs {
            translation: DVec3::new(100.0, 0.0, 0.0),
            ..Trs::identity()
        },
    );

    let root = scene.add_node("root", NodeKind::Joint, Some(offset));
    for frame in 0..=10 {
        scene.set_key(root, TrackChannel::Translate, 0, frame as f64, frame as f64);
    }

    (scene, root)
}

/// A cube with two UV sets `map1`/`map2`, both carrying tangent data.
pub fn two_uv_set_scene() -> (MemoryScene, NodeHandle) {
    let mut scene = MemoryScene::new();
    let mesh = scene.add_node("shell", NodeKind::Mesh, None);

    let mut sample = cube_mesh(None);
    let face_vertices = sample.num_face_vertices();

    for set in &mut sample.uv_sets {
        set.tangents = Some(vec![DVec3::new(1.0, 0.0, 0.0); face_vertices]);
        set.binormals = Some(vec![DVec3::new(0.0, 1.0, 0.0); face_vertices]);
    }

    let mut second = sample.uv_sets[0].clone();
    second.name = "map2".to_string();
    sample.uv_sets.push(second);

    scene.attach_mesh(mesh, sample);
    (scene, mesh)
}

/// A cube carrying one RGBA color set.
pub fn colored_cube_scene() -> (MemoryScene, NodeHandle) {
    let mut scene = MemoryScene::new();
    let mesh = scene.add_node("painted", NodeKind::Mesh, None);

    let mut sample = cube_mesh(None);
    sample.color_sets.push(ColorSet {
        name: "colorSet1".to_string(),
        colors: vec![
            DVec4::new(1.0, 0.0, 0.0, 1.0),
            DVec4::new(0.0, 1.0, 0.0, 1.0),
        ],
        face_vertex_indices: (0..sample.num_face_vertices() as i32)
            .map(|index| index % 2)
            .collect(),
    });

    scene.attach_mesh(mesh, sample);
    (scene, mesh)
}
