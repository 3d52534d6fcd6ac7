mod common;

use std::fs;

use common::single_joint_cube_scene;
use fbxport::config::{ExportSet, MeshSettings, ObjectSet};
use fbxport::serializer::FbxSerializer;
use fbxport::tree::{binary, Attribute, RawNode};
use fbxport::version::{FileFormat, FileVersion};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("fbxport_doc_{name}_{}.fbx", std::process::id()))
}

fn cube_export_set() -> ExportSet {
    ExportSet {
        name: "cube_set".to_string(),
        skeleton: ObjectSet::named("root"),
        mesh: ObjectSet::named("cube"),
        mesh_settings: MeshSettings::default(),
        ..Default::default()
    }
}

fn export(version: FileVersion, format: FileFormat, tag: &str) -> Vec<u8> {
    let (mut scene, _, _) = single_joint_cube_scene();
    let path = temp_path(tag);

    let mut serializer = FbxSerializer::new(&mut scene, "");
    serializer
        .serialize_export_set(&cube_export_set(), &path, version, format)
        .unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::remove_file(&path).ok();
    bytes
}

#[test]
fn binary_container_shape() {
    let bytes = export(FileVersion::Fbx7500, FileFormat::Binary, "container_shape");

    let (version, records) = common::reader::parse(&bytes);
    assert_eq!(version, 7500);

    let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "FBXHeaderExtension",
            "FileId",
            "CreationTime",
            "Creator",
            "GlobalSettings",
            "Documents",
            "References",
            "Definitions",
            "Objects",
            "Connections",
            "Takes",
        ]
    );

    let header = &records[0];
    assert_eq!(header.expect("FBXVersion").values[0].as_int(), 7500);
}

#[test]
fn narrow_records_below_7500() {
    let bytes = export(FileVersion::Fbx7400, FileFormat::Binary, "narrow");

    let (version, records) = common::reader::parse(&bytes);
    assert_eq!(version, 7400);
    assert!(records.iter().any(|record| record.name == "Objects"));
}

#[test]
fn global_settings_are_centimeters_at_thirty_fps() {
    let bytes = export(FileVersion::Fbx7500, FileFormat::Binary, "globals");
    let (_, records) = common::reader::parse(&bytes);

    let settings = records
        .iter()
        .find(|record| record.name == "GlobalSettings")
        .unwrap();
    let properties = settings.expect("Properties70");

    let mut unit_scale = None;
    let mut time_mode = None;
    let mut up_axis = None;
    for property in properties.find_all("P") {
        match property.values[0].as_str() {
            "UnitScaleFactor" => unit_scale = Some(property.values[4].clone()),
            "TimeMode" => time_mode = Some(property.values[4].clone()),
            "UpAxis" => up_axis = Some(property.values[4].clone()),
            _ => {}
        }
    }

    assert_eq!(unit_scale.unwrap(), common::reader::Value::Float(1.0));
    assert_eq!(time_mode.unwrap(), common::reader::Value::Int(6));
    // The memory host reports Y-up.
    assert_eq!(up_axis.unwrap(), common::reader::Value::Int(1));
}

#[test]
fn definitions_count_every_object_class() {
    let bytes = export(FileVersion::Fbx7500, FileFormat::Binary, "definitions");
    let (_, records) = common::reader::parse(&bytes);

    let definitions = records
        .iter()
        .find(|record| record.name == "Definitions")
        .unwrap();
    let objects = records.iter().find(|record| record.name == "Objects").unwrap();

    let mut expected = 1i64; // GlobalSettings
    expected += objects.children.len() as i64;

    assert_eq!(definitions.expect("Count").values[0].as_int(), expected);

    let model_definition = definitions
        .find_all("ObjectType")
        .find(|definition| definition.values[0].as_str() == "Model")
        .unwrap();
    assert_eq!(model_definition.expect("Count").values[0].as_int(), 2);
}

#[test]
fn static_exports_are_idempotent() {
    let first = export(FileVersion::Fbx7500, FileFormat::Binary, "idempotent_a");
    let second = export(FileVersion::Fbx7500, FileFormat::Binary, "idempotent_b");
    assert_eq!(first, second);
}

#[test]
fn ascii_and_binary_agree_on_record_counts() {
    let binary_bytes = export(FileVersion::Fbx7500, FileFormat::Binary, "parity_bin");
    let ascii_bytes = export(FileVersion::Fbx7500, FileFormat::Ascii, "parity_ascii");

    let (_, records) = common::reader::parse(&binary_bytes);
    let objects = records.iter().find(|record| record.name == "Objects").unwrap();
    let ascii_text = String::from_utf8(ascii_bytes).unwrap();

    for class in ["Model", "Geometry", "Material", "Deformer", "AnimationStack"] {
        let in_binary = objects.find_all(class).count();
        let in_ascii = ascii_text
            .lines()
            .filter(|line| line.starts_with(&format!("\t{class}: ")))
            .count();
        assert_eq!(in_binary, in_ascii, "count mismatch for {class}");
    }
}

#[test]
fn ascii_output_is_textual_fbx() {
    let ascii_bytes = export(FileVersion::Fbx7500, FileFormat::Ascii, "ascii_shape");
    let text = String::from_utf8(ascii_bytes).unwrap();

    assert!(text.starts_with("; FBX 7.5.0 project file"));
    assert!(text.contains("\"Model::root\""));
    assert!(text.contains("\"Model::cube\""));
    assert!(text.contains("Vertices: *24 {"));
    // The binary-only file id must not leak into the text form.
    assert!(!text.contains("FileId"));
}

#[test]
fn large_arrays_round_trip_through_compression() {
    let values: Vec<f64> = (0..512).map(|index| index as f64 * 0.25).collect();
    let node = RawNode::with("Payload", vec![Attribute::F64Array(values.clone())]);

    let mut bytes = Vec::new();
    binary::write_binary(&mut bytes, &[node], FileVersion::Fbx7500).unwrap();

    let (_, records) = common::reader::parse(&bytes);
    assert_eq!(records[0].values[0].as_float_array(), values.as_slice());

    // 512 doubles deflate well below their raw size, so the compressed
    // form must actually have been chosen.
    assert!(bytes.len() < 512 * 8);
}

#[test]
fn small_arrays_stay_uncompressed() {
    let node = RawNode::with("Payload", vec![Attribute::I32Array(vec![1, 2, 3])]);

    let mut bytes = Vec::new();
    binary::write_binary(&mut bytes, &[node], FileVersion::Fbx7500).unwrap();

    let (_, records) = common::reader::parse(&bytes);
    assert_eq!(records[0].values[0].as_int_array(), &[1, 2, 3]);
}

#[test]
fn edge_array_can_only_be_built_once() {
    let mut document = fbxport::FbxDocument::new();
    let geometry = document.add_geometry("plane");

    let target = document.geometry_mut(geometry).unwrap();
    target.init_control_points(3);
    target.begin_polygon();
    target.add_polygon_vertex(0);
    target.add_polygon_vertex(1);
    target.add_polygon_vertex(2);
    target.end_polygon();

    target.build_edge_array().unwrap();
    assert_eq!(target.edges().unwrap().len(), 3);
    assert!(target.build_edge_array().is_err());
}

#[test]
fn wide_record_switch_matches_the_version() {
    assert!(!FileVersion::Fbx7100.wide_records());
    assert!(!FileVersion::Fbx7400.wide_records());
    assert!(FileVersion::Fbx7500.wide_records());
}
