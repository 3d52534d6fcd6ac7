use fbxport::config::{ExportRange, ExportSet, MeshSettings, ObjectSet, ObjectSetType};

#[test]
fn export_set_round_trips_through_json() {
    let export_set = ExportSet {
        name: "character".to_string(),
        scale: 1.0,
        move_to_origin: true,
        skeleton: ObjectSet {
            name: "root".to_string(),
            include_children: true,
            ..Default::default()
        },
        mesh: ObjectSet {
            name: "geo".to_string(),
            include_type: ObjectSetType::Layers,
            include_objects: vec!["render_meshes".to_string()],
            ..Default::default()
        },
        mesh_settings: MeshSettings {
            include_color_sets: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let json = serde_json::to_string(&export_set).unwrap();
    let parsed: ExportSet = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, export_set);
}

#[test]
fn export_range_round_trips_through_json() {
    let export_range = ExportRange {
        name: "walk_cycle".to_string(),
        start_frame: 10.0,
        end_frame: 42.0,
        step: 0.5,
        use_timeline: false,
        move_to_origin: true,
        export_set_id: 2,
    };

    let json = serde_json::to_string(&export_range).unwrap();
    let parsed: ExportRange = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, export_range);
}

#[test]
fn object_set_type_serializes_by_name() {
    let json = serde_json::to_string(&ObjectSetType::SelectionSets).unwrap();
    assert_eq!(json, "\"SelectionSets\"");
}

#[test]
fn defaults_deserialize_from_a_full_document() {
    let json = r#"{
        "name": "props",
        "scale": 1.0,
        "move_to_origin": false,
        "remove_display_layers": true,
        "remove_containers": true,
        "skeleton": {
            "name": "",
            "include_type": "Nodes",
            "include_objects": [],
            "include_children": false,
            "exclude_type": "Nodes",
            "exclude_objects": [],
            "exclude_children": false
        },
        "camera": {
            "name": "",
            "include_type": "Nodes",
            "include_objects": [],
            "include_children": false,
            "exclude_type": "Nodes",
            "exclude_objects": [],
            "exclude_children": false
        },
        "mesh": {
            "name": "",
            "include_type": "Nodes",
            "include_objects": [],
            "include_children": false,
            "exclude_type": "Nodes",
            "exclude_objects": [],
            "exclude_children": false
        },
        "mesh_settings": {
            "include_normals": true,
            "include_smoothings": true,
            "include_color_sets": false,
            "include_tangents_and_binormals": false,
            "include_skins": true,
            "include_blendshapes": false
        }
    }"#;

    let parsed: ExportSet = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.name, "props");
    assert_eq!(parsed.mesh_settings, MeshSettings::default());
}
