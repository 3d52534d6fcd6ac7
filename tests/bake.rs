mod common;

use std::fs;

use common::{animated_root_scene, offset_root_scene};
use fbxport::config::{ExportRange, ExportSet, ObjectSet};
use fbxport::objects::{FbxObject, ObjectNode};
use fbxport::scene::memory::MemoryScene;
use fbxport::serializer::FbxSerializer;
use fbxport::time::{FbxTime, TimeMode};
use fbxport::version::{FileFormat, FileVersion};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("fbxport_bake_{name}_{}.fbx", std::process::id()))
}

fn root_set() -> ExportSet {
    ExportSet {
        name: "rig".to_string(),
        skeleton: ObjectSet::named("root"),
        ..Default::default()
    }
}

fn find_curve<'a>(
    document: &'a fbxport::FbxDocument,
    name: &str,
) -> Option<&'a fbxport::objects::AnimCurve> {
    document.objects().find_map(|object| match object {
        FbxObject::AnimCurve(curve) if curve.name() == name => Some(curve),
        _ => None,
    })
}

#[test]
fn fractional_step_bake() {
    let (mut scene, _) = animated_root_scene();
    let path = temp_path("fractional_step");

    let range = ExportRange {
        name: "walk".to_string(),
        start_frame: 0.0,
        end_frame: 10.0,
        step: 0.5,
        use_timeline: false,
        ..Default::default()
    };

    let mut serializer = FbxSerializer::new(&mut scene, "");
    let saved = serializer
        .serialize_export_range(&range, &root_set(), &path, FileVersion::Fbx7500, FileFormat::Binary)
        .unwrap();
    assert!(saved.is_some());

    let document = serializer.document();
    assert_eq!(document.time_mode(), TimeMode::Frames30);
    assert_eq!(
        document.time_span(),
        (
            FbxTime::from_frame(0.0, TimeMode::Frames30),
            FbxTime::from_frame(10.0, TimeMode::Frames30)
        )
    );

    let curve = find_curve(document, "root_anim_translateX").unwrap();
    assert_eq!(curve.key_count(), 21);

    for (index, (time, value)) in curve.keys().enumerate() {
        let frame = index as f64 * 0.5;
        assert_eq!(time, FbxTime::from_frame(frame, TimeMode::Frames30));
        assert!((value - frame).abs() < 1e-9, "key {index}: {value} != {frame}");
    }

    // The other eight channels exist too, sampled at every step.
    for name in [
        "root_anim_translateY",
        "root_anim_translateZ",
        "root_anim_rotateX",
        "root_anim_rotateY",
        "root_anim_rotateZ",
        "root_anim_scaleX",
        "root_anim_scaleY",
        "root_anim_scaleZ",
    ] {
        assert_eq!(find_curve(document, name).unwrap().key_count(), 21);
    }

    fs::remove_file(&path).ok();
}

#[test]
fn baked_values_follow_the_source_track() {
    let (mut scene, _) = animated_root_scene();
    let path = temp_path("values");

    let range = ExportRange {
        name: "walk".to_string(),
        start_frame: 2.0,
        end_frame: 6.0,
        step: 1.0,
        use_timeline: false,
        ..Default::default()
    };

    let mut serializer = FbxSerializer::new(&mut scene, "");
    serializer
        .serialize_export_range(&range, &root_set(), &path, FileVersion::Fbx7500, FileFormat::Binary)
        .unwrap();

    let curve = find_curve(serializer.document(), "root_anim_translateX").unwrap();
    let values: Vec<f64> = curve.keys().map(|(_, value)| value).collect();
    assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0, 6.0]);

    fs::remove_file(&path).ok();
}

#[test]
fn timeline_range_wins_when_requested() {
    let (mut scene, _) = animated_root_scene();
    scene.set_timeline(3.0, 5.0);
    let path = temp_path("timeline");

    let range = ExportRange {
        name: "walk".to_string(),
        start_frame: 0.0,
        end_frame: 10.0,
        step: 1.0,
        use_timeline: true,
        ..Default::default()
    };

    let mut serializer = FbxSerializer::new(&mut scene, "");
    serializer
        .serialize_export_range(&range, &root_set(), &path, FileVersion::Fbx7500, FileFormat::Binary)
        .unwrap();

    let curve = find_curve(serializer.document(), "root_anim_translateX").unwrap();
    assert_eq!(curve.key_count(), 3);

    fs::remove_file(&path).ok();
}

#[test]
fn viewport_is_resumed_after_the_bake() {
    let (mut scene, _) = animated_root_scene();
    let path = temp_path("viewport");

    let range = ExportRange {
        name: "walk".to_string(),
        start_frame: 0.0,
        end_frame: 2.0,
        step: 1.0,
        use_timeline: false,
        ..Default::default()
    };

    {
        let mut serializer = FbxSerializer::new(&mut scene, "");
        serializer
            .serialize_export_range(&range, &root_set(), &path, FileVersion::Fbx7500, FileFormat::Binary)
            .unwrap();
    }

    assert_eq!(scene.viewport_suspensions(), 0);

    fs::remove_file(&path).ok();
}

#[test]
fn move_to_origin_replaces_curves_with_the_bind_transform() {
    let (mut scene, root) = offset_root_scene();
    let path = temp_path("move_to_origin");

    let range = ExportRange {
        name: "walk".to_string(),
        start_frame: 0.0,
        end_frame: 10.0,
        step: 1.0,
        use_timeline: false,
        move_to_origin: true,
        ..Default::default()
    };

    let mut serializer = FbxSerializer::new(&mut scene, "");
    serializer
        .serialize_export_range(&range, &root_set(), &path, FileVersion::Fbx7500, FileFormat::Binary)
        .unwrap();

    let document = serializer.document();

    // The offset parent was never gathered, so the joint is a root child.
    let shell = serializer.shell(root).unwrap();
    assert_eq!(document.parent_of(shell.model), fbxport::objects::ObjectId::ROOT);

    // Every transform curve on the root child is gone.
    assert!(document.curve_nodes_of(shell.model).is_empty());
    assert!(find_curve(document, "root_anim_translateX").is_none());

    // The static transform equals the bind pose, wiping the baked motion.
    let model = document.model(shell.model).unwrap();
    assert_eq!(model.translation, glam::DVec3::ZERO);
    assert_eq!(model.scaling, glam::DVec3::ONE);

    fs::remove_file(&path).ok();
}

#[test]
fn animated_exports_are_deterministic() {
    let path_a = temp_path("determinism_a");
    let path_b = temp_path("determinism_b");

    for path in [&path_a, &path_b] {
        let (mut scene, _) = animated_root_scene();
        let range = ExportRange {
            name: "walk".to_string(),
            start_frame: 0.0,
            end_frame: 10.0,
            step: 0.5,
            use_timeline: false,
            ..Default::default()
        };

        let mut serializer = FbxSerializer::new(&mut scene, "");
        serializer
            .serialize_export_range(&range, &root_set(), path, FileVersion::Fbx7500, FileFormat::Binary)
            .unwrap();
    }

    let bytes_a = fs::read(&path_a).unwrap();
    let bytes_b = fs::read(&path_b).unwrap();
    assert_eq!(bytes_a, bytes_b);

    fs::remove_file(&path_a).ok();
    fs::remove_file(&path_b).ok();
}

#[test]
fn empty_skeleton_range_produces_no_file() {
    let mut scene = MemoryScene::new();
    let path = temp_path("empty_range");

    let range = ExportRange {
        name: "walk".to_string(),
        use_timeline: false,
        ..Default::default()
    };

    let mut serializer = FbxSerializer::new(&mut scene, "");
    let saved = serializer
        .serialize_export_range(&range, &root_set(), &path, FileVersion::Fbx7500, FileFormat::Binary)
        .unwrap();

    assert!(saved.is_none());
    assert!(!path.exists());
}
