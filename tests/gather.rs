mod common;

use common::spine_chain_scene;
use fbxport::config::{ObjectSet, ObjectSetType};
use fbxport::gather::Gatherer;
use fbxport::math::Trs;
use fbxport::scene::{NodeKind, SceneAdapter};
use fbxport::scene::memory::MemoryScene;

#[test]
fn name_mode_resolves_the_root_pattern() {
    let (scene, joints) = spine_chain_scene();

    let set = ObjectSet::named("spine_01");
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert_eq!(gathered, vec![joints[0]]);
}

#[test]
fn name_mode_expands_children_when_asked() {
    let (scene, joints) = spine_chain_scene();

    let set = ObjectSet {
        include_children: true,
        ..ObjectSet::named("spine_01")
    };
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert_eq!(gathered, joints);
}

#[test]
fn exclude_children_drops_the_subtree() {
    let (scene, joints) = spine_chain_scene();

    let set = ObjectSet {
        include_children: true,
        exclude_objects: vec!["spine_03".to_string()],
        exclude_children: true,
        ..ObjectSet::named("spine_01")
    };
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert_eq!(gathered, vec![joints[0], joints[1]]);
}

#[test]
fn regex_include_with_name_exclude() {
    let (scene, joints) = spine_chain_scene();

    // Scenario: include everything spine-shaped, carve out one link.
    let set = ObjectSet {
        include_type: ObjectSetType::Regex,
        include_objects: vec!["spine_*".to_string()],
        exclude_objects: vec!["spine_03".to_string()],
        ..ObjectSet::named("")
    };
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert_eq!(gathered, vec![joints[0], joints[1], joints[3]]);
}

#[test]
fn layer_mode_draws_from_the_layer_table() {
    let (mut scene, joints) = spine_chain_scene();
    scene.assign_layer("rig", &[joints[1], joints[2]]);

    let set = ObjectSet {
        include_type: ObjectSetType::Layers,
        ..ObjectSet::named("rig")
    };
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert_eq!(gathered, vec![joints[1], joints[2]]);
}

#[test]
fn selection_set_mode_draws_from_the_set_table() {
    let (mut scene, joints) = spine_chain_scene();
    scene.assign_selection_set("export_joints", &[joints[3], joints[0]]);

    let set = ObjectSet {
        include_type: ObjectSetType::SelectionSets,
        ..ObjectSet::named("export_joints")
    };
    let gathered = Gatherer::new(&scene, "").gather(&set);

    // Set iteration order is preserved.
    assert_eq!(gathered, vec![joints[3], joints[0]]);
}

#[test]
fn duplicate_hits_are_deduplicated_in_first_seen_order() {
    let (scene, joints) = spine_chain_scene();

    let set = ObjectSet {
        include_objects: vec!["spine_02".to_string(), "spine_01".to_string()],
        ..ObjectSet::named("spine_01")
    };
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert_eq!(gathered, vec![joints[0], joints[1]]);
}

#[test]
fn unknown_include_pattern_yields_nothing() {
    let (scene, _) = spine_chain_scene();

    let set = ObjectSet::named("pelvis");
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert!(gathered.is_empty());
}

#[test]
fn malformed_regex_is_skipped() {
    let (scene, _) = spine_chain_scene();

    let set = ObjectSet {
        include_type: ObjectSetType::Regex,
        include_objects: vec!["[unclosed".to_string()],
        ..ObjectSet::named("")
    };
    let gathered = Gatherer::new(&scene, "").gather(&set);

    assert!(gathered.is_empty());
}

#[test]
fn namespace_prefixes_every_pattern() {
    let mut scene = MemoryScene::new();
    let hero_root = scene.add_node("hero:root", NodeKind::Joint, None);
    let villain_root = scene.add_node("villain:root", NodeKind::Joint, None);
    scene.set_rest(hero_root, Trs::identity());
    scene.set_rest(villain_root, Trs::identity());

    let set = ObjectSet::named("root");

    let heroes = Gatherer::new(&scene, "hero").gather(&set);
    assert_eq!(heroes, vec![hero_root]);

    let villains = Gatherer::new(&scene, "villain").gather(&set);
    assert_eq!(villains, vec![villain_root]);

    // No namespace, no match: the bare name does not exist.
    assert!(Gatherer::new(&scene, "").gather(&set).is_empty());
}

#[test]
fn regex_matches_short_names_inside_the_namespace() {
    let mut scene = MemoryScene::new();
    let hero = scene.add_node("hero:spine_01", NodeKind::Joint, None);
    scene.add_node("villain:spine_01", NodeKind::Joint, None);

    let set = ObjectSet {
        include_type: ObjectSetType::Regex,
        include_objects: vec!["spine_.*".to_string()],
        ..ObjectSet::named("")
    };
    let gathered = Gatherer::new(&scene, "hero").gather(&set);

    assert_eq!(gathered, vec![hero]);
}

#[test]
fn gather_does_not_mutate_scene_time() {
    let (mut scene, _) = spine_chain_scene();
    scene.set_frame(7.0);

    let set = ObjectSet {
        include_children: true,
        ..ObjectSet::named("spine_01")
    };
    let _ = Gatherer::new(&scene, "").gather(&set);

    assert_eq!(scene.current_frame(), 7.0);
}
