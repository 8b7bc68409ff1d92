use tessera_core::math::{Vec3, quat_from_rotation_z};
use tessera_scene::serializer::{read_scene_file, scene_from_ron, scene_to_ron, session_from_ron, session_to_ron};
use tessera_scene::{NodeDto, NodeId, NodeKind, NodeStore, PayloadData};

fn spawn(store: &mut NodeStore, kind: NodeKind, params: PayloadData, parent: Option<NodeId>) -> NodeId {
    let id = store.create(kind, &params, None);
    assert!(store.add(id, parent, None));
    id
}

/// GUI tree plus a GO tree with rotation, scale and a hidden node.
fn sample_store() -> NodeStore {
    let mut store = NodeStore::new();
    let gui = spawn(&mut store, NodeKind::GuiContainer, PayloadData::default(), None);
    let panel = spawn(
        &mut store,
        NodeKind::GuiBox,
        PayloadData::default().with_size(200.0, 120.0).with_clipping(true),
        Some(gui),
    );
    spawn(&mut store, NodeKind::GuiText, PayloadData::default().with_text("Score"), Some(panel));

    let level = spawn(&mut store, NodeKind::GoContainer, PayloadData::default(), None);
    store.update(level, |n| {
        n.set_position(Vec3::new(100.0, 50.0, 0.0));
        n.set_rotation(quat_from_rotation_z(0.5));
    });
    let hero = spawn(
        &mut store,
        NodeKind::GoSprite,
        PayloadData::default().with_size(64.0, 64.0).with_texture("hero", "characters"),
        Some(level),
    );
    store.rename(hero, "hero");
    store.update(hero, |n| n.visible = false);
    spawn(&mut store, NodeKind::GoLabel, PayloadData::default().with_text("HP"), Some(hero));
    store
}

#[test]
fn scene_round_trips_through_ron() {
    let store = sample_store();
    let saved = store.save_scene();
    assert_eq!(saved.len(), 2);

    let text = scene_to_ron(&saved).unwrap();
    let decoded = scene_from_ron(&text).unwrap();
    assert_eq!(decoded, saved);

    let mut restored = NodeStore::new();
    restored.load_scene(&decoded);
    assert_eq!(restored.save_scene(), saved);
    assert_eq!(restored.graph(), store.graph());
}

#[test]
fn loaded_scene_keeps_saved_ids() {
    let store = sample_store();
    let mut restored = NodeStore::new();
    restored.load_scene(&store.save_scene());

    let hero = restored.get_by_name("hero").unwrap();
    assert_eq!(Some(hero.id()), store.get_by_name("hero").map(|n| n.id()));
    assert!(!hero.visible);
    assert_eq!(hero.payload.texture(), Some(("hero", "characters")));
}

#[test]
fn subtree_snapshot_stores_top_in_world_space() {
    let store = sample_store();
    let hero = store.get_by_name("hero").unwrap().id();
    let dto = store.serialize(hero, true, false).unwrap();
    let world = store.world_position(hero).unwrap();

    assert_eq!(dto.id, None);
    assert_eq!(dto.parent_id, None);
    assert!((Vec3::from(dto.position) - world).norm() < 1e-3);
    assert_eq!(dto.children.len(), 1);
    assert_eq!(dto.children[0].position, [0.0, 0.0, 0.0]);

    let shallow = store.serialize(hero, false, true).unwrap();
    assert!(shallow.children.is_empty());
    assert_eq!(shallow.id, Some(hero.0));
}

#[test]
fn import_places_scene_under_fresh_container() {
    let mut store = sample_store();
    let before = store.len();
    let scene = sample_store().save_scene();
    let max = scene.iter().map(NodeDto::max_id).max().unwrap();

    let container = store.import_scene(&scene, "imported").unwrap();

    let node = store.get(container).unwrap();
    assert_eq!(node.name(), "imported");
    assert_eq!(node.kind(), NodeKind::GoContainer);
    assert_eq!(node.children().len(), 2);
    assert_eq!(store.len(), before * 2 + 1);
    assert!(store.descendants(container).iter().skip(1).all(|id| id.0 > max));
}

#[test]
fn import_rejects_ids_that_cannot_be_shifted() {
    let mut store = sample_store();
    let before = store.save_scene();
    let counter = store.id_counter();

    let mut scene = sample_store().save_scene();
    scene[0].id = Some(u32::MAX);

    assert_eq!(store.import_scene(&scene, "overflow"), None);
    assert_eq!(store.save_scene(), before);
    assert_eq!(store.id_counter(), counter);
    assert!(store.get_by_name("overflow").is_none());
}

#[test]
fn files_and_session_state_round_trip() {
    let dir = std::env::temp_dir().join(format!("tessera-scene-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("level.ron");

    let store = sample_store();
    store.save_scene_file(&path).unwrap();
    assert_eq!(read_scene_file(&path).unwrap(), store.save_scene());

    let mut loaded = NodeStore::new();
    loaded.load_scene_file(&path).unwrap();
    assert_eq!(loaded.len(), store.len());

    let state = store.session_state();
    let text = session_to_ron(&state).unwrap();
    assert_eq!(session_from_ron(&text).unwrap(), state);

    assert!(read_scene_file(&dir.join("missing.ron")).is_err());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn malformed_scene_is_a_decode_error() {
    let err = scene_from_ron("[(type: \"not_a_kind\")]").unwrap_err();
    assert!(matches!(err, tessera_scene::SceneError::Decode(_)));
}
