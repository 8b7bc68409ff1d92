use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use parking_lot::Mutex;
use rstest::rstest;
use tessera_core::math::{self, Vec2, Vec3};
use tessera_scene::{Node, NodeId, NodeKind, NodeStore, PayloadData, RenderHost};

fn spawn(store: &mut NodeStore, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
    let id = store.create(kind, &PayloadData::default(), None);
    assert!(store.add(id, parent, None));
    id
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).norm() < 1e-4
}

// ---------------------------------------------------------------------------
// Reparenting
// ---------------------------------------------------------------------------

#[test]
fn child_moved_to_root_keeps_world_position() {
    let mut store = NodeStore::new();
    let a = spawn(&mut store, NodeKind::Entity, None);
    let b = store.create(NodeKind::Entity, &PayloadData::default(), None);
    store.update(b, |n| n.set_position(Vec3::new(1.0, 0.0, 0.0)));
    assert!(store.add(b, Some(a), None));
    assert_eq!((a, b), (NodeId(1), NodeId(2)));

    assert!(store.move_node(b, None, None));

    assert_eq!(store.roots(), [a, b]);
    assert!(close(store.world_position(b).unwrap(), Vec3::new(1.0, 0.0, 0.0)));
    assert!(close(store.get(b).unwrap().position(), Vec3::new(1.0, 0.0, 0.0)));
}

#[rstest]
#[case::translated(Vec3::new(10.0, -4.0, 0.0), 0.0, Vec2::new(1.0, 1.0))]
#[case::scaled(Vec3::new(3.0, 2.0, 0.0), 0.0, Vec2::new(2.0, 0.5))]
#[case::rotated(Vec3::new(-2.0, 7.0, 0.0), FRAC_PI_2, Vec2::new(1.0, 1.0))]
#[case::rotated_and_scaled(Vec3::new(1.0, 1.0, 0.0), 0.7, Vec2::new(1.5, 1.5))]
fn reparent_preserves_world_position(
    #[case] parent_position: Vec3,
    #[case] parent_angle: f32,
    #[case] parent_scale: Vec2,
) {
    let mut store = NodeStore::new();
    let parent = spawn(&mut store, NodeKind::GoContainer, None);
    store.update(parent, |n| {
        n.set_position(parent_position);
        n.set_rotation(math::quat_from_rotation_z(parent_angle));
        n.set_scale(parent_scale);
    });
    let node = spawn(&mut store, NodeKind::GoSprite, None);
    store.update(node, |n| n.set_position(Vec3::new(5.0, 5.0, 0.0)));

    let before = store.world_position(node).unwrap();
    assert!(store.move_node(node, Some(parent), None));
    assert!(close(store.world_position(node).unwrap(), before));

    assert!(store.move_node(node, None, None));
    assert!(close(store.world_position(node).unwrap(), before));
}

#[test]
fn moving_into_own_subtree_is_rejected() {
    let mut store = NodeStore::new();
    let a = spawn(&mut store, NodeKind::Entity, None);
    let b = spawn(&mut store, NodeKind::Entity, Some(a));
    let c = spawn(&mut store, NodeKind::Entity, Some(b));
    let graph = store.graph();

    assert!(!store.move_node(a, Some(c), None));
    assert!(!store.move_node(a, Some(a), None));
    assert!(!store.move_node(b, Some(NodeId(99)), None));
    assert_eq!(store.graph(), graph);
}

#[test]
fn move_within_same_parent_lands_before_target() {
    let mut store = NodeStore::new();
    let parent = spawn(&mut store, NodeKind::Entity, None);
    let x = spawn(&mut store, NodeKind::Entity, Some(parent));
    let y = spawn(&mut store, NodeKind::Entity, Some(parent));
    let z = spawn(&mut store, NodeKind::Entity, Some(parent));

    assert!(store.move_node(x, Some(parent), Some(z)));
    assert_eq!(store.get(parent).unwrap().children(), [y, x, z]);

    assert!(store.move_node(z, Some(parent), Some(y)));
    assert_eq!(store.get(parent).unwrap().children(), [z, y, x]);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[test]
fn ids_stay_unique_across_edits() {
    let mut store = NodeStore::new();
    let mut live = Vec::new();
    for i in 0..20 {
        let parent = live.get(i / 3).copied().filter(|p| store.contains(*p));
        live.push(spawn(&mut store, NodeKind::Entity, parent));
        if i % 4 == 3 && live.len() > 2 {
            let victim = live[live.len() - 2];
            store.remove(victim);
        }
        live.retain(|id| store.contains(*id));
    }
    let explicit = store.create(NodeKind::Entity, &PayloadData::default(), Some(live[0]));
    assert_ne!(explicit, live[0]);
    store.add(explicit, None, None);

    let ids = store.walk();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(ids.len(), store.len());
}

#[test]
fn paths_follow_renames_and_moves() {
    let mut store = NodeStore::new();
    let root = spawn(&mut store, NodeKind::GoContainer, None);
    let child = spawn(&mut store, NodeKind::GoSprite, Some(root));
    store.rename(root, "level");
    store.rename(child, "hero");

    assert_eq!(store.path_of(child), Some(":/level#hero"));
    assert_eq!(store.get_by_path(":/level#hero").map(Node::id), Some(child));

    assert!(store.move_node(child, None, None));
    assert_eq!(store.path_of(child), Some(":/hero"));
    assert!(store.get_by_path(":/level#hero").is_none());
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct RecordingHost {
    disposed: Arc<Mutex<Vec<NodeId>>>,
    attached: Arc<Mutex<Vec<(NodeId, Option<NodeId>)>>>,
}

impl RenderHost for RecordingHost {
    fn on_attached(&mut self, node: &Node, parent: Option<NodeId>) {
        self.attached.lock().push((node.id(), parent));
    }

    fn dispose(&mut self, node: &Node) {
        self.disposed.lock().push(node.id());
    }
}

#[test]
fn remove_disposes_whole_subtree() {
    let host = RecordingHost::default();
    let mut store = NodeStore::with_host(Box::new(host.clone()));
    let a = spawn(&mut store, NodeKind::Entity, None);
    let b = spawn(&mut store, NodeKind::Entity, Some(a));
    let c = spawn(&mut store, NodeKind::Entity, Some(b));
    let keep = spawn(&mut store, NodeKind::Entity, None);

    assert_eq!(host.attached.lock().as_slice(), [(a, None), (b, Some(a)), (c, Some(b)), (keep, None)]);

    assert!(store.remove(a));
    assert_eq!(host.disposed.lock().as_slice(), [a, b, c]);
    assert_eq!(store.roots(), [keep]);
    assert!(store.path_of(c).is_none());
    assert!(!store.remove(a));
}

#[test]
fn debug_graph_indents_children() {
    let mut store = NodeStore::new();
    let a = spawn(&mut store, NodeKind::Entity, None);
    let b = spawn(&mut store, NodeKind::Entity, Some(a));
    spawn(&mut store, NodeKind::Entity, Some(b));
    store.rename(a, "a");
    store.rename(b, "b");

    let graph = store.debug_graph();
    let lines: Vec<_> = graph.lines().collect();
    assert_eq!(lines[0], " a");
    assert_eq!(lines[1], "    b");
    assert!(lines[2].starts_with("       "));
}
