use rstest::{fixture, rstest};
use tessera_core::abstract_editor::EditActionError;
use tessera_core::math::Vec3;
use tessera_scene::{NodeDto, NodeId, NodeKind, PayloadData, SceneEditor};

/// Whole-scene snapshot with ids, used to compare trees.
fn snapshot(editor: &SceneEditor) -> Vec<NodeDto> {
    editor.save_scene()
}

/// Snapshot without ids, for edits that allocate fresh ids on redo.
fn shape(editor: &SceneEditor) -> Vec<NodeDto> {
    let mut scene = editor.save_scene();
    scene.iter_mut().for_each(NodeDto::strip_identity);
    scene
}

/// `root` with three entity children `a`, `b`, `c`.
struct Fixture {
    editor: SceneEditor,
    root: NodeId,
    a: NodeId,
    b: NodeId,
    c: NodeId,
}

#[fixture]
fn fx() -> Fixture {
    let mut editor = SceneEditor::default();
    let root = editor.create_go_container(None).unwrap();
    let a = editor.create_entity(Some(root)).unwrap();
    let b = editor.create_entity(Some(root)).unwrap();
    let c = editor.create_entity(Some(root)).unwrap();
    editor.mark_saved();
    Fixture { editor, root, a, b, c }
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

#[rstest]
fn cut_without_paste_leaves_tree_untouched(mut fx: Fixture) {
    let before = snapshot(&fx.editor);
    fx.editor.selection_mut().set_selected(&[fx.a, fx.b]);

    assert_eq!(fx.editor.cut(), 2);
    assert!(fx.editor.clipboard().is_cut());
    assert_eq!(snapshot(&fx.editor), before);
    assert!(!fx.editor.has_unsaved_changes());
}

#[rstest]
fn paste_after_cut_removes_originals(mut fx: Fixture) {
    fx.editor.selection_mut().set_selected(&[fx.a]);
    fx.editor.cut();

    let pasted = fx.editor.paste();
    assert_eq!(pasted.len(), 1);
    assert!(!fx.editor.store().contains(fx.a));
    assert_ne!(pasted[0], fx.a);
    assert!(fx.editor.store().roots().contains(&pasted[0]));
    assert_eq!(fx.editor.selection().selected(), pasted.as_slice());

    // The cut is consumed; a second paste copies again.
    let again = fx.editor.paste();
    assert_eq!(again.len(), 1);
    assert_eq!(fx.editor.store().roots().len(), 3);
}

#[rstest]
fn copy_paste_as_child_keeps_world_position(mut fx: Fixture) {
    fx.editor.store_mut().update(fx.a, |n| n.set_position(Vec3::new(4.0, 2.0, 0.0)));
    let target = fx.editor.create_go_container(None).unwrap();
    fx.editor.store_mut().update(target, |n| n.set_position(Vec3::new(-10.0, 0.0, 0.0)));
    let world = fx.editor.store().world_position(fx.a).unwrap();

    fx.editor.selection_mut().set_selected(&[fx.a]);
    assert_eq!(fx.editor.copy(), 1);
    let pasted = fx.editor.paste_as_child(target);

    assert_eq!(pasted.len(), 1);
    assert!(fx.editor.store().contains(fx.a));
    assert_eq!(fx.editor.store().get(pasted[0]).unwrap().parent(), Some(target));
    let pasted_world = fx.editor.store().world_position(pasted[0]).unwrap();
    assert!((pasted_world - world).norm() < 1e-3);
}

#[rstest]
fn paste_as_child_rejects_foreign_domain(mut fx: Fixture) {
    let gui = fx.editor.create_gui_container(None).unwrap();
    fx.editor.selection_mut().set_selected(&[fx.a]);
    fx.editor.copy();
    assert!(fx.editor.paste_as_child(gui).is_empty());
}

#[rstest]
fn cut_cannot_be_pasted_into_itself(mut fx: Fixture) {
    fx.editor.selection_mut().set_selected(&[fx.root]);
    fx.editor.cut();
    assert!(fx.editor.paste_as_child(fx.b).is_empty());
    assert!(fx.editor.store().contains(fx.root));
}

// ---------------------------------------------------------------------------
// Recorded operations
// ---------------------------------------------------------------------------

#[rstest]
fn delete_then_undo_restores_order(mut fx: Fixture) {
    let before = snapshot(&fx.editor);
    // Selection order differs from sibling order.
    fx.editor.selection_mut().set_selected(&[fx.b, fx.a]);

    assert_eq!(fx.editor.delete_selected(), 2);
    assert_eq!(fx.editor.store().get(fx.root).unwrap().children(), [fx.c]);
    assert!(fx.editor.selection().is_empty());

    fx.editor.undo().unwrap();
    assert_eq!(fx.editor.store().get(fx.root).unwrap().children(), [fx.a, fx.b, fx.c]);
    assert_eq!(snapshot(&fx.editor), before);

    fx.editor.redo().unwrap();
    assert_eq!(fx.editor.store().get(fx.root).unwrap().children(), [fx.c]);
}

#[rstest]
fn protected_nodes_survive_delete(mut fx: Fixture) {
    fx.editor.store_mut().update(fx.b, |n| n.flags.no_removing = true);
    fx.editor.selection_mut().set_selected(&[fx.a, fx.b]);

    assert_eq!(fx.editor.delete_selected(), 1);
    assert!(fx.editor.store().contains(fx.b));
    assert!(!fx.editor.store().contains(fx.a));
}

#[rstest]
fn nodes_with_protected_descendants_survive_delete(mut fx: Fixture) {
    let child = fx.editor.create_entity(Some(fx.a)).unwrap();
    fx.editor.store_mut().update(child, |n| n.flags.no_removing = true);
    fx.editor.selection_mut().set_selected(&[fx.a]);

    assert_eq!(fx.editor.delete_selected(), 0);
    assert!(fx.editor.store().contains(fx.a));
    assert!(fx.editor.store().contains(child));
}

#[rstest]
fn cut_and_paste_copies_protected_nodes(mut fx: Fixture) {
    fx.editor.store_mut().update(fx.b, |n| n.flags.no_removing = true);
    fx.editor.selection_mut().set_selected(&[fx.a, fx.b]);

    assert_eq!(fx.editor.cut(), 2);
    assert_eq!(fx.editor.clipboard().cut_ids(), [fx.a]);

    let pasted = fx.editor.paste();
    assert_eq!(pasted.len(), 2);
    assert!(!fx.editor.store().contains(fx.a));
    assert!(fx.editor.store().contains(fx.b));
    assert_eq!(fx.editor.store().get(fx.root).unwrap().children(), [fx.b, fx.c]);
}

#[rstest]
fn duplicate_inserts_after_original(mut fx: Fixture) {
    fx.editor.selection_mut().set_selected(&[fx.a]);
    let copies = fx.editor.duplicate();
    assert_eq!(copies.len(), 1);
    assert_eq!(fx.editor.store().get(fx.root).unwrap().children(), [fx.a, copies[0], fx.b, fx.c]);

    fx.editor.undo().unwrap();
    assert_eq!(fx.editor.store().get(fx.root).unwrap().children(), [fx.a, fx.b, fx.c]);

    fx.editor.redo().unwrap();
    let children = fx.editor.store().get(fx.root).unwrap().children().to_vec();
    assert_eq!(children.len(), 4);
    assert_eq!(children[0], fx.a);
    assert_eq!(fx.editor.selection().selected(), [children[1]]);
}

#[rstest]
#[case::into_sibling(true)]
#[case::before_sibling(false)]
fn move_is_undoable(mut fx: Fixture, #[case] as_child: bool) {
    let before = snapshot(&fx.editor);
    assert!(fx.editor.move_nodes(&[fx.c], Some(fx.a), as_child));
    let after = snapshot(&fx.editor);
    assert_ne!(after, before);

    fx.editor.undo().unwrap();
    assert_eq!(snapshot(&fx.editor), before);
    fx.editor.redo().unwrap();
    assert_eq!(snapshot(&fx.editor), after);
}

#[rstest]
fn move_into_descendant_is_rejected(mut fx: Fixture) {
    let before = snapshot(&fx.editor);
    assert!(!fx.editor.move_nodes(&[fx.root], Some(fx.a), true));
    assert!(!fx.editor.move_nodes(&[fx.a], Some(fx.a), true));
    assert_eq!(snapshot(&fx.editor), before);
    assert!(!fx.editor.has_unsaved_changes());
}

#[rstest]
fn create_redo_allocates_new_id(mut fx: Fixture) {
    let id = fx.editor.create_entity(Some(fx.root)).unwrap();
    fx.editor.undo().unwrap();
    assert!(!fx.editor.store().contains(id));

    fx.editor.redo().unwrap();
    let children = fx.editor.store().get(fx.root).unwrap().children();
    assert_eq!(children.len(), 4);
    assert_ne!(children[3], id);
}

#[rstest]
fn undo_redo_is_symmetric_for_every_action(mut fx: Fixture) {
    let (a, c) = (fx.a, fx.c);
    fx.editor.selection_mut().set_selected(&[fx.b]);
    let ops: Vec<Box<dyn Fn(&mut SceneEditor)>> = vec![
        Box::new(move |e| assert!(e.rename(a, "renamed"))),
        Box::new(move |e| assert!(e.set_visible(&[a, c], false))),
        Box::new(move |e| assert!(e.set_position(c, Vec3::new(7.0, 1.0, 0.0)))),
        Box::new(|e| assert_eq!(e.duplicate().len(), 1)),
        Box::new(|e| assert_eq!(e.delete_selected(), 1)),
    ];
    for op in ops {
        op(&mut fx.editor);
        let after = shape(&fx.editor);
        fx.editor.undo().unwrap();
        fx.editor.redo().unwrap();
        assert_eq!(shape(&fx.editor), after);
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[rstest]
fn group_undoes_as_one_step(mut fx: Fixture) {
    let before = snapshot(&fx.editor);
    let history_before = fx.editor.history().undo_count();

    fx.editor.begin_group("Setup");
    fx.editor.rename(fx.a, "left");
    fx.editor.rename(fx.c, "right");
    assert!(matches!(fx.editor.undo(), Err(EditActionError::InvalidState(_))));
    assert!(fx.editor.end_group());
    assert_eq!(fx.editor.history().undo_count(), history_before + 1);

    fx.editor.undo().unwrap();
    assert_eq!(snapshot(&fx.editor), before);
}

#[test]
fn group_on_empty_history_leaves_nothing_to_undo() {
    let mut editor = SceneEditor::default();
    editor.begin_group("Spawn");
    editor.create_entity(None).unwrap();
    editor.create_entity(None).unwrap();
    editor.end_group();

    editor.undo().unwrap();
    assert!(editor.store().is_empty());
    assert_eq!(editor.undo(), Err(EditActionError::NothingToUndo));
}

/// Redo gives a created node a fresh id, so a later action in the same
/// group that names the old id can no longer find its parent.
#[test]
fn redo_of_group_creating_parent_and_child_fails_cleanly() {
    let mut editor = SceneEditor::default();
    editor.begin_group("Spawn");
    let parent = editor.create_go_container(None).unwrap();
    editor.create_entity(Some(parent)).unwrap();
    editor.end_group();

    editor.undo().unwrap();
    assert!(editor.store().is_empty());

    assert!(matches!(editor.redo(), Err(EditActionError::TargetNotFound(_))));
    assert!(editor.store().is_empty());
    assert!(editor.can_redo());
    assert!(!editor.can_undo());
}

#[rstest]
fn named_create_keeps_its_name_on_redo(mut fx: Fixture) {
    let id = fx
        .editor
        .create_named(NodeKind::Entity, PayloadData::default(), Some(fx.root), "hero")
        .unwrap();
    assert_eq!(fx.editor.store().get(id).unwrap().name(), "hero");

    fx.editor.undo().unwrap();
    fx.editor.redo().unwrap();
    let redone = *fx.editor.store().get(fx.root).unwrap().children().last().unwrap();
    assert_ne!(redone, id);
    assert_eq!(fx.editor.store().get(redone).unwrap().name(), "hero");
}

#[rstest]
fn loading_a_scene_resets_history(mut fx: Fixture) {
    let scene = snapshot(&fx.editor);
    fx.editor.rename(fx.a, "dirty");
    assert!(fx.editor.has_unsaved_changes());

    fx.editor.load_scene(&scene);
    assert!(!fx.editor.can_undo());
    assert!(!fx.editor.has_unsaved_changes());
    assert_eq!(snapshot(&fx.editor), scene);
}
