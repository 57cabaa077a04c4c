//! Integration tests: history through the editor (pg-editor).
//!
//! Covers discrete edits (add, delete), their undo/redo, keyboard chords
//! and the interaction between `load` and history.

mod common;

use common::*;
use pg_core::{Document, NodeId, Page};
use pg_editor::{EditorConfig, EventKind, InputEvent, Modifiers};
use pretty_assertions::assert_eq;

const SHIFT_CTRL: Modifiers = Modifiers {
    shift: true,
    ctrl: true,
    alt: false,
    meta: false,
};

// ─── addNode ────────────────────────────────────────────────────────────

#[test]
fn add_node_undo_redo() {
    let (editor, _) = editor();
    let n = rect("n", 5.0, 5.0, 20.0, 20.0);

    assert!(editor.add_node(n.clone()));
    assert_eq!(ids(&editor.selection()), vec!["n"]);
    assert!(editor.doc().contains(n.id));

    assert!(editor.undo());
    assert!(!editor.doc().contains(n.id));
    assert!(editor.can_redo());

    assert!(editor.redo());
    let doc = editor.doc();
    assert_eq!(doc.get(n.id).map(|node| (**node).clone()), Some(n));
    assert_eq!(ids(&editor.selection()), vec!["n"]);
    assert!(!editor.can_redo());
}

#[test]
fn duplicate_add_is_ignored() {
    let (editor, _) = editor();
    assert!(editor.add_node(rect("dup", 0.0, 0.0, 1.0, 1.0)));
    assert!(!editor.add_node(rect("dup", 50.0, 50.0, 1.0, 1.0)));

    assert_eq!(editor.doc().len(), 1);
    assert_eq!(pos(&editor, "dup"), (0.0, 0.0));
    // Only the first add is in history.
    assert!(editor.undo());
    assert!(!editor.can_undo());
}

#[test]
fn new_edit_discards_redo_branch() {
    let (editor, _) = editor();
    editor.add_node(rect("one", 0.0, 0.0, 1.0, 1.0));
    editor.undo();
    assert!(editor.can_redo());

    editor.add_node(rect("two", 0.0, 0.0, 1.0, 1.0));
    assert!(!editor.can_redo());
    assert!(!editor.redo());
}

// ─── Empty stacks ───────────────────────────────────────────────────────

#[test]
fn undo_on_empty_history_does_nothing() {
    let (editor, recorder) = editor();
    let changes = record_events(&editor, EventKind::Change);
    let frames = recorder.frame_count();

    assert!(!editor.undo());
    assert!(!editor.redo());

    assert!(changes.borrow().is_empty());
    assert_eq!(recorder.frame_count(), frames);
}

// ─── Delete ─────────────────────────────────────────────────────────────

#[test]
fn delete_key_removes_selection_as_one_step() {
    let (editor, _) = editor();
    editor.load(three_squares());
    editor.set_selection([NodeId::intern("a"), NodeId::intern("c")]);

    assert!(editor.handle_input(&InputEvent::key("Delete", Modifiers::NONE)));

    let doc = editor.doc();
    assert_eq!(doc.len(), 1);
    assert!(doc.contains(NodeId::intern("b")));
    assert!(editor.selection().is_empty());

    editor.undo();
    assert_eq!(editor.doc(), three_squares());
}

#[test]
fn delete_with_empty_selection_is_not_consumed() {
    let (editor, _) = editor();
    editor.load(three_squares());
    assert!(!editor.handle_input(&InputEvent::key("Backspace", Modifiers::NONE)));
    assert!(!editor.can_undo());
}

// ─── Keyboard chords ────────────────────────────────────────────────────

#[test]
fn keyboard_undo_redo() {
    let (editor, _) = editor();
    editor.add_node(rect("k", 0.0, 0.0, 1.0, 1.0));

    assert!(editor.handle_input(&InputEvent::key("z", Modifiers::CTRL)));
    assert!(editor.doc().is_empty());

    assert!(editor.handle_input(&InputEvent::key("Z", SHIFT_CTRL)));
    assert_eq!(editor.doc().len(), 1);

    editor.handle_input(&InputEvent::key("z", Modifiers::CTRL));
    assert!(editor.handle_input(&InputEvent::key("y", Modifiers::CTRL)));
    assert_eq!(editor.doc().len(), 1);
}

#[test]
fn unbound_keys_are_not_consumed() {
    let (editor, _) = editor();
    assert!(!editor.handle_input(&InputEvent::key("q", Modifiers::NONE)));
}

// ─── load ───────────────────────────────────────────────────────────────

#[test]
fn load_is_not_undoable_and_clears_selection() {
    let (editor, _) = editor();
    let selections = record_events(&editor, EventKind::Selection);
    editor.set_selection([NodeId::intern("ghost")]);

    editor.load(three_squares());

    assert_eq!(editor.doc(), three_squares());
    assert!(editor.selection().is_empty());
    assert!(!editor.can_undo());
    assert_eq!(selections.borrow().len(), 2);
}

#[test]
fn load_keeps_existing_history() {
    let (editor, _) = editor();
    editor.add_node(rect("kept", 0.0, 0.0, 1.0, 1.0));
    editor.load(Document::new(Page::default()));
    assert!(editor.can_undo());

    editor.clear_history();
    assert!(!editor.can_undo());
}

#[test]
fn history_limit_from_config() {
    let config = EditorConfig {
        history_limit: Some(2),
        ..EditorConfig::default()
    };
    let (editor, _) = editor_with(Vec::new(), config);
    for n in 0..4 {
        editor.add_node(rect(&format!("n{n}"), 0.0, 0.0, 1.0, 1.0));
    }
    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(editor.doc().len(), 2);
}

#[test]
fn serialize_matches_loaded_document() {
    let (editor, _) = editor();
    let doc = three_squares();
    editor.load(doc.clone());
    let reparsed = pg_core::parse_document(&editor.serialize()).unwrap();
    assert_eq!(reparsed, doc);
}
