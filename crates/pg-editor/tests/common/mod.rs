//! Shared fixtures for pg-editor integration tests.
#![allow(dead_code)]

use pg_core::{Color, Document, Node, NodeId, Page, Viewport};
use pg_editor::{EditorConfig, EditorEvent, Editor, EventKind, Plugin};
use pg_render::SceneRenderer;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// One `render` call as the renderer saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub doc: Document,
    pub viewport: Viewport,
    pub selection: Vec<NodeId>,
}

/// Renderer that records frames instead of drawing.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub frames: Rc<RefCell<Vec<Frame>>>,
    pub destroyed: Rc<Cell<bool>>,
}

impl Recorder {
    pub fn frame_count(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn last(&self) -> Option<Frame> {
        self.frames.borrow().last().cloned()
    }
}

impl SceneRenderer for Recorder {
    fn render(&mut self, doc: &Document, viewport: &Viewport, selection: &[NodeId]) {
        if self.destroyed.get() {
            return;
        }
        self.frames.borrow_mut().push(Frame {
            doc: doc.clone(),
            viewport: *viewport,
            selection: selection.to_vec(),
        });
    }

    fn destroy(&mut self) {
        self.destroyed.set(true);
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn editor() -> (Editor, Recorder) {
    editor_with(Vec::new(), EditorConfig::default())
}

pub fn editor_with(plugins: Vec<Rc<dyn Plugin>>, config: EditorConfig) -> (Editor, Recorder) {
    init_logging();
    let recorder = Recorder::default();
    let editor = Editor::new(recorder.clone(), plugins, config);
    (editor, recorder)
}

pub fn rect(id: &str, x: f32, y: f32, w: f32, h: f32) -> Node {
    Node::rect(id, x, y, w, h, Color::rgba(0.2, 0.4, 0.8, 1.0))
}

/// Three 10×10 squares in a row at x = 0, 20, 40.
pub fn three_squares() -> Document {
    Document::with_nodes(
        Page::default(),
        [
            rect("a", 0.0, 0.0, 10.0, 10.0),
            rect("b", 20.0, 0.0, 10.0, 10.0),
            rect("c", 40.0, 0.0, 10.0, 10.0),
        ],
    )
}

pub fn pos(editor: &Editor, id: &str) -> (f32, f32) {
    let doc = editor.doc();
    let node = doc
        .get(NodeId::intern(id))
        .unwrap_or_else(|| panic!("node {id} missing"));
    (node.x, node.y)
}

pub fn ids(list: &[NodeId]) -> Vec<&str> {
    list.iter().map(|id| id.as_str()).collect()
}

/// Collect every event of `kind` the editor fires from now on.
pub fn record_events(editor: &Editor, kind: EventKind) -> Rc<RefCell<Vec<EditorEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.on(kind, move |e| sink.borrow_mut().push(e.clone()));
    seen
}
