use crate::json;
use pg_core::{Document, parse_document, parse_node};
use pg_editor::{Editor, EventKind, GridSnap, InputEvent, ListenerId, Modifiers, Plugin};
use pg_render::{DisplaySize, RectRenderer, RenderError, RenderTarget};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, HtmlCanvasElement, KeyboardEvent, MouseEvent, PointerEvent,
    WheelEvent,
};

// ─── Setup ───────────────────────────────────────────────────────────────

fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&format!("pagegl panic: {info}").into());
        }));
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("pagegl: logger already set: {e}").into());
        }
    });
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Create an editor drawing into `canvas`.
///
/// `options` is a JSON object with any `EditorConfig` key plus `gridSize`.
#[wasm_bindgen(js_name = createEditor)]
pub async fn create_editor(
    canvas: HtmlCanvasElement,
    options: Option<String>,
) -> Result<PageEditor, JsValue> {
    init_logging();
    let options = json::parse_options(options.as_deref()).map_err(js_error)?;

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| js_error(RenderError::from(e)))?;
    let target = Box::new(CanvasTarget {
        canvas: canvas.clone(),
    });
    let renderer = RectRenderer::new(
        &instance,
        surface,
        target,
        options.editor.selection_highlight,
    )
    .await
    .map_err(js_error)?;

    let mut plugins: Vec<Rc<dyn Plugin>> = Vec::new();
    if let Some(size) = options.grid_size {
        plugins.push(Rc::new(GridSnap::new(size)));
    }
    let editor = Rc::new(Editor::new(renderer, plugins, options.editor));

    // Keyboard shortcuts need a focusable canvas.
    canvas.set_tab_index(0);
    let listeners = bind_input(&canvas, &editor)?;
    log::info!("editor attached to canvas");

    Ok(PageEditor {
        editor,
        canvas,
        listeners: RefCell::new(listeners),
        handlers: RefCell::new(Vec::new()),
    })
}

/// Parse and lint a document without creating an editor.
#[wasm_bindgen]
pub fn validate(source: &str) -> String {
    json::validate_json(source)
}

// ─── Canvas target ───────────────────────────────────────────────────────

struct CanvasTarget {
    canvas: HtmlCanvasElement,
}

impl RenderTarget for CanvasTarget {
    fn display_size(&self) -> DisplaySize {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        DisplaySize::new(
            self.canvas.client_width() as f32,
            self.canvas.client_height() as f32,
            dpr as f32,
        )
    }

    fn set_backing_size(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}

// ─── DOM input ───────────────────────────────────────────────────────────

struct Listener {
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

fn listen(
    canvas: &HtmlCanvasElement,
    kind: &'static str,
    options: Option<&AddEventListenerOptions>,
    f: impl FnMut(web_sys::Event) + 'static,
) -> Result<Listener, JsValue> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(f);
    let callback = closure.as_ref().unchecked_ref();
    match options {
        Some(opts) => canvas
            .add_event_listener_with_callback_and_add_event_listener_options(kind, callback, opts)?,
        None => canvas.add_event_listener_with_callback(kind, callback)?,
    }
    Ok(Listener { kind, closure })
}

/// Pointer position relative to the canvas's top-left corner, in CSS pixels.
fn local_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        (f64::from(event.client_x()) - rect.left()) as f32,
        (f64::from(event.client_y()) - rect.top()) as f32,
    )
}

fn pointer_handler(
    canvas: &HtmlCanvasElement,
    editor: &Rc<Editor>,
    make: fn(f32, f32) -> InputEvent,
) -> impl FnMut(web_sys::Event) + 'static {
    let canvas = canvas.clone();
    let editor: Weak<Editor> = Rc::downgrade(editor);
    move |event| {
        let (Some(editor), Some(e)) = (editor.upgrade(), event.dyn_ref::<PointerEvent>()) else {
            return;
        };
        let (x, y) = local_position(&canvas, e);
        match make(x, y) {
            down @ InputEvent::PointerDown { .. } => {
                if let Err(err) = canvas.set_pointer_capture(e.pointer_id()) {
                    log::debug!("pointer capture failed: {err:?}");
                }
                editor.handle_input(&down);
            }
            up @ InputEvent::PointerUp { .. } => {
                release_capture(&canvas, e.pointer_id());
                editor.handle_input(&up);
            }
            other => {
                editor.handle_input(&other);
            }
        }
    }
}

fn release_capture(canvas: &HtmlCanvasElement, pointer_id: i32) {
    if canvas.has_pointer_capture(pointer_id)
        && let Err(err) = canvas.release_pointer_capture(pointer_id)
    {
        log::debug!("pointer release failed: {err:?}");
    }
}

fn bind_input(canvas: &HtmlCanvasElement, editor: &Rc<Editor>) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = vec![
        listen(
            canvas,
            "pointerdown",
            None,
            pointer_handler(canvas, editor, |x, y| InputEvent::PointerDown { x, y }),
        )?,
        listen(
            canvas,
            "pointermove",
            None,
            pointer_handler(canvas, editor, |x, y| InputEvent::PointerMove { x, y }),
        )?,
        listen(
            canvas,
            "pointerup",
            None,
            pointer_handler(canvas, editor, |x, y| InputEvent::PointerUp { x, y }),
        )?,
    ];

    {
        let canvas_ref = canvas.clone();
        let editor = Rc::downgrade(editor);
        listeners.push(listen(canvas, "pointercancel", None, move |event| {
            let (Some(editor), Some(e)) = (editor.upgrade(), event.dyn_ref::<PointerEvent>())
            else {
                return;
            };
            release_capture(&canvas_ref, e.pointer_id());
            editor.handle_input(&InputEvent::PointerCancel);
        })?);
    }

    // Non-passive so a consumed wheel can stop page scrolling.
    let active = AddEventListenerOptions::new();
    active.set_passive(false);
    {
        let canvas_ref = canvas.clone();
        let editor = Rc::downgrade(editor);
        listeners.push(listen(canvas, "wheel", Some(&active), move |event| {
            let (Some(editor), Some(e)) = (editor.upgrade(), event.dyn_ref::<WheelEvent>()) else {
                return;
            };
            let (x, y) = local_position(&canvas_ref, e);
            let input = InputEvent::Wheel {
                x,
                y,
                delta_y: e.delta_y() as f32,
                modifiers: Modifiers {
                    shift: e.shift_key(),
                    ctrl: e.ctrl_key(),
                    alt: e.alt_key(),
                    meta: e.meta_key(),
                },
            };
            if editor.handle_input(&input) {
                e.prevent_default();
            }
        })?);
    }

    {
        let editor = Rc::downgrade(editor);
        listeners.push(listen(canvas, "keydown", Some(&active), move |event| {
            let (Some(editor), Some(e)) = (editor.upgrade(), event.dyn_ref::<KeyboardEvent>())
            else {
                return;
            };
            let input = InputEvent::Key {
                key: e.key(),
                modifiers: Modifiers {
                    shift: e.shift_key(),
                    ctrl: e.ctrl_key(),
                    alt: e.alt_key(),
                    meta: e.meta_key(),
                },
            };
            if editor.handle_input(&input) {
                e.prevent_default();
            }
        })?);
    }

    Ok(listeners)
}

// ─── PageEditor ──────────────────────────────────────────────────────────

/// JS handle for one editor instance. Documents, selections and viewports
/// cross the boundary as JSON strings.
#[wasm_bindgen]
pub struct PageEditor {
    editor: Rc<Editor>,
    canvas: HtmlCanvasElement,
    listeners: RefCell<Vec<Listener>>,
    /// JS handler handles index into this; `None` once removed.
    handlers: RefCell<Vec<Option<ListenerId>>>,
}

#[wasm_bindgen]
impl PageEditor {
    /// Subscribe to `"change"`, `"selection"` or `"viewport"`.
    /// The handler receives the JSON payload. Returns a handle for `off`.
    pub fn on(&self, event_type: &str, handler: js_sys::Function) -> Result<u32, JsValue> {
        let kind = EventKind::parse(event_type)
            .ok_or_else(|| js_error(format!("unknown event type `{event_type}`")))?;
        let id = self.editor.on(kind, move |event| {
            let payload = JsValue::from_str(&json::event_payload(event));
            if let Err(err) = handler.call1(&JsValue::NULL, &payload) {
                log::warn!("{} handler threw: {err:?}", kind.as_str());
            }
        });
        let mut handlers = self.handlers.borrow_mut();
        handlers.push(Some(id));
        Ok((handlers.len() - 1) as u32)
    }

    /// Remove a handler added with `on`. Returns false for unknown handles.
    pub fn off(&self, handle: u32) -> bool {
        let id = self
            .handlers
            .borrow_mut()
            .get_mut(handle as usize)
            .and_then(Option::take);
        id.is_some_and(|id| self.editor.off(id))
    }

    #[wasm_bindgen(js_name = getDoc)]
    pub fn get_doc(&self) -> String {
        self.editor.serialize()
    }

    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> String {
        json::selection_json(&self.editor.selection())
    }

    #[wasm_bindgen(js_name = getViewport)]
    pub fn get_viewport(&self) -> String {
        json::viewport_json(&self.editor.viewport())
    }

    /// Replace the document. Clears the selection; history is kept.
    pub fn load(&self, source: &str) -> Result<(), JsValue> {
        let doc: Document = parse_document(source).map_err(js_error)?;
        self.editor.load(doc);
        Ok(())
    }

    pub fn serialize(&self) -> String {
        self.editor.serialize()
    }

    pub fn undo(&self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&self) -> bool {
        self.editor.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&self) {
        self.editor.clear_history();
    }

    /// Append a node and select it. Returns false if the id is taken.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&self, source: &str) -> Result<bool, JsValue> {
        let node = parse_node(source).map_err(js_error)?;
        Ok(self.editor.add_node(node))
    }

    #[wasm_bindgen(js_name = deleteSelection)]
    pub fn delete_selection(&self) -> bool {
        self.editor.delete_selection()
    }

    /// `ids` is a JSON array of node id strings.
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&self, ids: &str) -> Result<(), JsValue> {
        let ids = json::parse_ids(ids).map_err(js_error)?;
        self.editor.set_selection(ids);
        Ok(())
    }

    /// `viewport` is `{"panX":..,"panY":..,"zoom":..}`.
    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&self, viewport: &str) -> Result<(), JsValue> {
        let viewport = json::parse_viewport(viewport).map_err(js_error)?;
        self.editor.set_viewport(viewport);
        Ok(())
    }

    /// Detach DOM listeners and release GPU resources. Idempotent.
    pub fn destroy(&self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for listener in &listeners {
            if let Err(err) = self.canvas.remove_event_listener_with_callback(
                listener.kind,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                log::warn!("failed to detach {}: {err:?}", listener.kind);
            }
        }
        for id in self.handlers.borrow_mut().drain(..).flatten() {
            self.editor.off(id);
        }
        self.editor.destroy();
    }
}
