//! WASM bridge for PageGL: binds an `HtmlCanvasElement` to the editor engine.
//!
//! Compiled via `wasm-pack build --target web`. Everything crossing the JS
//! boundary is a JSON string in the document wire format.

pub mod json;

#[cfg(target_arch = "wasm32")]
mod bridge;

#[cfg(target_arch = "wasm32")]
pub use bridge::{PageEditor, create_editor, validate};
