pub mod gpu;
pub mod hit;
pub mod instances;
pub mod surface;

pub use gpu::{RectRenderer, RenderError};
pub use hit::{hit_test, paint_order};
pub use instances::{RectInstance, grown_capacity, pack_instances};
pub use surface::{DisplaySize, SurfaceSizer};

use pg_core::{Document, NodeId, Viewport};

/// Host element the renderer draws into (a canvas in the browser).
pub trait RenderTarget {
    /// Current displayed size in CSS pixels plus the device pixel ratio.
    fn display_size(&self) -> DisplaySize;

    /// Resize the backing store to `width` × `height` device pixels.
    fn set_backing_size(&self, width: u32, height: u32);
}

/// Anything that can draw a document snapshot.
///
/// The editor only talks to this trait, so tests can swap in a recorder
/// and hosts without a GPU can skip drawing entirely.
pub trait SceneRenderer {
    fn render(&mut self, doc: &Document, viewport: &Viewport, selection: &[NodeId]);

    /// Release GPU resources. Further `render` calls are no-ops.
    fn destroy(&mut self);
}
