pub mod emitter;
pub mod id;
pub mod lint;
pub mod math;
pub mod model;
pub mod parser;

pub use emitter::{emit_document, emit_document_pretty};
pub use id::NodeId;
pub use lint::{LintDiagnostic, LintSeverity, lint_document};
pub use math::{Point, Viewport, clamp, screen_to_world, world_to_screen};
pub use model::*;
pub use parser::{DocumentError, parse_document, parse_node};
