//! Canonical encoding of a `Document`.
//!
//! The encoded form is compact JSON:
//! `{"page":{"width","height","background":[r,g,b,a]},"nodes":[...]}`.
//! Field order follows the model's declaration order, so equal documents
//! always encode to identical strings.

use crate::model::Document;

/// Encode a document as its canonical JSON string.
#[must_use]
pub fn emit_document(doc: &Document) -> String {
    // Every field is a string, number, bool, or array of those; the
    // serializer has no failure path for this model.
    serde_json::to_string(doc).unwrap_or_else(|e| {
        log::error!("document encoding failed: {e}");
        String::from("{}")
    })
}

/// Same as `emit_document`, indented for humans.
#[must_use]
pub fn emit_document_pretty(doc: &Document) -> String {
    serde_json::to_string_pretty(doc).unwrap_or_else(|e| {
        log::error!("document encoding failed: {e}");
        String::from("{}")
    })
}
