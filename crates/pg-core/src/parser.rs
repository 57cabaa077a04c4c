//! Decoding of the canonical document encoding.
//!
//! Accepts exactly what `emit_document` produces, plus the usual JSON
//! leniency (integers for floats, omitted optional fields). The only
//! invariant enforced on top of the schema is id uniqueness. Payload
//! ranges are left to `lint_document`.

use crate::id::NodeId;
use crate::model::Document;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id `{0}`")]
    DuplicateId(NodeId),
}

/// Parse a document from its JSON encoding.
///
/// # Errors
/// `DocumentError::Json` for malformed input or schema mismatches,
/// `DocumentError::DuplicateId` if two nodes share an id.
pub fn parse_document(input: &str) -> Result<Document, DocumentError> {
    let doc: Document = serde_json::from_str(input)?;
    check_unique_ids(&doc)?;
    Ok(doc)
}

/// Parse a single node object (as a host would pass to `addNode`).
///
/// # Errors
/// `DocumentError::Json` when the object does not match the node schema.
pub fn parse_node(input: &str) -> Result<crate::model::Node, DocumentError> {
    Ok(serde_json::from_str(input)?)
}

fn check_unique_ids(doc: &Document) -> Result<(), DocumentError> {
    let mut seen = HashSet::with_capacity(doc.len());
    for node in doc.nodes() {
        if !seen.insert(node.id) {
            return Err(DocumentError::DuplicateId(node.id));
        }
    }
    Ok(())
}
