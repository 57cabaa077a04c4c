//! Lint diagnostics for scene documents.
//!
//! The editor never validates payload ranges; bad values just render
//! wrong. Hosts that produce documents can run these rules to catch the
//! mistakes before loading. Reports issues without modifying the document.

use crate::id::NodeId;
use crate::model::{Color, Document, Node, NodeKind};
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed: breaks an invariant or renders incorrectly.
    Warning,
    /// Informational: legal but probably unintended.
    Info,
}

/// A single lint diagnostic for a node.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The node this diagnostic refers to.
    pub node_id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "duplicate-id", "color-range").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the document and return diagnostics.
#[must_use]
pub fn lint_document(doc: &Document) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(doc, &mut diags);
    for node in doc.nodes() {
        lint_size(node, &mut diags);
        lint_payload(node, &mut diags);
    }
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for node in doc.nodes() {
        if !seen.insert(node.id) {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("Node id `{}` is used more than once.", node.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    }
}

fn lint_size(node: &Node, diags: &mut Vec<LintDiagnostic>) {
    if node.w < 0.0 || node.h < 0.0 {
        diags.push(LintDiagnostic {
            node_id: node.id,
            message: format!(
                "Node `{}` has a negative size ({} × {}).",
                node.id, node.w, node.h
            ),
            severity: LintSeverity::Warning,
            rule: "negative-size",
        });
    } else if node.w == 0.0 || node.h == 0.0 {
        diags.push(LintDiagnostic {
            node_id: node.id,
            message: format!("Node `{}` has zero area and cannot be clicked.", node.id),
            severity: LintSeverity::Info,
            rule: "zero-size",
        });
    }
}

fn lint_payload(node: &Node, diags: &mut Vec<LintDiagnostic>) {
    match &node.kind {
        NodeKind::Rect { fill } => lint_color(node.id, "fill", *fill, diags),
        NodeKind::Image { src, opacity } => {
            if src.is_empty() {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!("Image `{}` has an empty source.", node.id),
                    severity: LintSeverity::Warning,
                    rule: "image-src",
                });
            }
            if let Some(o) = opacity
                && !(0.0..=1.0).contains(o)
            {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!("Image `{}` opacity {o} is outside [0, 1].", node.id),
                    severity: LintSeverity::Warning,
                    rule: "opacity-range",
                });
            }
        }
        NodeKind::Text {
            color, font_size, ..
        } => {
            lint_color(node.id, "color", *color, diags);
            if *font_size <= 0.0 {
                diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!("Text `{}` has non-positive font size {font_size}.", node.id),
                    severity: LintSeverity::Warning,
                    rule: "font-size",
                });
            }
        }
    }
}

fn lint_color(id: NodeId, field: &str, color: Color, diags: &mut Vec<LintDiagnostic>) {
    let in_range = color
        .to_array()
        .iter()
        .all(|c| (0.0..=1.0).contains(c));
    if !in_range {
        diags.push(LintDiagnostic {
            node_id: id,
            message: format!(
                "`{id}` {field} {:?} has channels outside [0, 1].",
                color.to_array()
            ),
            severity: LintSeverity::Warning,
            rule: "color-range",
        });
    }
}
