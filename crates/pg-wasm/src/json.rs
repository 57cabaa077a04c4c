//! JSON encoding for values crossing the JS boundary.

use pg_core::{NodeId, Viewport, lint_document, parse_document};
use pg_editor::{EditorConfig, EditorEvent};
use serde::Deserialize;

/// Options accepted by `create_editor`: every `EditorConfig` key plus
/// `gridSize`, which turns on grid snapping.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostOptions {
    #[serde(flatten)]
    pub editor: EditorConfig,
    pub grid_size: Option<f32>,
}

pub fn parse_options(json: Option<&str>) -> Result<HostOptions, serde_json::Error> {
    match json {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(json),
        _ => Ok(HostOptions::default()),
    }
}

/// Payload handed to JS event handlers.
pub fn event_payload(event: &EditorEvent) -> String {
    match event {
        EditorEvent::Change(doc) => pg_core::emit_document(doc),
        EditorEvent::Selection(ids) => selection_json(ids),
        EditorEvent::Viewport(vp) => viewport_json(vp),
    }
}

pub fn selection_json(ids: &[NodeId]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

pub fn parse_ids(json: &str) -> Result<Vec<NodeId>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn viewport_json(vp: &Viewport) -> String {
    serde_json::to_string(vp).unwrap_or_else(|_| "{}".to_string())
}

pub fn parse_viewport(json: &str) -> Result<Viewport, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parse and lint a document. Returns JSON:
/// `{"ok":true,"diagnostics":[...]}` or `{"ok":false,"error":"..."}`.
pub fn validate_json(source: &str) -> String {
    let doc = match parse_document(source) {
        Ok(doc) => doc,
        Err(e) => return serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    };
    let diagnostics: Vec<serde_json::Value> = lint_document(&doc)
        .into_iter()
        .map(|d| {
            serde_json::json!({
                "nodeId": d.node_id,
                "rule": d.rule,
                "severity": match d.severity {
                    pg_core::LintSeverity::Warning => "warning",
                    pg_core::LintSeverity::Info => "info",
                },
                "message": d.message,
            })
        })
        .collect();
    serde_json::json!({ "ok": true, "diagnostics": diagnostics }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_editor::Selection;
    use pretty_assertions::assert_eq;

    fn selection(ids: &[&str]) -> Selection {
        ids.iter().map(|id| NodeId::intern(id)).collect()
    }

    #[test]
    fn options_default_when_missing() {
        assert_eq!(parse_options(None).unwrap(), HostOptions::default());
        assert_eq!(parse_options(Some("  ")).unwrap(), HostOptions::default());
    }

    #[test]
    fn options_mix_editor_keys_and_grid() {
        let opts = parse_options(Some(r#"{"gridSize": 8, "zoomMax": 4}"#)).unwrap();
        assert_eq!(opts.grid_size, Some(8.0));
        assert_eq!(opts.editor.zoom_max, 4.0);
        assert_eq!(opts.editor.zoom_min, 0.1);
    }

    #[test]
    fn event_payloads() {
        let sel = EditorEvent::Selection(selection(&["a", "b"]));
        assert_eq!(event_payload(&sel), r#"["a","b"]"#);

        let vp = EditorEvent::Viewport(Viewport::new(1.5, 0.0, 2.0));
        assert_eq!(event_payload(&vp), r#"{"panX":1.5,"panY":0.0,"zoom":2.0}"#);
    }

    #[test]
    fn ids_and_viewport_parse() {
        assert_eq!(
            parse_ids(r#"["x","y"]"#).unwrap(),
            vec![NodeId::intern("x"), NodeId::intern("y")]
        );
        assert!(parse_ids(r#"[1]"#).is_err());
        assert_eq!(
            parse_viewport(r#"{"panX":3,"panY":4,"zoom":0.5}"#).unwrap(),
            Viewport::new(3.0, 4.0, 0.5)
        );
    }

    #[test]
    fn validate_reports_lint_and_errors() {
        let ok = validate_json(
            r#"{"page":{"width":10,"height":10,"background":[0,0,0,1]},
                "nodes":[{"id":"r","type":"rect","fill":[2,0,0,1],"x":0,"y":0,"w":1,"h":1}]}"#,
        );
        let v: serde_json::Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(v["ok"], true);
        assert_eq!(v["diagnostics"][0]["rule"], "color-range");
        assert_eq!(v["diagnostics"][0]["nodeId"], "r");

        let bad: serde_json::Value = serde_json::from_str(&validate_json("{")).unwrap();
        assert_eq!(bad["ok"], false);
    }
}
