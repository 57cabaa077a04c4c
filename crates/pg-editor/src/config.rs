//! Editor configuration.
//!
//! Every field has a default, so hosts only pass what they change:
//! `{"zoomMax": 4}` is a complete config.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Lower zoom bound.
    pub zoom_min: f32,
    /// Upper zoom bound.
    pub zoom_max: f32,
    /// Wheel zoom factor is `exp(-delta_y * wheel_zoom_speed)`.
    pub wheel_zoom_speed: f32,
    /// Only zoom on wheel while Ctrl is held (trackpad pinch sets Ctrl).
    /// When false, a plain wheel zooms as well.
    pub zoom_requires_modifier: bool,
    /// Maximum undo depth. `None` keeps everything.
    pub history_limit: Option<usize>,
    /// Channel scale applied to selected nodes when rendering.
    pub selection_highlight: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 8.0,
            wheel_zoom_speed: 0.002,
            zoom_requires_modifier: true,
            history_limit: None,
            selection_highlight: 1.15,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn partial_override() {
        let config =
            EditorConfig::from_json(r#"{"zoomMax": 4, "historyLimit": 50, "zoomRequiresModifier": false}"#)
                .unwrap();
        assert_eq!(config.zoom_max, 4.0);
        assert_eq!(config.history_limit, Some(50));
        assert!(!config.zoom_requires_modifier);
        assert_eq!(config.zoom_min, 0.1);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(EditorConfig::from_json(r#"{"zoomMax": "big"}"#).is_err());
    }
}
