use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub node_text: String,
    pub muted_text: String,
    pub link_color: String,
    pub toggle_fill: String,
    pub toggle_text: String,
    pub minimap_background: String,
    pub minimap_node: String,
    pub brush_fill: String,
    pub brush_border: String,
    pub background: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            node_fill: "#FFFFFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            node_text: "#1C2430".to_string(),
            muted_text: "#6B7A90".to_string(),
            link_color: "#7A8AA6".to_string(),
            toggle_fill: "#EEF2F8".to_string(),
            toggle_text: "#1C2430".to_string(),
            minimap_background: "#F7FAFF".to_string(),
            minimap_node: "#C7D2E5".to_string(),
            brush_fill: "rgba(24, 144, 255, 0.12)".to_string(),
            brush_border: "#1890FF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            node_fill: "#1F2937".to_string(),
            node_border: "#4B5563".to_string(),
            node_text: "#F3F4F6".to_string(),
            muted_text: "#9CA3AF".to_string(),
            link_color: "#6B7280".to_string(),
            toggle_fill: "#374151".to_string(),
            toggle_text: "#F3F4F6".to_string(),
            minimap_background: "#111827".to_string(),
            minimap_node: "#4B5563".to_string(),
            brush_fill: "rgba(96, 165, 250, 0.18)".to_string(),
            brush_border: "#60A5FA".to_string(),
            background: "#0B1220".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
