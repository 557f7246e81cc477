use plan_forest::config::{DiagramConfig, RenderConfig};
use plan_forest::layout_dump::LayoutDump;
use plan_forest::render::{Renderers, TextDetailRenderer, render_svg};
use plan_forest::theme::Theme;
use plan_forest::{
    ForestDiagram, ForestError, Gesture, NodeId, SequentialIds, Transform, Viewport, parse_plans,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    #[serde(flatten)]
    diagram: DiagramConfig,
}

fn parse_options(options_json: Option<&str>) -> Result<ViewOptions, serde_json::Error> {
    match options_json {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw),
        _ => Ok(ViewOptions::default()),
    }
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Interactive plan forest driven from JavaScript: the host forwards
/// pointer input and redraws with [`PlanForestView::render_svg`].
#[wasm_bindgen]
pub struct PlanForestView {
    diagram: ForestDiagram,
    theme: Theme,
    render: RenderConfig,
}

impl PlanForestView {
    fn from_options(options: ViewOptions) -> Self {
        let mut theme = if options.theme.as_deref() == Some("dark") {
            Theme::dark()
        } else {
            Theme::light()
        };
        if let Some(font_family) = options.font_family {
            theme.font_family = font_family;
        }
        if let Some(font_size) = options.font_size {
            theme.font_size = font_size;
        }
        let render = RenderConfig {
            background: theme.background.clone(),
            fast_text_metrics: options.fast_text.unwrap_or(true),
        };
        let mut diagram =
            ForestDiagram::new(options.diagram).with_id_generator(SequentialIds::new("node-"));
        diagram.mount();
        Self {
            diagram,
            theme,
            render,
        }
    }

    fn load_plans(&mut self, plans_json: &str) -> Result<usize, ForestError> {
        let plans = parse_plans(plans_json)?;
        self.diagram.load(&plans);
        Ok(self.diagram.forest().len())
    }
}

#[wasm_bindgen]
impl PlanForestView {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<PlanForestView, JsValue> {
        let options = parse_options(options_json.as_deref()).map_err(js_error)?;
        Ok(Self::from_options(options))
    }

    /// Replaces the displayed plans; returns the node count.
    pub fn load(&mut self, plans_json: &str) -> Result<usize, JsValue> {
        self.load_plans(plans_json).map_err(js_error)
    }

    /// Expand/collapse button clicked. Returns whether anything changed.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.diagram
            .click_expand_button(&NodeId::from(id))
            .changed_tree()
            .is_some()
    }

    pub fn collapse_below_depth(&mut self, depth: usize) -> usize {
        self.diagram.collapse_below_depth(depth)
    }

    pub fn expand_all(&mut self) {
        self.diagram.expand_all();
    }

    /// Node body clicked; selects it for [`Self::detail`].
    pub fn select(&mut self, id: &str) -> bool {
        self.diagram.click_node_detail(&NodeId::from(id))
    }

    /// Id of the node under a viewport point, if any.
    pub fn node_at(&self, x: f32, y: f32) -> Option<String> {
        self.diagram
            .scene()
            .node_at(x, y)
            .map(|node| node.id.to_string())
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        self.diagram.apply_gesture(Gesture::Pan { dx, dy }).is_some()
    }

    pub fn zoom_at(&mut self, factor: f32, x: f32, y: f32) -> bool {
        self.diagram
            .apply_gesture(Gesture::ZoomAt { factor, x, y })
            .is_some()
    }

    pub fn set_transform(&mut self, x: f32, y: f32, k: f32) -> bool {
        self.diagram
            .apply_gesture(Gesture::Set(Transform::new(x, y, k)))
            .is_some()
    }

    /// Brush dragged so its top-left corner is at a point in minimap pixels.
    pub fn brush_to(&mut self, minimap_x: f32, minimap_y: f32) -> bool {
        self.diagram.drag_brush_to(minimap_x, minimap_y).is_some()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.diagram.resize(Viewport::new(width, height));
    }

    pub fn reset(&mut self) {
        self.diagram.reset_to_fit();
    }

    /// Current `[x, y, k]`.
    pub fn transform(&self) -> Vec<f32> {
        let t = self.diagram.transform();
        vec![t.x, t.y, t.k]
    }

    pub fn render_svg(&self) -> String {
        let renderers = Renderers::new(&self.render);
        render_svg(&self.diagram.scene(), &self.theme, &self.render, &renderers)
    }

    pub fn layout_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&LayoutDump::from_scene(&self.diagram.scene())).map_err(js_error)
    }

    pub fn detail(&self) -> Option<String> {
        self.diagram.render_detail(&TextDetailRenderer)
    }

    pub fn dispose(&mut self) {
        self.diagram.unmount();
    }
}

#[cfg(test)]
mod tests {
    use crate::{PlanForestView, parse_options};

    const PLANS: &str = r#"[
        {"name": "Projection_4", "cost": 10.5, "children": [
            {"name": "TableReader_7", "access_table": "t", "children": [
                {"name": "TableFullScan_6"}
            ]}
        ]},
        {"name": "Point_Get_1"}
    ]"#;

    fn view() -> PlanForestView {
        let options =
            parse_options(Some(r#"{"viewport": {"width": 800, "height": 600}}"#)).unwrap();
        let mut view = PlanForestView::from_options(options);
        assert_eq!(view.load_plans(PLANS).unwrap(), 4);
        view
    }

    #[test]
    fn loads_and_renders() {
        let view = view();
        let svg = view.render_svg();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("Projection_4"));
        assert!(svg.contains("Point_Get_1"));
    }

    #[test]
    fn toggle_and_detail_use_node_ids() {
        let mut view = view();
        assert!(view.toggle("node-0"));
        assert!(!view.render_svg().contains("TableFullScan_6"));
        assert!(!view.toggle("missing"));
        assert!(view.select("node-3"));
        assert!(view.detail().unwrap().starts_with("Point_Get_1"));
    }

    #[test]
    fn gestures_update_transform() {
        let mut view = view();
        let before = view.transform();
        assert!(view.pan(10.0, 0.0));
        assert_eq!(view.transform()[0], before[0] + 10.0);
        for _ in 0..50 {
            view.zoom_at(0.5, 0.0, 0.0);
        }
        assert_eq!(view.transform()[2], 0.2);
        assert!(view.set_transform(0.0, 0.0, 1.0));
        view.reset();
        assert_eq!(view.transform(), before);
    }

    #[test]
    fn rejects_bad_plans() {
        let mut view = view();
        assert!(view.load_plans("").is_err());
        assert!(view.load_plans("{\"cost\": 1}").is_err());
    }
}
