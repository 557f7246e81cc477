use crate::layout::NodeMargin;
use crate::model::Size;
use crate::theme::Theme;
use crate::view::{ScaleExtent, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Caller-facing diagram options. Every field is optional in serialized
/// form (camelCase keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagramConfig {
    pub node_size: Size,
    pub node_margin: NodeMargin,
    pub gap_between_trees: f32,
    pub viewport: Viewport,
    pub scale_extent: ScaleExtent,
    pub show_minimap: bool,
    pub minimap_scale: f32,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            node_size: Size::new(250.0, 150.0),
            node_margin: NodeMargin::default(),
            gap_between_trees: 100.0,
            viewport: Viewport::default(),
            scale_extent: ScaleExtent::default(),
            show_minimap: true,
            minimap_scale: 0.15,
        }
    }
}

impl DiagramConfig {
    /// Replaces unusable values with defaults so layout math never sees a
    /// zero-sized node, a negative gap or an empty scale range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(positive(self.node_size.width) && positive(self.node_size.height)) {
            self.node_size = defaults.node_size;
        }
        if !non_negative(self.node_margin.sibling_margin) {
            self.node_margin.sibling_margin = defaults.node_margin.sibling_margin;
        }
        if !non_negative(self.node_margin.children_margin) {
            self.node_margin.children_margin = defaults.node_margin.children_margin;
        }
        if !non_negative(self.gap_between_trees) {
            self.gap_between_trees = defaults.gap_between_trees;
        }
        if !(positive(self.viewport.width) && positive(self.viewport.height)) {
            self.viewport = defaults.viewport;
        }
        self.scale_extent = ScaleExtent::new(self.scale_extent.min, self.scale_extent.max);
        if !(positive(self.scale_extent.min) && positive(self.scale_extent.max)) {
            self.scale_extent = defaults.scale_extent;
        }
        if !positive(self.minimap_scale) {
            self.minimap_scale = defaults.minimap_scale;
        }
        self
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    /// Skip font lookup and use the built-in width table.
    pub fast_text_metrics: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub diagram: DiagramConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::light();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            diagram: DiagramConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    node_text: Option<String>,
    muted_text: Option<String>,
    link_color: Option<String>,
    toggle_fill: Option<String>,
    toggle_text: Option<String>,
    minimap_background: Option<String>,
    minimap_node: Option<String>,
    brush_fill: Option<String>,
    brush_border: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SizeFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MarginFile {
    sibling_margin: Option<f32>,
    children_margin: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ExtentFile {
    min: Option<f32>,
    max: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DiagramConfigFile {
    node_size: Option<SizeFile>,
    node_margin: Option<MarginFile>,
    gap_between_trees: Option<f32>,
    viewport: Option<SizeFile>,
    scale_extent: Option<ExtentFile>,
    show_minimap: Option<bool>,
    minimap_scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    diagram: Option<DiagramConfigFile>,
    fast_text_metrics: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "light" | "default" => config.theme = Theme::light(),
            other => tracing::warn!(theme = other, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.node_text {
            config.theme.node_text = v;
        }
        if let Some(v) = vars.muted_text {
            config.theme.muted_text = v;
        }
        if let Some(v) = vars.link_color {
            config.theme.link_color = v;
        }
        if let Some(v) = vars.toggle_fill {
            config.theme.toggle_fill = v;
        }
        if let Some(v) = vars.toggle_text {
            config.theme.toggle_text = v;
        }
        if let Some(v) = vars.minimap_background {
            config.theme.minimap_background = v;
        }
        if let Some(v) = vars.minimap_node {
            config.theme.minimap_node = v;
        }
        if let Some(v) = vars.brush_fill {
            config.theme.brush_fill = v;
        }
        if let Some(v) = vars.brush_border {
            config.theme.brush_border = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(diagram) = parsed.diagram {
        let target = &mut config.diagram;
        if let Some(size) = diagram.node_size {
            if let Some(v) = size.width {
                target.node_size.width = v;
            }
            if let Some(v) = size.height {
                target.node_size.height = v;
            }
        }
        if let Some(margin) = diagram.node_margin {
            if let Some(v) = margin.sibling_margin {
                target.node_margin.sibling_margin = v;
            }
            if let Some(v) = margin.children_margin {
                target.node_margin.children_margin = v;
            }
        }
        if let Some(v) = diagram.gap_between_trees {
            target.gap_between_trees = v;
        }
        if let Some(viewport) = diagram.viewport {
            if let Some(v) = viewport.width {
                target.viewport.width = v;
            }
            if let Some(v) = viewport.height {
                target.viewport.height = v;
            }
        }
        if let Some(extent) = diagram.scale_extent {
            if let Some(v) = extent.min {
                target.scale_extent.min = v;
            }
            if let Some(v) = extent.max {
                target.scale_extent.max = v;
            }
        }
        if let Some(v) = diagram.show_minimap {
            target.show_minimap = v;
        }
        if let Some(v) = diagram.minimap_scale {
            target.minimap_scale = v;
        }
    }
    config.diagram = config.diagram.sanitized();

    if let Some(v) = parsed.fast_text_metrics {
        config.render.fast_text_metrics = v;
    }
    config.render.background = config.theme.background.clone();

    Ok(config)
}
