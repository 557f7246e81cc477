use crate::config::RenderConfig;
use crate::diagram::Scene;
use crate::layout::{LinkLayout, NodeLayout};
use crate::model::TreeNode;
use crate::text_metrics::fit_label;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const NODE_PADDING: f32 = 12.0;
const LINE_HEIGHT: f32 = 18.0;
const TOGGLE_RADIUS: f32 = 9.0;
const MINIMAP_MARGIN: f32 = 16.0;

/// A node as handed to a [`NodeRenderer`]: model data plus its box in tree
/// layout space.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub node: &'a TreeNode,
    pub layout: &'a NodeLayout,
}

/// Turns a positioned node into SVG markup.
pub trait NodeRenderer {
    fn render_node(&self, view: &NodeView<'_>, theme: &Theme) -> String;
}

/// Turns a parent/child anchor pair into SVG markup.
pub trait LinkRenderer {
    fn render_link(&self, link: &LinkLayout, theme: &Theme) -> String;
}

/// Renders the detail panel content for the selected node.
pub trait NodeDetailRenderer {
    fn render_detail(&self, node: &TreeNode) -> String;
}

impl<F> NodeRenderer for F
where
    F: Fn(&NodeView<'_>, &Theme) -> String,
{
    fn render_node(&self, view: &NodeView<'_>, theme: &Theme) -> String {
        self(view, theme)
    }
}

impl<F> LinkRenderer for F
where
    F: Fn(&LinkLayout, &Theme) -> String,
{
    fn render_link(&self, link: &LinkLayout, theme: &Theme) -> String {
        self(link, theme)
    }
}

impl<F> NodeDetailRenderer for F
where
    F: Fn(&TreeNode) -> String,
{
    fn render_detail(&self, node: &TreeNode) -> String {
        self(node)
    }
}

/// Operator box with the name on top, metric lines below and a +/- button
/// centered on the bottom edge of collapsible nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxNodeRenderer {
    pub fast_text_metrics: bool,
}

impl NodeRenderer for BoxNodeRenderer {
    fn render_node(&self, view: &NodeView<'_>, theme: &Theme) -> String {
        let node = view.node;
        let layout = view.layout;
        let info = &node.info;
        let max_text = (layout.width - NODE_PADDING * 2.0).max(0.0);
        let text_x = layout.x + NODE_PADDING;
        let fit = |text: &str, size: f32| {
            fit_label(text, max_text, size, &theme.font_family, self.fast_text_metrics)
        };

        let mut svg = String::new();
        svg.push_str(&format!(
            "<g class=\"node\" data-id=\"{}\">",
            escape_xml(node.id.as_str())
        ));
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
            layout.x, layout.y, layout.width, layout.height, theme.node_fill, theme.node_border
        ));

        let title_size = theme.font_size + 2.0;
        let title_y = layout.y + NODE_PADDING + title_size;
        svg.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{title_y:.2}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
            theme.font_family,
            title_size,
            theme.node_text,
            escape_xml(&fit(&info.name, title_size))
        ));

        let limit = layout.bottom() - NODE_PADDING;
        for (i, line) in metric_lines(node).iter().enumerate() {
            let y = title_y + LINE_HEIGHT * (i as f32 + 1.0);
            if y > limit {
                break;
            }
            svg.push_str(&format!(
                "<text x=\"{text_x:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                theme.font_family,
                theme.font_size,
                theme.muted_text,
                escape_xml(&fit(line, theme.font_size))
            ));
        }

        if layout.collapsible {
            let cx = layout.center_x();
            let cy = layout.bottom();
            let glyph = if layout.collapsed { "+" } else { "-" };
            svg.push_str(&format!(
                "<g class=\"toggle\" data-id=\"{}\"><circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{TOGGLE_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/><text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{glyph}</text></g>",
                escape_xml(node.id.as_str()),
                theme.toggle_fill,
                theme.node_border,
                cy + theme.font_size * 0.35,
                theme.font_family,
                theme.font_size,
                theme.toggle_text
            ));
        }

        svg.push_str("</g>");
        svg
    }
}

fn metric_lines(node: &TreeNode) -> Vec<String> {
    let info = &node.info;
    let mut lines = vec![
        format!("cost: {}", format_number(info.cost)),
        format!(
            "rows: {} est / {} act",
            format_number(info.est_rows),
            format_number(info.act_rows)
        ),
        format!("time: {}", format_duration(info.time_us)),
    ];
    if !info.run_at.is_empty() {
        lines.push(format!("run at: {}", info.run_at));
    }
    if let Some(access) = info.access_object() {
        lines.push(access);
    }
    lines
}

/// Vertical cubic curve from the parent's bottom edge to the child's top.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveLinkRenderer;

impl LinkRenderer for CurveLinkRenderer {
    fn render_link(&self, link: &LinkLayout, theme: &Theme) -> String {
        let (x0, y0) = link.from;
        let (x1, y1) = link.to;
        let mid = (y0 + y1) / 2.0;
        format!(
            "<path class=\"link\" d=\"M {x0:.2} {y0:.2} C {x0:.2} {mid:.2}, {x1:.2} {mid:.2}, {x1:.2} {y1:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"/>",
            theme.link_color
        )
    }
}

/// Plain-text summary, one field per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDetailRenderer;

impl NodeDetailRenderer for TextDetailRenderer {
    fn render_detail(&self, node: &TreeNode) -> String {
        let info = &node.info;
        let mut out = format!("{}\n", info.name);
        out.push_str(&format!("cost: {}\n", info.cost));
        out.push_str(&format!("estimated rows: {}\n", info.est_rows));
        out.push_str(&format!("actual rows: {}\n", info.act_rows));
        out.push_str(&format!("execution time: {}\n", format_duration(info.time_us)));
        if !info.run_at.is_empty() {
            out.push_str(&format!("run at: {}\n", info.run_at));
        }
        if let Some(access) = info.access_object() {
            out.push_str(&format!("access object: {access}\n"));
        }
        out.push_str(&format!("children: {}", node.children.len()));
        out
    }
}

/// Compact number: `950`, `12.35`, `25.0K`, `2.3M`, `4.0B`.
pub fn format_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e4 {
        format!("{:.1}K", value / 1e3)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Duration given in microseconds, in the largest unit that keeps the value
/// at or above one.
pub fn format_duration(micros: f64) -> String {
    if !(micros > 0.0) {
        return "0µs".to_string();
    }
    if micros < 1e3 {
        format!("{}µs", format_number(micros))
    } else if micros < 1e6 {
        format!("{:.2}ms", micros / 1e3)
    } else if micros < 60e6 {
        format!("{:.2}s", micros / 1e6)
    } else {
        format!("{:.1}min", micros / 60e6)
    }
}

/// The renderers used to draw a scene.
pub struct Renderers {
    pub node: Box<dyn NodeRenderer>,
    pub link: Box<dyn LinkRenderer>,
}

impl Renderers {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            node: Box::new(BoxNodeRenderer {
                fast_text_metrics: config.fast_text_metrics,
            }),
            link: Box::new(CurveLinkRenderer),
        }
    }

    pub fn with_node(mut self, renderer: impl NodeRenderer + 'static) -> Self {
        self.node = Box::new(renderer);
        self
    }

    pub fn with_link(mut self, renderer: impl LinkRenderer + 'static) -> Self {
        self.link = Box::new(renderer);
        self
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

/// Draws one frame: the forest under the current transform, sized to the
/// viewport, with the minimap in the bottom-right corner when enabled.
pub fn render_svg(
    scene: &Scene<'_>,
    theme: &Theme,
    config: &RenderConfig,
    renderers: &Renderers,
) -> String {
    let width = scene.viewport.width;
    let height = scene.viewport.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));

    svg.push_str(&format!(
        "<g class=\"forest\" transform=\"{}\">",
        scene.transform.to_svg()
    ));
    for tree in &scene.trees {
        svg.push_str(&format!(
            "<g class=\"tree\" data-tree=\"{}\" transform=\"translate({:.2},{:.2})\">",
            tree.placement.index, tree.placement.offset_x, tree.placement.offset_y
        ));
        for link in &tree.layout.links {
            svg.push_str(&renderers.link.render_link(link, theme));
        }
        for layout in &tree.layout.nodes {
            let view = NodeView {
                node: scene.forest.node(layout.index),
                layout,
            };
            svg.push_str(&renderers.node.render_node(&view, theme));
        }
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    if let Some(minimap) = scene.minimap {
        let left = (width - minimap.width - MINIMAP_MARGIN).max(0.0);
        let top = (height - minimap.height - MINIMAP_MARGIN).max(0.0);
        svg.push_str(&format!(
            "<g class=\"minimap\" transform=\"translate({left:.2},{top:.2})\">"
        ));
        svg.push_str(&format!(
            "<rect width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            minimap.width, minimap.height, theme.minimap_background, theme.node_border
        ));
        svg.push_str(&format!(
            "<g transform=\"scale({})\">",
            minimap.scale
        ));
        for tree in &scene.trees {
            for node in &tree.layout.nodes {
                svg.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                    node.x + tree.placement.offset_x,
                    node.y + tree.placement.offset_y,
                    node.width,
                    node.height,
                    theme.minimap_node
                ));
            }
        }
        svg.push_str("</g>");
        let brush = minimap.brush;
        svg.push_str(&format!(
            "<rect class=\"brush\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            brush.x, brush.y, brush.width, brush.height, theme.brush_fill, theme.brush_border
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next().map(str::trim) {
        opt.font_family = family.to_string();
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
