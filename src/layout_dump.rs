use crate::diagram::Scene;
use crate::layout::ForestBound;
use crate::minimap::MinimapView;
use crate::view::{Transform, Viewport};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Positions of everything in a scene, in forest space.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub transform: Transform,
    pub viewport: Viewport,
    pub trees: Vec<TreeDump>,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    pub minimap: Option<MinimapView>,
}

#[derive(Debug, Serialize)]
pub struct TreeDump {
    pub index: usize,
    pub root: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub tree: usize,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub collapsible: bool,
    pub collapsed: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub points: [[f32; 2]; 2],
}

impl LayoutDump {
    pub fn from_scene(scene: &Scene<'_>) -> Self {
        let mut trees = Vec::with_capacity(scene.trees.len());
        let mut nodes = Vec::with_capacity(scene.node_count());
        let mut links = Vec::new();

        for tree in &scene.trees {
            let placement = tree.placement;
            let (dx, dy) = (placement.offset_x, placement.offset_y);
            trees.push(TreeDump {
                index: placement.index,
                root: tree.layout.root.as_ref().map(|id| id.to_string()),
                x: placement.left(),
                y: placement.bound.y + dy,
                width: placement.bound.width,
                height: placement.bound.height,
            });
            nodes.extend(tree.layout.nodes.iter().map(|node| NodeDump {
                id: node.id.to_string(),
                name: scene.forest.node(node.index).info.name.clone(),
                tree: placement.index,
                depth: node.depth,
                x: node.x + dx,
                y: node.y + dy,
                width: node.width,
                height: node.height,
                collapsible: node.collapsible,
                collapsed: node.collapsed,
            }));
            links.extend(tree.layout.links.iter().map(|link| LinkDump {
                source: link.source.to_string(),
                target: link.target.to_string(),
                points: [
                    [link.from.0 + dx, link.from.1 + dy],
                    [link.to.0 + dx, link.to.1 + dy],
                ],
            }));
        }

        let ForestBound { width, height } = scene.bound;
        LayoutDump {
            width,
            height,
            transform: scene.transform,
            viewport: scene.viewport,
            trees,
            nodes,
            links,
            minimap: scene.minimap,
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when `None`.
pub fn write_layout_dump(path: Option<&Path>, scene: &Scene<'_>) -> anyhow::Result<()> {
    let dump = LayoutDump::from_scene(scene);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}
