use crate::layout::{Layout, LayoutDecision};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub orientation: String,
    pub width: f32,
    pub height: f32,
    pub decision: LayoutDecision,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: Option<usize>,
    pub label_width: f32,
    pub label_height: f32,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub route: String,
    pub branch_edge: bool,
    pub color: String,
    pub label_lines: Vec<String>,
    pub label_anchor: Option<[f32; 2]>,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: node.kind.as_str().to_string(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                depth: node.depth,
                label_width: node.label.width,
                label_height: node.label.height,
                label_lines: node.label.lines.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                route: format!("{:?}", edge.route).to_lowercase(),
                branch_edge: edge.branch_edge,
                color: edge.color.clone(),
                label_lines: edge
                    .label
                    .as_ref()
                    .map(|label| label.lines.clone())
                    .unwrap_or_default(),
                label_anchor: edge.label_anchor.map(|(x, y)| [x, y]),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            orientation: layout.orientation.suffix().to_string(),
            width: layout.width,
            height: layout.height,
            decision: layout.decision.clone(),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
