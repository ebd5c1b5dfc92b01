use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::{NodeKind, Orientation};

use super::strategy::LayoutDecision;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Node center in canvas coordinates (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_point(self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

/// A node with its measured box, ready for placement.
#[derive(Debug, Clone)]
pub struct SizedNode {
    pub id: String,
    pub kind: NodeKind,
    pub width: f32,
    pub height: f32,
    pub label: TextBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    /// Center of the node box.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: TextBlock,
    /// BFS level, only set by the free layout.
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Direct,
    Stepped,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub route: RouteKind,
    pub points: Vec<(f32, f32)>,
    pub branch_edge: bool,
    pub label: Option<TextBlock>,
    pub label_anchor: Option<(f32, f32)>,
    /// Connector color, keyword-resolved when the edge carries a label.
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub orientation: Orientation,
    pub width: f32,
    pub height: f32,
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub decision: LayoutDecision,
}

impl Layout {
    pub fn position(&self, id: &str) -> Option<Position> {
        self.nodes.get(id).map(|node| Position::new(node.x, node.y))
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}
