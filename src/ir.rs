use serde::{Deserialize, Serialize};

/// Primary flow axis shared by the planners and the connector router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    LeftRight,
    TopBottom,
}

impl Orientation {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "lr" | "left-right" | "horizontal" => Some(Self::LeftRight),
            "td" | "tb" | "top-bottom" | "vertical" => Some(Self::TopBottom),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight)
    }

    /// Short suffix used in generated file names.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::LeftRight => "lr",
            Self::TopBottom => "tb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Process,
    Decision,
    End,
    Default,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Process => "process",
            Self::Decision => "decision",
            Self::End => "end",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    pub fn labeled(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            from: from.into(),
            to: to.into(),
            label: if label.trim().is_empty() { None } else { Some(label) },
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Nodes in parse order plus edges. Parse order drives grid fill order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Inserts a node or refreshes the label/kind of an existing one.
    pub fn ensure_node(&mut self, id: &str, label: Option<String>, kind: Option<NodeKind>) {
        let idx = match self.nodes.iter().position(|node| node.id == id) {
            Some(idx) => idx,
            None => {
                self.nodes.push(Node {
                    id: id.to_string(),
                    label: id.to_string(),
                    kind: NodeKind::Default,
                });
                self.nodes.len() - 1
            }
        };
        let entry = &mut self.nodes[idx];
        if let Some(label) = label {
            entry.label = label;
        }
        if let Some(kind) = kind {
            entry.kind = kind;
        }
    }

    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_tokens() {
        assert_eq!(Orientation::from_token("LR"), Some(Orientation::LeftRight));
        assert_eq!(Orientation::from_token("left-right"), Some(Orientation::LeftRight));
        assert_eq!(Orientation::from_token("TD"), Some(Orientation::TopBottom));
        assert_eq!(Orientation::from_token("top-bottom"), Some(Orientation::TopBottom));
        assert_eq!(Orientation::from_token("diagonal"), None);
    }

    #[test]
    fn ensure_node_keeps_first_position() {
        let mut graph = Graph::new();
        graph.ensure_node("A", None, None);
        graph.ensure_node("B", Some("Beta".to_string()), None);
        graph.ensure_node("A", Some("Alpha".to_string()), Some(NodeKind::Start));
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].id, "A");
        assert_eq!(graph.nodes[0].label, "Alpha");
        assert_eq!(graph.nodes[0].kind, NodeKind::Start);
    }

    #[test]
    fn blank_edge_label_is_dropped() {
        let edge = Edge::labeled("A", "B", "  ");
        assert!(edge.label.is_none());
    }
}
