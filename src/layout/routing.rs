use std::collections::BTreeMap;

use crate::config::{LayoutConfig, RoutingConfig};
use crate::ir::{Edge, NodeKind, Orientation};
use crate::text_metrics;
use crate::theme::Theme;

use super::structure::StructureAnalysis;
use super::{EdgeLayout, NodeLayout, RouteKind};

/// Wrap width for edge labels.
const EDGE_LABEL_WRAP_WIDTH: f32 = 120.0;
const EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub kind: RouteKind,
    pub points: Vec<(f32, f32)>,
}

fn center(node: &NodeLayout) -> (f32, f32) {
    (node.x, node.y)
}

fn is_degenerate(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() <= EPSILON && (a.1 - b.1).abs() <= EPSILON
}

/// Point where the ray from the node center toward `toward` leaves the
/// node outline. Diamonds use their rhombus, everything else its box.
pub fn boundary_point(node: &NodeLayout, toward: (f32, f32)) -> (f32, f32) {
    let (cx, cy) = center(node);
    let dx = toward.0 - cx;
    let dy = toward.1 - cy;
    let hw = node.width / 2.0;
    let hh = node.height / 2.0;
    if (dx.abs() <= EPSILON && dy.abs() <= EPSILON) || hw <= 0.0 || hh <= 0.0 {
        return (cx, cy);
    }
    let t = if node.kind == NodeKind::Decision {
        1.0 / (dx.abs() / hw + dy.abs() / hh)
    } else {
        let tx = if dx.abs() > EPSILON { hw / dx.abs() } else { f32::INFINITY };
        let ty = if dy.abs() > EPSILON { hh / dy.abs() } else { f32::INFINITY };
        tx.min(ty)
    };
    // Target inside the outline: keep the target itself.
    if t >= 1.0 {
        return toward;
    }
    (cx + dx * t, cy + dy * t)
}

/// Direct segment when the flow runs along the natural axis or the edge
/// touches a branch or merge node; otherwise an L-path whose first leg
/// covers `step_ratio` of the natural-axis delta.
pub fn route(
    from: &NodeLayout,
    to: &NodeLayout,
    orientation: Orientation,
    is_branch_edge: bool,
    config: &RoutingConfig,
) -> RoutedPath {
    let start = center(from);
    let end = center(to);
    if is_degenerate(start, end) {
        return RoutedPath {
            kind: RouteKind::Direct,
            points: vec![start, end],
        };
    }

    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let along_natural = if orientation.is_horizontal() {
        dx.abs() >= dy.abs()
    } else {
        dy.abs() >= dx.abs()
    };

    if is_branch_edge || along_natural {
        let points = if config.clip_to_nodes {
            vec![boundary_point(from, end), boundary_point(to, start)]
        } else {
            vec![start, end]
        };
        return RoutedPath {
            kind: RouteKind::Direct,
            points,
        };
    }

    let corner = if orientation.is_horizontal() {
        (start.0 + dx * config.step_ratio, start.1)
    } else {
        (start.0, start.1 + dy * config.step_ratio)
    };
    let points = if config.clip_to_nodes {
        let first = if is_degenerate(start, corner) {
            start
        } else {
            boundary_point(from, corner)
        };
        vec![first, corner, boundary_point(to, corner)]
    } else {
        vec![start, corner, end]
    };
    RoutedPath {
        kind: RouteKind::Stepped,
        points,
    }
}

pub fn path_length(points: &[(f32, f32)]) -> f32 {
    points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].0 - pair[0].0;
            let dy = pair[1].1 - pair[0].1;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Point halfway along the polyline by arc length.
pub fn path_midpoint(points: &[(f32, f32)]) -> Option<(f32, f32)> {
    let first = *points.first()?;
    let half = path_length(points) / 2.0;
    if half <= EPSILON {
        return Some(first);
    }
    let mut walked = 0.0;
    for pair in points.windows(2) {
        let dx = pair[1].0 - pair[0].0;
        let dy = pair[1].1 - pair[0].1;
        let len = (dx * dx + dy * dy).sqrt();
        if len > EPSILON && walked + len >= half {
            let t = (half - walked) / len;
            return Some((pair[0].0 + dx * t, pair[0].1 + dy * t));
        }
        walked += len;
    }
    points.last().copied()
}

/// Routes every edge whose endpoints are both placed, in input order.
pub fn route_edges(
    edges: &[Edge],
    nodes: &BTreeMap<String, NodeLayout>,
    structure: &StructureAnalysis,
    orientation: Orientation,
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<EdgeLayout> {
    let mut out = Vec::with_capacity(edges.len());
    for edge in edges {
        let (Some(from), Some(to)) = (nodes.get(&edge.from), nodes.get(&edge.to)) else {
            continue;
        };
        let branch_edge =
            structure.is_branch_or_merge(&edge.from) || structure.is_branch_or_merge(&edge.to);
        let routed = route(from, to, orientation, branch_edge, &config.routing);
        let label = edge
            .label
            .as_deref()
            .map(|text| text_metrics::wrap(text, EDGE_LABEL_WRAP_WIDTH, &config.text));
        let label_anchor = label
            .as_ref()
            .and_then(|_| path_midpoint(&routed.points));
        let color = match edge.label.as_deref() {
            Some(text) => theme.label_color(text).to_string(),
            None => theme.line_color.clone(),
        };
        out.push(EdgeLayout {
            from: edge.from.clone(),
            to: edge.to.clone(),
            route: routed.kind,
            points: routed.points,
            branch_edge,
            label,
            label_anchor,
            color,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TextBlock;

    fn node(id: &str, x: f32, y: f32) -> NodeLayout {
        NodeLayout {
            id: id.to_string(),
            kind: NodeKind::Default,
            x,
            y,
            width: 100.0,
            height: 40.0,
            label: TextBlock::default(),
            depth: None,
        }
    }

    #[test]
    fn horizontal_flow_is_direct_and_clipped() {
        let a = node("a", 100.0, 100.0);
        let b = node("b", 300.0, 110.0);
        let path = route(&a, &b, Orientation::LeftRight, false, &RoutingConfig::default());
        assert_eq!(path.kind, RouteKind::Direct);
        assert_eq!(path.points.len(), 2);
        assert!((path.points[0].0 - 150.0).abs() < 1e-3);
        assert!((path.points[1].0 - 250.0).abs() < 1e-3);
    }

    #[test]
    fn cross_axis_flow_steps() {
        let a = node("a", 100.0, 100.0);
        let b = node("b", 200.0, 400.0);
        let path = route(&a, &b, Orientation::LeftRight, false, &RoutingConfig::default());
        assert_eq!(path.kind, RouteKind::Stepped);
        assert_eq!(path.points.len(), 3);
        assert!((path.points[1].0 - 170.0).abs() < 1e-3);
        assert_eq!(path.points[1].1, 100.0);
        assert!((path.points[0].0 - 150.0).abs() < 1e-3);
    }

    #[test]
    fn branch_edges_stay_direct() {
        let a = node("a", 100.0, 100.0);
        let b = node("b", 200.0, 400.0);
        let path = route(&a, &b, Orientation::LeftRight, true, &RoutingConfig::default());
        assert_eq!(path.kind, RouteKind::Direct);
    }

    #[test]
    fn top_bottom_steps_vertically_first() {
        let a = node("a", 100.0, 100.0);
        let b = node("b", 500.0, 200.0);
        let path = route(&a, &b, Orientation::TopBottom, false, &RoutingConfig::default());
        assert_eq!(path.kind, RouteKind::Stepped);
        assert_eq!(path.points[1], (100.0, 170.0));
    }

    #[test]
    fn self_loop_is_zero_length() {
        let a = node("a", 100.0, 100.0);
        let path = route(&a, &a, Orientation::LeftRight, false, &RoutingConfig::default());
        assert_eq!(path.points, vec![(100.0, 100.0), (100.0, 100.0)]);
        assert_eq!(path_midpoint(&path.points), Some((100.0, 100.0)));
    }

    #[test]
    fn diamond_clip_uses_rhombus() {
        let mut d = node("d", 0.0, 0.0);
        d.kind = NodeKind::Decision;
        let p = boundary_point(&d, (100.0, 100.0));
        assert!((p.0 / 50.0 + p.1 / 20.0 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn midpoint_walks_arc_length() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 30.0)];
        assert_eq!(path_midpoint(&points), Some((10.0, 10.0)));
        assert_eq!(path_midpoint(&[]), None);
    }

    #[test]
    fn negative_label_uses_negative_color() {
        let theme = Theme::default();
        let mut nodes = BTreeMap::new();
        nodes.insert("a".to_string(), node("a", 100.0, 100.0));
        nodes.insert("b".to_string(), node("b", 300.0, 100.0));
        let edges = vec![
            Edge::labeled("a", "b", "No"),
            Edge::new("a", "b"),
            Edge::new("a", "missing"),
        ];
        let routed = route_edges(
            &edges,
            &nodes,
            &StructureAnalysis::default(),
            Orientation::LeftRight,
            &theme,
            &LayoutConfig::default(),
        );
        assert_eq!(routed.len(), 2);
        assert_eq!(routed[0].color, "#C62828");
        assert_eq!(routed[0].label_anchor, Some((200.0, 100.0)));
        assert_eq!(routed[1].color, theme.line_color);
        assert!(routed[1].label.is_none());
    }
}
