mod canvas;
mod error;
mod free;
mod grid;
mod routing;
mod strategy;
mod structure;
mod text;
pub(crate) mod types;
pub use types::*;

pub use canvas::{clamp_dimension, clamp_into_canvas};
pub use error::LayoutError;
pub use grid::{GridShape, plan_grid};
pub use routing::{RoutedPath, path_midpoint, route};
pub use strategy::{GridParams, LayoutDecision, LayoutStrategy, select_strategy};
pub use structure::{StructureAnalysis, analyze, build_hierarchy};
pub use text::{LengthDistribution, TextAnalysis, TextComplexity, analyze_text, size_node};

use std::collections::{BTreeMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::{Edge, Graph, Orientation};
use crate::theme::Theme;

/// Lays out `graph` on a bounded canvas and routes its connectors.
///
/// Edges naming unknown nodes are dropped. The result is a pure function of
/// the inputs; the chosen strategy is reported in [`Layout::decision`].
pub fn compute_layout(
    graph: &Graph,
    orientation: Orientation,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    if graph.nodes.is_empty() {
        return Err(LayoutError::EmptyGraph);
    }

    let known: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let edges: Vec<Edge> = graph
        .edges
        .iter()
        .filter(|edge| known.contains(edge.from.as_str()) && known.contains(edge.to.as_str()))
        .cloned()
        .collect();
    let dropped = graph.edges.len() - edges.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped edges with unknown endpoints");
    }

    let structure = analyze(&graph.nodes, &edges);
    let text = analyze_text(&graph.nodes, &config.text);
    let decision = select_strategy(&structure, &text, graph.nodes.len(), edges.len());
    tracing::debug!(
        strategy = decision.strategy.as_str(),
        reason = %decision.reason,
        nodes = decision.node_count,
        edges = decision.edge_count,
        "layout strategy selected"
    );

    let sized: Vec<SizedNode> = graph
        .nodes
        .iter()
        .map(|node| size_node(node, &config.text))
        .collect();

    let (canvas, positions, depths) = if decision.strategy.is_grid() {
        let params = decision.strategy.grid_params(&text, &config.grid);
        let shape = plan_grid(sized.len(), orientation, &params);
        let pitch = grid::cell_pitch(&sized, &params);
        let canvas = canvas::size_grid_canvas(
            shape,
            pitch,
            &params,
            config.margin_x,
            config.margin_y,
            &config.grid,
        );
        let positions = grid::place_grid(
            &sized,
            shape,
            orientation,
            &params,
            canvas,
            config.margin_x,
            config.margin_y,
        );
        (canvas, positions, None)
    } else {
        let depths = build_hierarchy(&graph.nodes, &edges);
        let levels = free::group_levels(&sized, &depths);
        let (primary_extent, secondary_extent) = free::axis_extents(&sized, orientation);
        let input = canvas::FreeCanvasInput {
            node_count: sized.len(),
            levels: levels.len(),
            widest_level: levels.iter().map(Vec::len).max().unwrap_or(1),
            primary_extent,
            secondary_extent,
        };
        let canvas = canvas::size_free_canvas(
            input,
            &structure,
            orientation,
            config.margin_x,
            config.margin_y,
            &config.free,
        );
        let positions = free::place_free(
            &sized,
            &depths,
            &structure,
            orientation,
            canvas,
            config.margin_x,
            config.margin_y,
            &config.free,
        );
        (canvas, positions, Some(depths))
    };

    let mut nodes: BTreeMap<String, NodeLayout> = BTreeMap::new();
    for (node, position) in sized.into_iter().zip(positions) {
        let depth = depths
            .as_ref()
            .and_then(|depths| depths.get(&node.id).copied());
        nodes.insert(
            node.id.clone(),
            NodeLayout {
                id: node.id,
                kind: node.kind,
                x: position.x,
                y: position.y,
                width: node.width,
                height: node.height,
                label: node.label,
                depth,
            },
        );
    }
    clamp_into_canvas(nodes.values_mut(), canvas, config.margin_x, config.margin_y);

    let edges = routing::route_edges(&edges, &nodes, &structure, orientation, theme, config);

    Ok(Layout {
        orientation,
        width: canvas.width,
        height: canvas.height,
        nodes,
        edges,
        decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;

    fn chain(labels: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for (idx, label) in labels.iter().enumerate() {
            graph.ensure_node(&format!("n{idx}"), Some(label.to_string()), None);
            if idx > 0 {
                graph.push_edge(Edge::new(format!("n{}", idx - 1), format!("n{idx}")));
            }
        }
        graph
    }

    fn layout(graph: &Graph, orientation: Orientation) -> Layout {
        compute_layout(graph, orientation, &Theme::default(), &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn empty_graph_is_rejected() {
        let err = compute_layout(
            &Graph::new(),
            Orientation::LeftRight,
            &Theme::default(),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::EmptyGraph);
        assert_eq!(err.to_string(), "no nodes to lay out");
    }

    #[test]
    fn single_node_is_centered_and_contained() {
        let layout = layout(&chain(&["Alone"]), Orientation::LeftRight);
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
        assert!(layout.width >= 480.0 && layout.height >= 240.0);
        let node = &layout.nodes["n0"];
        assert!((node.x - layout.width / 2.0).abs() < 1e-3);
        assert!((node.y - layout.height / 2.0).abs() < 1e-3);
    }

    #[test]
    fn chain_left_right_is_one_row() {
        let layout = layout(&chain(&["Start", "Load", "Save", "End"]), Orientation::LeftRight);
        assert_eq!(layout.decision.strategy, LayoutStrategy::EnglishOptimized);
        let ys: Vec<f32> = (0..4).map(|i| layout.nodes[&format!("n{i}")].y).collect();
        assert!(ys.windows(2).all(|pair| pair[0] == pair[1]));
        let xs: Vec<f32> = (0..4).map(|i| layout.nodes[&format!("n{i}")].x).collect();
        assert!(xs.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(layout.nodes.values().all(|n| n.depth.is_none()));
    }

    #[test]
    fn chain_top_bottom_is_one_column() {
        let layout = layout(&chain(&["开始", "处理", "结束"]), Orientation::TopBottom);
        assert_eq!(layout.decision.strategy, LayoutStrategy::CompactGrid);
        let xs: Vec<f32> = (0..3).map(|i| layout.nodes[&format!("n{i}")].x).collect();
        assert!(xs.windows(2).all(|pair| pair[0] == pair[1]));
        let ys: Vec<f32> = (0..3).map(|i| layout.nodes[&format!("n{i}")].y).collect();
        assert!(ys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn dangling_edges_are_dropped() {
        let mut graph = chain(&["A", "B"]);
        graph.push_edge(Edge::new("n1", "ghost"));
        graph.push_edge(Edge::new("ghost", "n0"));
        let layout = layout(&graph, Orientation::LeftRight);
        assert_eq!(layout.edges.len(), 1);
        assert_eq!(layout.decision.edge_count, 1);
        assert_eq!(layout.nodes.len(), 2);
    }

    #[test]
    fn branching_uses_depth_levels() {
        let mut graph = Graph::new();
        graph.ensure_node("A", Some("Begin".into()), Some(NodeKind::Start));
        graph.ensure_node("B", Some("Check".into()), Some(NodeKind::Decision));
        graph.ensure_node("C", Some("Yes".into()), None);
        graph.ensure_node("D", Some("No".into()), None);
        graph.push_edge(Edge::new("A", "B"));
        graph.push_edge(Edge::labeled("B", "C", "Yes"));
        graph.push_edge(Edge::labeled("B", "D", "No"));
        let layout = layout(&graph, Orientation::TopBottom);
        assert_eq!(layout.decision.strategy, LayoutStrategy::FreeLayout);
        assert_eq!(layout.nodes["A"].depth, Some(0));
        assert_eq!(layout.nodes["C"].depth, Some(2));
        assert!(layout.nodes["A"].y < layout.nodes["B"].y);
        assert_eq!(layout.nodes["C"].y, layout.nodes["D"].y);
        assert!((layout.nodes["C"].x + layout.nodes["D"].x - layout.width).abs() < 1e-2);
        assert!(layout.edges.iter().all(|edge| edge.branch_edge));
    }

    #[test]
    fn self_loop_does_not_break_layout() {
        let mut graph = chain(&["A", "B"]);
        graph.push_edge(Edge::new("n1", "n1"));
        let layout = layout(&graph, Orientation::LeftRight);
        let looped = layout.edges.iter().find(|e| e.from == e.to).unwrap();
        assert_eq!(looped.points[0], looped.points[1]);
    }
}
