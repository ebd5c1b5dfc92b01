use std::collections::BTreeMap;

use crate::config::FreeLayoutConfig;
use crate::ir::{NodeKind, Orientation};

use super::structure::StructureAnalysis;
use super::{Canvas, Position, SizedNode};

/// Node indices per depth level, each level in input order.
pub fn group_levels(nodes: &[SizedNode], depths: &BTreeMap<String, usize>) -> Vec<Vec<usize>> {
    let max_depth = depths.values().copied().max().unwrap_or(0);
    let mut levels: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
    for (idx, node) in nodes.iter().enumerate() {
        let depth = depths.get(&node.id).copied().unwrap_or(0);
        levels[depth].push(idx);
    }
    levels
}

/// Largest node extent along the level axis and the sibling axis.
pub fn axis_extents(nodes: &[SizedNode], orientation: Orientation) -> (f32, f32) {
    nodes.iter().fold((0.0f32, 0.0f32), |(primary, secondary), node| {
        let (p, s) = if orientation.is_horizontal() {
            (node.width, node.height)
        } else {
            (node.height, node.width)
        };
        (primary.max(p), secondary.max(s))
    })
}

fn level_is_branchy(level: &[usize], nodes: &[SizedNode], structure: &StructureAnalysis) -> bool {
    level.iter().any(|idx| {
        let node = &nodes[*idx];
        node.kind == NodeKind::Decision
            || structure.branch_nodes.contains(&node.id)
            || structure.decision_nodes.contains(&node.id)
    })
}

/// Sibling-axis centers for one level of `count` nodes.
fn sibling_centers(
    count: usize,
    extent: f32,
    branch_factor: f32,
    start: f32,
    available: f32,
    config: &FreeLayoutConfig,
) -> Vec<f32> {
    let center = start + available / 2.0;
    if count <= 1 {
        return vec![center; count];
    }
    let gaps = (count - 1) as f32;
    let min_safe = extent + config.sibling_gap;
    let spacing = min_safe.max(available * config.sibling_spread_ratio / gaps) * branch_factor;
    let spread = spacing * gaps;

    if spread + extent > available {
        let spacing = ((available - extent) / gaps).max(0.0);
        let first = start + extent / 2.0;
        tracing::debug!(count, spacing, "sibling spread recentred to fit");
        return (0..count).map(|i| first + i as f32 * spacing).collect();
    }

    let first = center - spread / 2.0;
    (0..count).map(|i| first + i as f32 * spacing).collect()
}

/// Depth-level placement: levels advance along the flow axis, siblings
/// spread symmetrically across it.
#[allow(clippy::too_many_arguments)]
pub fn place_free(
    nodes: &[SizedNode],
    depths: &BTreeMap<String, usize>,
    structure: &StructureAnalysis,
    orientation: Orientation,
    canvas: Canvas,
    margin_x: f32,
    margin_y: f32,
    config: &FreeLayoutConfig,
) -> Vec<Position> {
    let levels = group_levels(nodes, depths);
    let (primary_extent, secondary_extent) = axis_extents(nodes, orientation);
    let (primary_dim, secondary_dim, primary_margin, secondary_margin) =
        if orientation.is_horizontal() {
            (canvas.width, canvas.height, margin_x, margin_y)
        } else {
            (canvas.height, canvas.width, margin_y, margin_x)
        };
    let primary_available = (primary_dim - 2.0 * primary_margin).max(0.0);
    let secondary_available = (secondary_dim - 2.0 * secondary_margin).max(0.0);
    let level_extent = primary_available / levels.len().max(1) as f32;
    if level_extent < primary_extent {
        tracing::debug!(level_extent, primary_extent, "levels narrower than nodes");
    }

    let mut positions = vec![Position::default(); nodes.len()];
    for (depth, level) in levels.iter().enumerate() {
        let primary = primary_margin + (depth as f32 + 0.5) * level_extent;
        let mut branch_factor = 1.0;
        if level_is_branchy(level, nodes, structure) {
            branch_factor = config.branch_spacing_factor;
            if structure.max_branches > 3 {
                branch_factor *= config.bushy_spacing_factor;
            }
        }
        let secondaries = sibling_centers(
            level.len(),
            secondary_extent,
            branch_factor,
            secondary_margin,
            secondary_available,
            config,
        );
        for (idx, secondary) in level.iter().zip(secondaries) {
            positions[*idx] = if orientation.is_horizontal() {
                Position::new(primary, secondary)
            } else {
                Position::new(secondary, primary)
            };
        }
    }
    positions
}
