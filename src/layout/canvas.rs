use crate::config::{FreeLayoutConfig, GridConfig};
use crate::ir::Orientation;

use super::grid::GridShape;
use super::strategy::GridParams;
use super::structure::StructureAnalysis;
use super::{Canvas, NodeLayout};

/// Bounds `value` to `[min, max]`. Non-finite or non-positive input falls
/// back to `min`. Returns the bounded value and whether the max was hit.
pub fn clamp_dimension(value: f32, min: f32, max: f32) -> (f32, bool) {
    let max = max.max(min);
    if !value.is_finite() || value <= 0.0 {
        return (min, false);
    }
    if value > max {
        (max, true)
    } else {
        (value.max(min), false)
    }
}

pub fn size_grid_canvas(
    shape: GridShape,
    pitch: (f32, f32),
    params: &GridParams,
    margin_x: f32,
    margin_y: f32,
    config: &GridConfig,
) -> Canvas {
    let (pitch_x, pitch_y) = pitch;
    let raw_width = 2.0 * margin_x + shape.cols as f32 * pitch_x - params.horizontal_spacing;
    let raw_height = 2.0 * margin_y + shape.rows as f32 * pitch_y - params.vertical_spacing;
    let (width, width_capped) = clamp_dimension(raw_width, config.min_width, config.max_width);
    let (height, height_capped) =
        clamp_dimension(raw_height, config.min_height, config.max_height);
    if width_capped || height_capped {
        tracing::debug!(raw_width, raw_height, width, height, "grid canvas capped");
    }
    Canvas { width, height }
}

/// Inputs for sizing a free-layout canvas.
#[derive(Debug, Clone, Copy)]
pub struct FreeCanvasInput {
    pub node_count: usize,
    pub levels: usize,
    pub widest_level: usize,
    /// Largest node extent along the level axis.
    pub primary_extent: f32,
    /// Largest node extent along the sibling axis.
    pub secondary_extent: f32,
}

/// Growth multiplier for branchy graphs.
pub fn free_size_factor(structure: &StructureAnalysis, config: &FreeLayoutConfig) -> f32 {
    let mut factor = 1.0;
    if structure.has_complex_branches {
        factor *= config.complex_branch_factor;
    }
    if structure.max_branches > 2 {
        factor *= config.tree_factor;
        if structure.max_branches > 4 {
            factor *= config.bushy_tree_ease;
        }
    }
    factor
}

pub fn size_free_canvas(
    input: FreeCanvasInput,
    structure: &StructureAnalysis,
    orientation: Orientation,
    margin_x: f32,
    margin_y: f32,
    config: &FreeLayoutConfig,
) -> Canvas {
    let factor = free_size_factor(structure, config);
    let (primary_margin, secondary_margin) = if orientation.is_horizontal() {
        (margin_x, margin_y)
    } else {
        (margin_y, margin_x)
    };

    let primary_heuristic = input.node_count as f32 * config.primary_per_node * factor;
    let primary_required = input.levels as f32 * (input.primary_extent + config.level_gap);
    let primary = primary_heuristic.max(primary_required) + 2.0 * primary_margin;

    let min_safe = input.secondary_extent + config.sibling_gap;
    let secondary_heuristic = input.widest_level as f32 * config.secondary_per_sibling * factor;
    let secondary_required =
        input.widest_level.saturating_sub(1) as f32 * min_safe + input.secondary_extent;
    let secondary = secondary_heuristic.max(secondary_required) + 2.0 * secondary_margin;

    let (primary, primary_capped) =
        clamp_dimension(primary, config.min_dimension, config.max_dimension);
    let (secondary, secondary_capped) =
        clamp_dimension(secondary, config.min_dimension, config.max_dimension);
    if primary_capped || secondary_capped {
        tracing::debug!(
            primary,
            secondary,
            node_count = input.node_count,
            "free canvas capped at maximum dimension"
        );
    }

    if orientation.is_horizontal() {
        Canvas {
            width: primary,
            height: secondary,
        }
    } else {
        Canvas {
            width: secondary,
            height: primary,
        }
    }
}

fn clamp_axis(pos: f32, half: f32, margin: f32, dimension: f32) -> f32 {
    let lo = margin + half;
    let hi = dimension - margin - half;
    if lo > hi {
        return dimension / 2.0;
    }
    if !pos.is_finite() {
        return lo;
    }
    pos.clamp(lo, hi)
}

/// Pulls every node back inside the margins. A node wider than the usable
/// span is centered on that axis.
pub fn clamp_into_canvas<'a>(
    nodes: impl IntoIterator<Item = &'a mut NodeLayout>,
    canvas: Canvas,
    margin_x: f32,
    margin_y: f32,
) {
    for node in nodes {
        node.x = clamp_axis(node.x, node.width / 2.0, margin_x, canvas.width);
        node.y = clamp_axis(node.y, node.height / 2.0, margin_y, canvas.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;
    use crate::layout::TextBlock;

    #[test]
    fn clamp_dimension_bounds_and_flags() {
        assert_eq!(clamp_dimension(100.0, 480.0, 9600.0), (480.0, false));
        assert_eq!(clamp_dimension(1000.0, 480.0, 9600.0), (1000.0, false));
        assert_eq!(clamp_dimension(20000.0, 480.0, 9600.0), (9600.0, true));
        assert_eq!(clamp_dimension(f32::NAN, 480.0, 9600.0), (480.0, false));
        assert_eq!(clamp_dimension(-5.0, 480.0, 9600.0), (480.0, false));
    }

    #[test]
    fn grid_canvas_matches_cells() {
        let params = GridParams {
            per_line_cap: 6,
            max_lines: 4,
            horizontal_spacing: 48.0,
            vertical_spacing: 32.0,
        };
        let canvas = size_grid_canvas(
            GridShape { rows: 1, cols: 4 },
            (208.0, 88.0),
            &params,
            64.0,
            48.0,
            &GridConfig::default(),
        );
        assert_eq!(canvas.width, 128.0 + 4.0 * 208.0 - 48.0);
        assert_eq!(canvas.height, 240.0);
    }

    #[test]
    fn size_factor_grows_with_branching() {
        let config = FreeLayoutConfig::default();
        let mut structure = StructureAnalysis::default();
        assert_eq!(free_size_factor(&structure, &config), 1.0);
        structure.has_complex_branches = true;
        structure.max_branches = 3;
        assert!((free_size_factor(&structure, &config) - 1.3 * 1.25).abs() < 1e-5);
        structure.max_branches = 5;
        assert!((free_size_factor(&structure, &config) - 1.3 * 1.25 * 0.9).abs() < 1e-5);
    }

    #[test]
    fn free_canvas_is_capped() {
        let mut structure = StructureAnalysis::default();
        structure.has_complex_branches = true;
        structure.max_branches = 5;
        let canvas = size_free_canvas(
            FreeCanvasInput {
                node_count: 40,
                levels: 4,
                widest_level: 25,
                primary_extent: 160.0,
                secondary_extent: 56.0,
            },
            &structure,
            Orientation::LeftRight,
            64.0,
            48.0,
            &FreeLayoutConfig::default(),
        );
        assert_eq!(canvas.width, 12800.0);
        assert!(canvas.height <= 12800.0);
    }

    #[test]
    fn clamp_pulls_nodes_inside() {
        let mut nodes = vec![
            NodeLayout {
                id: "a".into(),
                kind: NodeKind::Default,
                x: -10.0,
                y: 1000.0,
                width: 100.0,
                height: 40.0,
                label: TextBlock::default(),
                depth: None,
            },
            NodeLayout {
                id: "wide".into(),
                kind: NodeKind::Default,
                x: 5.0,
                y: 50.0,
                width: 900.0,
                height: 40.0,
                label: TextBlock::default(),
                depth: None,
            },
        ];
        let canvas = Canvas {
            width: 640.0,
            height: 480.0,
        };
        clamp_into_canvas(nodes.iter_mut(), canvas, 64.0, 48.0);
        assert_eq!(nodes[0].x, 114.0);
        assert_eq!(nodes[0].y, 480.0 - 48.0 - 20.0);
        assert_eq!(nodes[1].x, 320.0);
        assert_eq!(nodes[1].y, 68.0);
    }
}
