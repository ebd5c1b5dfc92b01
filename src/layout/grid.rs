use crate::ir::Orientation;

use super::strategy::GridParams;
use super::{Canvas, Position, SizedNode};

/// Row and column count of a grid plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn cells(self) -> usize {
        self.rows * self.cols
    }
}

/// Splits `count` nodes into at most `max_lines` lines of `per_line_cap`
/// nodes. Lines are rows for left-right flow and columns for top-bottom.
pub fn plan_grid(count: usize, orientation: Orientation, params: &GridParams) -> GridShape {
    if count == 0 {
        return GridShape { rows: 0, cols: 0 };
    }
    let cap = params.per_line_cap.max(1);
    let lines = count.div_ceil(cap).clamp(1, params.max_lines.max(1));
    let per_line = count.div_ceil(lines);
    match orientation {
        Orientation::LeftRight => GridShape {
            rows: lines,
            cols: per_line,
        },
        Orientation::TopBottom => GridShape {
            rows: per_line,
            cols: lines,
        },
    }
}

/// Largest node extent on each axis.
pub fn max_extent(nodes: &[SizedNode]) -> (f32, f32) {
    nodes.iter().fold((0.0f32, 0.0f32), |(w, h), node| {
        (w.max(node.width), h.max(node.height))
    })
}

/// Center-to-center distance between neighbouring cells.
pub fn cell_pitch(nodes: &[SizedNode], params: &GridParams) -> (f32, f32) {
    let (max_w, max_h) = max_extent(nodes);
    (
        max_w + params.horizontal_spacing,
        max_h + params.vertical_spacing,
    )
}

/// (row, col) of the `idx`-th node. Left-right fills rows first,
/// top-bottom fills columns first.
pub fn cell_of(idx: usize, shape: GridShape, orientation: Orientation) -> (usize, usize) {
    match orientation {
        Orientation::LeftRight => {
            let cols = shape.cols.max(1);
            (idx / cols, idx % cols)
        }
        Orientation::TopBottom => {
            let rows = shape.rows.max(1);
            (idx % rows, idx / rows)
        }
    }
}

/// Centers of the grid cells along one axis. The block is centered in the
/// available span; when it does not fit, the pitch shrinks so the outer
/// cells touch the margins.
fn axis_centers(
    cells: usize,
    extent: f32,
    pitch: f32,
    spacing: f32,
    margin: f32,
    dimension: f32,
) -> Vec<f32> {
    if cells == 0 {
        return Vec::new();
    }
    let available = (dimension - 2.0 * margin).max(0.0);
    let mut pitch = pitch;
    let mut block = cells as f32 * pitch - spacing;
    if block > available && cells > 1 {
        pitch = ((available - extent) / (cells - 1) as f32).max(0.0);
        block = extent + (cells - 1) as f32 * pitch;
    }
    let offset = ((available - block) / 2.0).max(0.0);
    (0..cells)
        .map(|idx| margin + offset + extent / 2.0 + idx as f32 * pitch)
        .collect()
}

/// Places nodes in input order on the planned grid inside `canvas`.
pub fn place_grid(
    nodes: &[SizedNode],
    shape: GridShape,
    orientation: Orientation,
    params: &GridParams,
    canvas: Canvas,
    margin_x: f32,
    margin_y: f32,
) -> Vec<Position> {
    let (max_w, max_h) = max_extent(nodes);
    let (pitch_x, pitch_y) = cell_pitch(nodes, params);
    let xs = axis_centers(
        shape.cols,
        max_w,
        pitch_x,
        params.horizontal_spacing,
        margin_x,
        canvas.width,
    );
    let ys = axis_centers(
        shape.rows,
        max_h,
        pitch_y,
        params.vertical_spacing,
        margin_y,
        canvas.height,
    );

    nodes
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            let (row, col) = cell_of(idx, shape, orientation);
            let x = xs.get(col).copied().unwrap_or(margin_x + max_w / 2.0);
            let y = ys.get(row).copied().unwrap_or(margin_y + max_h / 2.0);
            Position::new(x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;
    use crate::layout::TextBlock;

    fn params() -> GridParams {
        GridParams {
            per_line_cap: 6,
            max_lines: 4,
            horizontal_spacing: 48.0,
            vertical_spacing: 32.0,
        }
    }

    fn sized(count: usize) -> Vec<SizedNode> {
        (0..count)
            .map(|idx| SizedNode {
                id: format!("n{idx}"),
                kind: NodeKind::Default,
                width: 160.0,
                height: 56.0,
                label: TextBlock::default(),
            })
            .collect()
    }

    #[test]
    fn line_count_follows_cap() {
        let p = params();
        assert_eq!(plan_grid(4, Orientation::LeftRight, &p), GridShape { rows: 1, cols: 4 });
        assert_eq!(plan_grid(6, Orientation::LeftRight, &p), GridShape { rows: 1, cols: 6 });
        assert_eq!(plan_grid(7, Orientation::LeftRight, &p), GridShape { rows: 2, cols: 4 });
        assert_eq!(plan_grid(13, Orientation::LeftRight, &p).rows, 3);
        assert_eq!(plan_grid(19, Orientation::LeftRight, &p).rows, 4);
        assert_eq!(plan_grid(40, Orientation::LeftRight, &p), GridShape { rows: 4, cols: 10 });
    }

    #[test]
    fn top_bottom_uses_columns_as_lines() {
        let shape = plan_grid(7, Orientation::TopBottom, &params());
        assert_eq!(shape, GridShape { rows: 4, cols: 2 });
        assert_eq!(cell_of(0, shape, Orientation::TopBottom), (0, 0));
        assert_eq!(cell_of(3, shape, Orientation::TopBottom), (3, 0));
        assert_eq!(cell_of(4, shape, Orientation::TopBottom), (0, 1));
    }

    #[test]
    fn left_right_fills_rows_first() {
        let shape = GridShape { rows: 2, cols: 4 };
        assert_eq!(cell_of(3, shape, Orientation::LeftRight), (0, 3));
        assert_eq!(cell_of(4, shape, Orientation::LeftRight), (1, 0));
    }

    #[test]
    fn leftover_space_on_minimum_canvas_is_split_evenly() {
        // A 208-wide block in a 352-wide span leaves 72 on each side.
        let centers = axis_centers(2, 80.0, 128.0, 48.0, 64.0, 480.0);
        assert_eq!(centers, vec![64.0 + 72.0 + 40.0, 64.0 + 72.0 + 40.0 + 128.0]);
        let first_gap = centers[0] - 40.0 - 64.0;
        let last_gap = 480.0 - 64.0 - (centers[1] + 40.0);
        assert!((first_gap - last_gap).abs() < 1e-3);
    }

    #[test]
    fn single_row_is_evenly_pitched() {
        let nodes = sized(4);
        let p = params();
        let shape = plan_grid(4, Orientation::LeftRight, &p);
        let canvas = Canvas {
            width: 2.0 * 64.0 + 4.0 * 208.0 - 48.0,
            height: 240.0,
        };
        let positions = place_grid(&nodes, shape, Orientation::LeftRight, &p, canvas, 64.0, 48.0);
        assert_eq!(positions[0].x, 64.0 + 80.0);
        for pair in positions.windows(2) {
            assert!((pair[1].x - pair[0].x - 208.0).abs() < 1e-3);
            assert_eq!(pair[0].y, pair[1].y);
        }
    }

    #[test]
    fn narrow_canvas_compacts_pitch() {
        let nodes = sized(6);
        let p = params();
        let shape = plan_grid(6, Orientation::LeftRight, &p);
        let canvas = Canvas {
            width: 800.0,
            height: 240.0,
        };
        let positions = place_grid(&nodes, shape, Orientation::LeftRight, &p, canvas, 64.0, 48.0);
        assert!((positions[0].x - 144.0).abs() < 1e-3);
        assert!((positions[5].x - (800.0 - 144.0)).abs() < 1e-3);
    }
}
