use crate::config::RenderConfig;
use crate::ir::NodeKind;
use crate::layout::{EdgeLayout, Layout, NodeLayout, TextBlock};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

// Edge label pill padding
const LABEL_PAD_X: f32 = 6.0;
const LABEL_PAD_Y: f32 = 4.0;
const NODE_CORNER_RADIUS: f32 = 8.0;
/// Radius of the loop drawn for an edge from a node to itself.
const SELF_LOOP_RADIUS: f32 = 18.0;

pub fn render_svg(layout: &Layout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    // One marker per connector color so arrow heads match their line.
    let mut markers: BTreeMap<&str, String> = BTreeMap::new();
    for edge in &layout.edges {
        let next = markers.len();
        markers
            .entry(edge.color.as_str())
            .or_insert_with(|| format!("arrow-{next}"));
    }
    svg.push_str("<defs>");
    for (color, id) in &markers {
        svg.push_str(&format!(
            "<marker id=\"{id}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"7\" markerHeight=\"7\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>",
        ));
    }
    svg.push_str("</defs>");

    for edge in &layout.edges {
        let d = match layout.nodes.get(&edge.from) {
            Some(node) if edge.from == edge.to => self_loop_path(node),
            _ => points_to_path(&edge.points),
        };
        let marker = markers
            .get(edge.color.as_str())
            .map(|id| format!("marker-end=\"url(#{id})\""))
            .unwrap_or_default();
        svg.push_str(&format!(
            "<path d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" {marker}/>",
            edge.color, theme.line_width
        ));
    }

    for node in layout.nodes.values() {
        svg.push_str(&node_shape_svg(node, theme));
        svg.push_str(&text_block_svg(
            node.x,
            node.y,
            &node.label,
            theme,
            &theme.text_color,
        ));
    }

    // Labels last so pills sit above nodes and connectors.
    for edge in &layout.edges {
        svg.push_str(&edge_label_svg(edge, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn node_shape_svg(node: &NodeLayout, theme: &Theme) -> String {
    let fill = theme.fill_for(node.kind);
    let left = node.x - node.width / 2.0;
    let top = node.y - node.height / 2.0;
    match node.kind {
        NodeKind::Decision => {
            let (cx, cy) = (node.x, node.y);
            let (hw, hh) = (node.width / 2.0, node.height / 2.0);
            format!(
                "<polygon points=\"{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                cx,
                cy - hh,
                cx + hw,
                cy,
                cx,
                cy + hh,
                cx - hw,
                cy,
                theme.border_color,
                theme.border_width
            )
        }
        kind => {
            let radius = if matches!(kind, NodeKind::Start | NodeKind::End) {
                node.height / 2.0
            } else {
                NODE_CORNER_RADIUS
            };
            format!(
                "<rect x=\"{left:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                node.width, node.height, theme.border_color, theme.border_width
            )
        }
    }
}

fn edge_label_svg(edge: &EdgeLayout, theme: &Theme) -> String {
    let (Some(label), Some((x, y))) = (edge.label.as_ref(), edge.label_anchor) else {
        return String::new();
    };
    if label.is_empty() {
        return String::new();
    }
    let rect_w = label.width + LABEL_PAD_X * 2.0;
    let rect_h = label.height + LABEL_PAD_Y * 2.0;
    let rect_x = x - rect_w / 2.0;
    let rect_y = y - rect_h / 2.0;
    let mut out = format!(
        "<rect x=\"{rect_x:.2}\" y=\"{rect_y:.2}\" width=\"{rect_w:.2}\" height=\"{rect_h:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\"/>",
        rect_h / 2.0,
        rect_h / 2.0,
        edge.color
    );
    out.push_str(&text_block_svg(
        x,
        y,
        label,
        theme,
        &theme.edge_label_text_color,
    ));
    out
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

/// Small loop off the node's top edge.
fn self_loop_path(node: &NodeLayout) -> String {
    let top = node.y - node.height / 2.0;
    let start_x = node.x + node.width / 4.0;
    let end_x = start_x - SELF_LOOP_RADIUS;
    format!(
        "M {start_x:.2} {top:.2} C {:.2} {:.2} {:.2} {:.2} {end_x:.2} {top:.2}",
        start_x + SELF_LOOP_RADIUS,
        top - SELF_LOOP_RADIUS * 2.0,
        end_x - SELF_LOOP_RADIUS,
        top - SELF_LOOP_RADIUS * 2.0,
    )
}

fn text_block_svg(x: f32, y: f32, label: &TextBlock, theme: &Theme, fill: &str) -> String {
    if label.lines.is_empty() {
        return String::new();
    }
    let line_height = label.height / label.lines.len() as f32;
    // First baseline, so the block is vertically centered on `y`.
    let start_y = y - label.height / 2.0 + line_height / 2.0;
    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{fill}\">",
        escape_xml(&theme.font_family),
        theme.font_size
    );
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
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
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.scale.max(0.1);
    let size = tree.size().to_int_size();
    let width = ((size.width() as f32) * scale).ceil() as u32;
    let height = ((size.height() as f32) * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
