#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

use crate::config::LayoutConfig;
use crate::ir::{Graph, Orientation};
use crate::layout::{Layout, compute_layout};
use crate::parser::InputFormat;
use crate::theme::Theme;
use anyhow::Result;

/// Options for [`render_flowchart`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub format: InputFormat,
    /// Overrides any orientation named in the input header.
    pub orientation: Option<Orientation>,
    pub theme: Theme,
    pub layout: LayoutConfig,
}

impl RenderOptions {
    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RenderedFlowchart {
    pub graph: Graph,
    pub layout: Layout,
    pub svg: String,
    /// Notation the input was parsed as.
    pub format: InputFormat,
}

/// Parses `input`, lays it out and renders SVG in one call.
pub fn render_flowchart(input: &str, options: &RenderOptions) -> Result<RenderedFlowchart> {
    let parsed = parser::parse(input, options.format)?;
    let orientation = options
        .orientation
        .or(parsed.orientation)
        .unwrap_or_default();
    let layout = compute_layout(&parsed.graph, orientation, &options.theme, &options.layout)?;
    let svg = render::render_svg(&layout, &options.theme);
    Ok(RenderedFlowchart {
        graph: parsed.graph,
        layout,
        svg,
        format: parsed.format,
    })
}
