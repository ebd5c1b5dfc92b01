use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Label measuring and node box sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMetricsConfig {
    pub latin_node_width: f32,
    pub latin_node_height: f32,
    pub cjk_node_width: f32,
    pub cjk_node_height: f32,
    pub decision_scale: f32,
    pub latin_char_width: f32,
    pub cjk_char_width: f32,
    pub line_height: f32,
    pub label_padding_y: f32,
    /// Share of the box width usable for text when wrapping.
    pub wrap_fill_ratio: f32,
    pub max_label_lines: usize,
    /// Labels longer than this count as long text.
    pub long_text_threshold: usize,
}

impl Default for TextMetricsConfig {
    fn default() -> Self {
        Self {
            latin_node_width: 160.0,
            latin_node_height: 56.0,
            cjk_node_width: 112.0,
            cjk_node_height: 48.0,
            decision_scale: 0.9,
            latin_char_width: 7.2,
            cjk_char_width: 14.0,
            line_height: 18.0,
            label_padding_y: 12.0,
            wrap_fill_ratio: 0.8,
            max_label_lines: 3,
            long_text_threshold: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    pub max_per_line: usize,
    pub max_lines: usize,
    pub latin_spacing_scale: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 48.0,
            vertical_spacing: 32.0,
            max_per_line: 6,
            max_lines: 4,
            latin_spacing_scale: 1.25,
            min_width: 480.0,
            max_width: 9600.0,
            min_height: 240.0,
            max_height: 7200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeLayoutConfig {
    pub level_gap: f32,
    pub sibling_gap: f32,
    pub primary_per_node: f32,
    pub secondary_per_sibling: f32,
    pub sibling_spread_ratio: f32,
    pub branch_spacing_factor: f32,
    pub bushy_spacing_factor: f32,
    pub complex_branch_factor: f32,
    pub tree_factor: f32,
    pub bushy_tree_ease: f32,
    pub min_dimension: f32,
    pub max_dimension: f32,
}

impl Default for FreeLayoutConfig {
    fn default() -> Self {
        Self {
            level_gap: 48.0,
            sibling_gap: 32.0,
            primary_per_node: 240.0,
            secondary_per_sibling: 160.0,
            sibling_spread_ratio: 0.85,
            branch_spacing_factor: 1.5,
            bushy_spacing_factor: 1.3,
            complex_branch_factor: 1.3,
            tree_factor: 1.25,
            bushy_tree_ease: 0.9,
            min_dimension: 640.0,
            max_dimension: 12800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Share of the natural-axis delta covered by the first leg of an L-path.
    pub step_ratio: f32,
    pub clip_to_nodes: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            step_ratio: 0.7,
            clip_to_nodes: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub margin_x: f32,
    pub margin_y: f32,
    pub text: TextMetricsConfig,
    pub grid: GridConfig,
    pub free: FreeLayoutConfig,
    pub routing: RoutingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_x: 64.0,
            margin_y: 48.0,
            text: TextMetricsConfig::default(),
            grid: GridConfig::default(),
            free: FreeLayoutConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster scale applied on PNG export.
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    border_color: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    start_color: Option<String>,
    process_color: Option<String>,
    decision_color: Option<String>,
    end_color: Option<String>,
    default_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    margin_x: Option<f32>,
    margin_y: Option<f32>,
    horizontal_spacing: Option<f32>,
    vertical_spacing: Option<f32>,
    max_per_line: Option<usize>,
    level_gap: Option<f32>,
    sibling_gap: Option<f32>,
    max_dimension: Option<f32>,
    max_label_lines: Option<usize>,
    step_ratio: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON (or JSON5) config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown theme: {theme_name}"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.border_color {
            config.theme.border_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.start_color {
            config.theme.node_fills.start = v;
        }
        if let Some(v) = vars.process_color {
            config.theme.node_fills.process = v;
        }
        if let Some(v) = vars.decision_color {
            config.theme.node_fills.decision = v;
        }
        if let Some(v) = vars.end_color {
            config.theme.node_fills.end = v;
        }
        if let Some(v) = vars.default_color {
            config.theme.node_fills.default = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.margin_x {
            config.layout.margin_x = v.max(0.0);
        }
        if let Some(v) = layout.margin_y {
            config.layout.margin_y = v.max(0.0);
        }
        if let Some(v) = layout.horizontal_spacing {
            config.layout.grid.horizontal_spacing = v.max(0.0);
        }
        if let Some(v) = layout.vertical_spacing {
            config.layout.grid.vertical_spacing = v.max(0.0);
        }
        if let Some(v) = layout.max_per_line {
            config.layout.grid.max_per_line = v.max(1);
        }
        if let Some(v) = layout.level_gap {
            config.layout.free.level_gap = v.max(0.0);
        }
        if let Some(v) = layout.sibling_gap {
            config.layout.free.sibling_gap = v.max(0.0);
        }
        if let Some(v) = layout.max_dimension {
            config.layout.free.max_dimension = v.max(config.layout.free.min_dimension);
        }
        if let Some(v) = layout.max_label_lines {
            config.layout.text.max_label_lines = v.max(1);
        }
        if let Some(v) = layout.step_ratio {
            config.layout.routing.step_ratio = v.clamp(0.0, 1.0);
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.scale {
            config.render.scale = v.max(0.1);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.grid.max_per_line, 6);
        assert_eq!(config.theme.node_fills.start, "#4CAF50");
    }

    #[test]
    fn parses_theme_and_overrides() {
        let config = parse_config(
            r##"{
                // comments are fine
                theme: "classic",
                themeVariables: { lineColor: "#000000", decisionColor: "#123456" },
                layout: { marginX: 10, maxPerLine: 3, stepRatio: 2.0 },
                render: { scale: 2 },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.line_color, "#000000");
        assert_eq!(config.theme.node_fills.decision, "#123456");
        assert_eq!(config.theme.node_fills.start, "#90EE90");
        assert_eq!(config.layout.margin_x, 10.0);
        assert_eq!(config.layout.grid.max_per_line, 3);
        assert_eq!(config.layout.routing.step_ratio, 1.0);
        assert_eq!(config.render.scale, 2.0);
    }

    #[test]
    fn background_override_lives_on_theme() {
        let config = parse_config(r##"{ themeVariables: { background: "#101010" } }"##).unwrap();
        assert_eq!(config.theme.background, "#101010");
        assert_eq!(config.render.scale, 1.0);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
    }
}
