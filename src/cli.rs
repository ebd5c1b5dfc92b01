use crate::config::{Config, load_config};
use crate::ir::Orientation;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::{InputFormat, parse};
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::theme::Theme;
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "flowmap",
    version,
    about = "Render outlines and arrow notation as flowcharts"
)]
pub struct Args {
    /// Input file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). SVG goes to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Input notation
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    pub format: FormatArg,

    /// Flow direction. Defaults to the input header, then left-right.
    #[arg(short = 'l', long = "layout", value_enum)]
    pub layout: Option<LayoutArg>,

    /// Built-in theme (modern, classic)
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Config JSON/JSON5 file (theme, themeVariables, layout, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// More log output (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    Auto,
    Outline,
    #[value(alias = "mermaid")]
    Arrows,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Auto => InputFormat::Auto,
            FormatArg::Outline => InputFormat::Outline,
            FormatArg::Arrows => InputFormat::Arrows,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LayoutArg {
    #[value(alias = "lr")]
    LeftRight,
    #[value(aliases = ["tb", "td"])]
    TopBottom,
}

impl From<LayoutArg> for Orientation {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::LeftRight => Orientation::LeftRight,
            LayoutArg::TopBottom => Orientation::TopBottom,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = resolve_config(args.config.as_deref(), args.theme.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let (source, format) = match extract_fenced_block(&input) {
        Some(block) => (block, InputFormat::Arrows),
        None => (input, args.format.into()),
    };

    let parsed = parse(&source, format)?;
    let orientation = args
        .layout
        .map(Orientation::from)
        .or(parsed.orientation)
        .unwrap_or_default();
    let layout = compute_layout(&parsed.graph, orientation, &config.theme, &config.layout)?;
    tracing::info!(
        strategy = layout.decision.strategy.as_str(),
        width = layout.width,
        height = layout.height,
        "layout computed"
    );

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)?;
    }

    let svg = render_svg(&layout, &config.theme);
    let written = match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
            args.output.clone()
        }
        OutputFormat::Png => {
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| default_png_name(parsed.format, orientation));
            write_output_png(&svg, &output, &config.render, &config.theme)?;
            Some(output)
        }
    };

    eprintln!(
        "{} nodes, {} connections, {} layout{}",
        parsed.graph.nodes.len(),
        layout.edges.len(),
        layout.decision.strategy.as_str(),
        written
            .map(|path| format!(" -> {}", path.display()))
            .unwrap_or_default()
    );
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("flowmap={level}")));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn resolve_config(path: Option<&Path>, theme: Option<&str>) -> Result<Config> {
    let mut config = load_config(path)?;
    if let Some(name) = theme {
        config.theme =
            Theme::by_name(name).ok_or_else(|| anyhow::anyhow!("Unknown theme: {name}"))?;
    }
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn default_png_name(format: InputFormat, orientation: Orientation) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!(
        "flowchart_{}_{}_{stamp}.png",
        format.as_str(),
        orientation.suffix()
    ))
}

/// Body of the first ```mermaid fence, if the input has one.
fn extract_fenced_block(input: &str) -> Option<String> {
    let mut lines = input.lines();
    let fence = lines.by_ref().find_map(|line| detect_mermaid_fence(line.trim()))?;
    let body: Vec<&str> = lines
        .take_while(|line| !is_fence_end(line.trim(), fence))
        .collect();
    Some(body.join("\n"))
}

fn detect_mermaid_fence(line: &str) -> Option<&'static str> {
    for fence in ["```", "~~~"] {
        if let Some(rest) = line.strip_prefix(fence) {
            let rest = rest.trim_start_matches(&fence[..1]).trim();
            if rest.starts_with("mermaid") {
                return Some(fence);
            }
        }
    }
    None
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    if !line.starts_with(fence) {
        return false;
    }
    line[fence.len()..].trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_mermaid_block() {
        let input = r#"
# Notes
1. not this
``` mermaid
flowchart LR
  A --> B
```
~~~mermaid
flowchart TD
  X --> Y
~~~
"#;
        let block = extract_fenced_block(input).unwrap();
        assert!(block.contains("flowchart LR"));
        assert!(!block.contains("X --> Y"));
        assert!(extract_fenced_block("1. plain outline").is_none());
    }

    #[test]
    fn png_name_carries_format_and_direction() {
        let name = default_png_name(InputFormat::Outline, Orientation::TopBottom);
        let name = name.to_string_lossy();
        assert!(name.starts_with("flowchart_outline_tb_"));
        assert!(name.ends_with(".png"));
        // flowchart_outline_tb_YYYYmmdd_HHMMSS.png
        assert_eq!(name.len(), "flowchart_outline_tb_".len() + 15 + 4);
    }

    #[test]
    fn theme_flag_overrides_config() {
        let config = resolve_config(None, Some("classic")).unwrap();
        assert_eq!(config.theme.node_fills.start, "#90EE90");
        assert!(resolve_config(None, Some("neon")).is_err());
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "flowmap", "-i", "in.txt", "-l", "tb", "-f", "outline", "-e", "png", "-vv",
        ])
        .unwrap();
        assert!(matches!(args.layout, Some(LayoutArg::TopBottom)));
        assert!(matches!(args.format, FormatArg::Outline));
        assert!(matches!(args.output_format, OutputFormat::Png));
        assert_eq!(args.verbose, 2);
    }
}
