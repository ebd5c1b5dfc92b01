use serde::Serialize;

use crate::config::GridConfig;
use crate::text_metrics::Script;

use super::structure::StructureAnalysis;
use super::text::{TextAnalysis, TextComplexity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStrategy {
    /// Short, simple chains: tight grid.
    CompactGrid,
    /// Chains with complex or long labels: fewer cells per line, more air.
    AdaptiveGrid,
    /// Chains that merge without branching.
    BranchAwareGrid,
    /// Depth-level placement for branching graphs.
    FreeLayout,
    /// Chains of mostly Latin labels.
    EnglishOptimized,
}

impl LayoutStrategy {
    pub fn is_grid(self) -> bool {
        !matches!(self, Self::FreeLayout)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompactGrid => "compact-grid",
            Self::AdaptiveGrid => "adaptive-grid",
            Self::BranchAwareGrid => "branch-aware-grid",
            Self::FreeLayout => "free-layout",
            Self::EnglishOptimized => "english-optimized",
        }
    }

    /// Grid tuning for this strategy. Meaningless for `FreeLayout`.
    pub fn grid_params(self, text: &TextAnalysis, config: &GridConfig) -> GridParams {
        let mut per_line_cap = config.max_per_line.max(1);
        let mut horizontal_spacing = config.horizontal_spacing;
        let mut vertical_spacing = config.vertical_spacing;

        if text.is_dense() {
            per_line_cap = per_line_cap.saturating_sub(1).max(1);
        }
        if text.text_complexity == TextComplexity::Complex {
            horizontal_spacing *= 1.3;
            vertical_spacing *= 1.2;
        } else if text.has_long_text {
            horizontal_spacing *= 1.2;
            vertical_spacing *= 1.1;
        }
        if text.is_primarily_english {
            horizontal_spacing *= config.latin_spacing_scale;
            vertical_spacing *= config.latin_spacing_scale;
        }

        match self {
            Self::CompactGrid => {
                horizontal_spacing *= 0.75;
                vertical_spacing *= 0.75;
            }
            Self::BranchAwareGrid => {
                per_line_cap = per_line_cap.saturating_sub(1).max(1);
                horizontal_spacing *= 1.2;
                vertical_spacing *= 1.2;
            }
            Self::AdaptiveGrid | Self::EnglishOptimized | Self::FreeLayout => {}
        }

        GridParams {
            per_line_cap,
            max_lines: config.max_lines.max(1),
            horizontal_spacing,
            vertical_spacing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridParams {
    pub per_line_cap: usize,
    pub max_lines: usize,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
}

/// Which strategy was picked and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutDecision {
    pub strategy: LayoutStrategy,
    pub reason: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub script: Script,
    pub complexity: TextComplexity,
    pub has_branches: bool,
    pub has_merges: bool,
}

pub fn select_strategy(
    structure: &StructureAnalysis,
    text: &TextAnalysis,
    node_count: usize,
    edge_count: usize,
) -> LayoutDecision {
    let (strategy, reason) = if structure.has_branches {
        (
            LayoutStrategy::FreeLayout,
            format!(
                "{} branch node(s), max out-degree {}",
                structure.branch_nodes.len(),
                structure.max_branches
            ),
        )
    } else if structure.has_merges() {
        (
            LayoutStrategy::BranchAwareGrid,
            format!("{} merge node(s) without branching", structure.merge_nodes.len()),
        )
    } else if text.is_primarily_english {
        (
            LayoutStrategy::EnglishOptimized,
            "linear chain of mostly Latin labels".to_string(),
        )
    } else if text.is_dense() || text.text_complexity != TextComplexity::Simple {
        (
            LayoutStrategy::AdaptiveGrid,
            format!("linear chain with {:?} text", text.text_complexity).to_lowercase(),
        )
    } else {
        (
            LayoutStrategy::CompactGrid,
            "short linear chain with simple labels".to_string(),
        )
    };

    LayoutDecision {
        strategy,
        reason,
        node_count,
        edge_count,
        script: text.script(),
        complexity: text.text_complexity,
        has_branches: structure.has_branches,
        has_merges: structure.has_merges(),
    }
}
