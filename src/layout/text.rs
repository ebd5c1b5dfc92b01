use serde::Serialize;

use crate::config::TextMetricsConfig;
use crate::ir::{Node, NodeKind};
use crate::text_metrics::{self, LengthTier, Script};

use super::{SizedNode, TextBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextComplexity {
    Simple,
    Medium,
    Complex,
}

/// How evenly label lengths are spread across the node set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthDistribution {
    Uniform,
    Balanced,
    Skewed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextAnalysis {
    pub avg_len: f32,
    pub min_len: usize,
    pub max_len: usize,
    pub variance: f32,
    pub max_word_len: usize,
    pub long_text_nodes: usize,
    pub text_complexity: TextComplexity,
    pub has_long_text: bool,
    pub is_primarily_english: bool,
    pub distribution: LengthDistribution,
}

impl TextAnalysis {
    pub fn script(&self) -> Script {
        if self.is_primarily_english {
            Script::Latin
        } else {
            Script::Cjk
        }
    }

    /// Complex or long text needs roomier grids.
    pub fn is_dense(&self) -> bool {
        self.text_complexity == TextComplexity::Complex || self.has_long_text
    }
}

fn complexity_for(avg_len: f32, max_word_len: usize) -> TextComplexity {
    if avg_len <= 15.0 && max_word_len <= 8 {
        TextComplexity::Simple
    } else if avg_len <= 30.0 && max_word_len <= 15 {
        TextComplexity::Medium
    } else {
        TextComplexity::Complex
    }
}

fn distribution_for(avg_len: f32, variance: f32) -> LengthDistribution {
    if avg_len <= 0.0 {
        return LengthDistribution::Uniform;
    }
    let cv = variance.sqrt() / avg_len;
    if cv < 0.25 {
        LengthDistribution::Uniform
    } else if cv < 0.6 {
        LengthDistribution::Balanced
    } else {
        LengthDistribution::Skewed
    }
}

pub fn analyze_text(nodes: &[Node], config: &TextMetricsConfig) -> TextAnalysis {
    let lengths: Vec<usize> = nodes.iter().map(|n| n.label.chars().count()).collect();
    let count = lengths.len().max(1) as f32;
    let avg_len = lengths.iter().sum::<usize>() as f32 / count;
    let variance = lengths
        .iter()
        .map(|len| {
            let diff = *len as f32 - avg_len;
            diff * diff
        })
        .sum::<f32>()
        / count;
    let max_word_len = nodes
        .iter()
        .flat_map(|n| n.label.split_whitespace())
        .map(|word| word.chars().count())
        .max()
        .unwrap_or(0);
    let long_text_nodes = lengths
        .iter()
        .filter(|len| **len > config.long_text_threshold)
        .count();
    let latin_nodes = nodes
        .iter()
        .filter(|n| text_metrics::classify_script(&n.label) == Script::Latin)
        .count();

    TextAnalysis {
        avg_len,
        min_len: lengths.iter().copied().min().unwrap_or(0),
        max_len: lengths.iter().copied().max().unwrap_or(0),
        variance,
        max_word_len,
        long_text_nodes,
        text_complexity: complexity_for(avg_len, max_word_len),
        has_long_text: long_text_nodes > 0,
        is_primarily_english: latin_nodes * 2 > nodes.len(),
        distribution: distribution_for(avg_len, variance),
    }
}

/// Measures one node: tiered box, wrapped label, shape scaling.
pub fn size_node(node: &Node, config: &TextMetricsConfig) -> SizedNode {
    let script = text_metrics::classify_script(&node.label);
    let (base_w, base_h) = text_metrics::base_box(script, config);
    let tier = LengthTier::for_len(node.label.chars().count());
    let (fw, fh) = tier.factors();
    let scale = if node.kind == NodeKind::Decision {
        config.decision_scale
    } else {
        1.0
    };
    let width = base_w * fw * scale;

    let label = if node.label.trim().is_empty() {
        TextBlock::default()
    } else {
        text_metrics::wrap(&node.label, width, config)
    };
    let text_height = if label.is_empty() {
        0.0
    } else {
        label.height + config.label_padding_y * 2.0
    };
    let height = (base_h * fh * scale).max(text_height);

    SizedNode {
        id: node.id.clone(),
        kind: node.kind,
        width,
        height,
        label,
    }
}
