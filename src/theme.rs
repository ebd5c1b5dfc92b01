use crate::ir::NodeKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFills {
    pub start: String,
    pub process: String,
    pub decision: String,
    pub end: String,
    pub default: String,
}

impl NodeFills {
    pub fn get(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Start => &self.start,
            NodeKind::Process => &self.process,
            NodeKind::Decision => &self.decision,
            NodeKind::End => &self.end,
            NodeKind::Default => &self.default,
        }
    }
}

/// Keywords matched case-insensitively as substrings of an edge label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelKeywordColor {
    pub keywords: Vec<String>,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub border_color: String,
    pub border_width: f32,
    pub node_fills: NodeFills,
    pub line_color: String,
    pub line_width: f32,
    pub edge_label_text_color: String,
    pub label_keywords: Vec<LabelKeywordColor>,
}

fn default_label_keywords(affirmative: &str, negative: &str) -> Vec<LabelKeywordColor> {
    let negative_words = [
        "no", "reject", "fail", "error", "invalid", "false", "deny", "否", "拒绝", "失败",
    ];
    let affirmative_words = [
        "yes", "approve", "pass", "success", "ok", "valid", "true", "accept", "是", "通过", "成功",
    ];
    vec![
        LabelKeywordColor {
            keywords: negative_words.iter().map(|w| w.to_string()).collect(),
            color: negative.to_string(),
        },
        LabelKeywordColor {
            keywords: affirmative_words.iter().map(|w| w.to_string()).collect(),
            color: affirmative.to_string(),
        },
    ]
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            text_color: "#FFFFFF".to_string(),
            border_color: "#FFFFFF".to_string(),
            border_width: 2.0,
            node_fills: NodeFills {
                start: "#4CAF50".to_string(),
                process: "#2196F3".to_string(),
                decision: "#FF9800".to_string(),
                end: "#F44336".to_string(),
                default: "#9C27B0".to_string(),
            },
            line_color: "#424242".to_string(),
            line_width: 2.0,
            edge_label_text_color: "#FFFFFF".to_string(),
            label_keywords: default_label_keywords("#2E7D32", "#C62828"),
        }
    }

    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1C2430".to_string(),
            border_color: "#333333".to_string(),
            border_width: 1.5,
            node_fills: NodeFills {
                start: "#90EE90".to_string(),
                process: "#87CEEB".to_string(),
                decision: "#FFB6C1".to_string(),
                end: "#FFA07A".to_string(),
                default: "#E6E6FA".to_string(),
            },
            line_color: "#333333".to_string(),
            line_width: 1.5,
            edge_label_text_color: "#FFFFFF".to_string(),
            label_keywords: default_label_keywords("#388E3C", "#D32F2F"),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "light" => Some(Self::classic()),
            _ => None,
        }
    }

    pub fn fill_for(&self, kind: NodeKind) -> &str {
        self.node_fills.get(kind)
    }

    /// Color of the keyword that occurs earliest in `label`. A longer
    /// keyword wins at the same position, so "invalid" beats "valid".
    pub fn keyword_color(&self, label: &str) -> Option<&str> {
        let lowered = label.to_lowercase();
        let mut best: Option<(usize, usize, &str)> = None;
        for entry in &self.label_keywords {
            for word in &entry.keywords {
                let word = word.to_lowercase();
                if word.is_empty() {
                    continue;
                }
                let Some(pos) = lowered.find(&word) else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((best_pos, best_len, _)) => {
                        pos < best_pos || (pos == best_pos && word.len() > best_len)
                    }
                };
                if better {
                    best = Some((pos, word.len(), entry.color.as_str()));
                }
            }
        }
        best.map(|(_, _, color)| color)
    }

    /// Color for a connector label, falling back to the neutral line color.
    pub fn label_color(&self, label: &str) -> &str {
        self.keyword_color(label).unwrap_or(self.line_color.as_str())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_keyword_wins_over_affirmative_substring() {
        let theme = Theme::modern();
        assert_eq!(theme.label_color("Invalid"), "#C62828");
        assert_eq!(theme.label_color("Valid"), "#2E7D32");
    }

    #[test]
    fn earliest_keyword_decides() {
        let theme = Theme::modern();
        assert_eq!(theme.label_color("Yes, notify customer"), "#2E7D32");
        assert_eq!(theme.label_color("Approved normally"), "#2E7D32");
        assert_eq!(theme.label_color("Pass to next node"), "#2E7D32");
        assert_eq!(theme.label_color("No, retry later"), "#C62828");
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let theme = Theme::modern();
        assert_eq!(theme.label_color("YES"), "#2E7D32");
        assert_eq!(theme.label_color("Approved"), "#2E7D32");
        assert_eq!(theme.label_color("Rejected"), "#C62828");
    }

    #[test]
    fn unmatched_label_uses_line_color() {
        let theme = Theme::classic();
        assert_eq!(theme.label_color("maybe later"), theme.line_color);
    }

    #[test]
    fn cjk_keywords_match() {
        let theme = Theme::modern();
        assert_eq!(theme.label_color("是"), "#2E7D32");
        assert_eq!(theme.label_color("否"), "#C62828");
    }
}
