use crate::config::TextMetricsConfig;
use crate::layout::TextBlock;
use serde::Serialize;

/// Latin share above which a label is treated as English text.
const LATIN_RATIO_THRESHOLD: f32 = 0.6;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Cjk,
}

/// Length tier of a label, keyed on character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthTier {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl LengthTier {
    pub fn for_len(chars: usize) -> Self {
        if chars > 40 {
            Self::VeryLong
        } else if chars > 25 {
            Self::Long
        } else if chars > 15 {
            Self::Medium
        } else {
            Self::Short
        }
    }

    /// (width, height) multipliers applied to the base box.
    pub fn factors(self) -> (f32, f32) {
        match self {
            Self::Short => (1.0, 1.0),
            Self::Medium => (1.15, 1.0),
            Self::Long => (1.3, 1.1),
            Self::VeryLong => (1.5, 1.3),
        }
    }
}

/// Fraction of characters that are ASCII letters or whitespace.
pub fn latin_ratio(label: &str) -> f32 {
    let total = label.chars().count();
    if total == 0 {
        return 1.0;
    }
    let latin = label
        .chars()
        .filter(|ch| ch.is_ascii_alphabetic() || ch.is_whitespace())
        .count();
    latin as f32 / total as f32
}

pub fn classify_script(label: &str) -> Script {
    if latin_ratio(label) > LATIN_RATIO_THRESHOLD {
        Script::Latin
    } else {
        Script::Cjk
    }
}

pub fn is_wide_char(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

fn is_break_punct(ch: char) -> bool {
    matches!(
        ch,
        ',' | '.' | ';' | ':' | '!' | '?' | '/' | '，' | '。' | '、' | '；' | '：' | '？' | '！'
    )
}

pub fn split_lines(text: &str) -> Vec<String> {
    let current = text
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("\\n", "\n");
    current
        .split('\n')
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn text_width(line: &str, config: &TextMetricsConfig) -> f32 {
    line.chars()
        .map(|ch| {
            if is_wide_char(ch) {
                config.cjk_char_width
            } else {
                config.latin_char_width
            }
        })
        .sum()
}

pub fn chars_per_line(box_width: f32, script: Script, config: &TextMetricsConfig) -> usize {
    let char_width = match script {
        Script::Latin => config.latin_char_width,
        Script::Cjk => config.cjk_char_width,
    };
    if char_width <= 0.0 || !box_width.is_finite() {
        return 1;
    }
    ((box_width * config.wrap_fill_ratio / char_width).floor() as usize).max(1)
}

/// Tiered node box for a label, before any shape scaling.
pub fn measure(label: &str, config: &TextMetricsConfig) -> (f32, f32) {
    let script = classify_script(label);
    let (base_w, base_h) = base_box(script, config);
    let (fw, fh) = LengthTier::for_len(label.chars().count()).factors();
    (base_w * fw, base_h * fh)
}

pub fn base_box(script: Script, config: &TextMetricsConfig) -> (f32, f32) {
    match script {
        Script::Latin => (config.latin_node_width, config.latin_node_height),
        Script::Cjk => (config.cjk_node_width, config.cjk_node_height),
    }
}

/// Wraps `label` to fit `max_width`, capped at `max_label_lines` lines with
/// a trailing ellipsis when content is cut.
pub fn wrap(label: &str, max_width: f32, config: &TextMetricsConfig) -> TextBlock {
    let script = classify_script(label);
    let budget = chars_per_line(max_width, script, config);
    let mut lines = Vec::new();
    for line in split_lines(label) {
        match script {
            Script::Latin => lines.extend(wrap_latin(&line, budget)),
            Script::Cjk => lines.extend(wrap_cjk(&line, budget)),
        }
    }
    let lines = truncate_lines(lines, config.max_label_lines.max(1), budget);
    let width = lines
        .iter()
        .map(|line| text_width(line, config))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * config.line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}

fn latin_tokens(line: &str) -> Vec<(String, bool)> {
    let mut tokens = Vec::new();
    for word in line.split_whitespace() {
        let mut current = String::new();
        let mut first = true;
        for ch in word.chars() {
            current.push(ch);
            if ch == '-' || is_break_punct(ch) {
                tokens.push((std::mem::take(&mut current), first));
                first = false;
            }
        }
        if !current.is_empty() {
            tokens.push((current, first));
        }
    }
    tokens
}

fn wrap_latin(line: &str, budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for (token, space_before) in latin_tokens(line) {
        let sep = if space_before && !current.is_empty() { " " } else { "" };
        let candidate_len = current.chars().count() + sep.len() + token.chars().count();
        if candidate_len <= budget {
            current.push_str(sep);
            current.push_str(&token);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let chars: Vec<char> = token.chars().collect();
        let mut chunks = chars.chunks(budget).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current = piece;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn wrap_cjk(line: &str, budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<char> = Vec::new();
    for ch in line.chars() {
        if current.len() == budget {
            let split = current
                .iter()
                .rposition(|c| is_break_punct(*c))
                .map(|idx| idx + 1)
                .filter(|end| *end * 2 >= budget && *end < current.len())
                .unwrap_or(current.len());
            let rest = current.split_off(split);
            lines.push(current.iter().collect::<String>().trim().to_string());
            current = rest;
        }
        current.push(ch);
    }
    if !current.is_empty() {
        lines.push(current.iter().collect::<String>().trim().to_string());
    }
    lines.retain(|line| !line.is_empty());
    lines
}

fn truncate_lines(mut lines: Vec<String>, max_lines: usize, budget: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        // A budget of three or less leaves only the ellipsis.
        let keep = budget.saturating_sub(ELLIPSIS.len());
        let mut cut: String = last.chars().take(keep).collect();
        cut.truncate(cut.trim_end().len());
        cut.push_str(ELLIPSIS);
        *last = cut;
    }
    lines
}
