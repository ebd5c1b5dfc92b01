use crate::ir::{Edge, Graph, NodeKind, Orientation};
use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:flowchart|graph)(?:\s+(\w+))?\s*;?$").unwrap());
static DIRECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^direction\s+(\w+)$").unwrap());
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s*(.+)$").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+]\s+(.+)$").unwrap());
static PIPE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<left>.+?)\s*(?P<arrow>-{2,}>|={2,}>|-\.+->|-{3,}|={3,})\s*\|(?P<label>[^|]+)\|\s*(?P<right>.+)$",
    )
    .unwrap()
});
static LABEL_ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<left>.+?)\s*(?:--|==|-\.)\s+(?P<label>[^<>=|\-][^<>=|]*?)\s+(?:-{2,}>|={2,}>|\.->)\s*(?P<right>.+)$",
    )
    .unwrap()
});
static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<left>.+?)\s*(?P<arrow>-{2,}>|={2,}>|-\.+->|-{3,}|={3,})\s*(?P<right>.+)$")
        .unwrap()
});
static ARROW_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}>|={2,}>|-\.+->|-{3,}|={3,}").unwrap());

const START_WORDS: &[&str] = &["start", "begin"];
const END_WORDS: &[&str] = &["end", "finish", "complete"];
const DECISION_WORDS: &[&str] = &["if", "decide", "decision", "choice"];
const START_CJK: &[&str] = &["开始", "启动"];
const END_CJK: &[&str] = &["结束", "完成"];
const DECISION_CJK: &[&str] = &["判断", "选择", "决策", "是否"];

/// Input notation accepted by [`parse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Auto,
    Outline,
    Arrows,
}

impl InputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Outline => "outline",
            Self::Arrows => "arrows",
        }
    }
}

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub graph: Graph,
    /// Orientation named by a `graph TD` / `flowchart LR` header.
    pub orientation: Option<Orientation>,
    /// Notation actually parsed; never `Auto`.
    pub format: InputFormat,
}

pub fn parse(input: &str, format: InputFormat) -> Result<ParseOutput> {
    match format {
        InputFormat::Auto => parse_auto(input),
        InputFormat::Outline => parse_outline(input),
        InputFormat::Arrows => parse_arrows(input),
    }
}

/// Picks arrow notation when the text has a flowchart header or an arrow
/// outside brackets, outline otherwise.
pub fn parse_auto(input: &str) -> Result<ParseOutput> {
    if looks_like_arrows(input) {
        parse_arrows(input)
    } else {
        parse_outline(input)
    }
}

fn looks_like_arrows(input: &str) -> bool {
    input.lines().map(strip_trailing_comment).any(|line| {
        HEADER_RE.is_match(&line) || ARROW_TOKEN_RE.is_match(&mask_bracket_content(&line))
    })
}

/// Numbered (`1.`, `2)`) and bulleted (`-`, `*`, `+`) items become a
/// chain of nodes in reading order. Headings and other lines are skipped.
pub fn parse_outline(input: &str) -> Result<ParseOutput> {
    let mut graph = Graph::new();
    let mut prev: Option<String> = None;

    for raw_line in input.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let content = NUMBERED_RE
            .captures(line)
            .or_else(|| BULLET_RE.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim());
        let Some(content) = content.filter(|c| !c.is_empty()) else {
            continue;
        };

        let id = format!("node_{}", graph.nodes.len());
        graph.ensure_node(
            &id,
            Some(content.to_string()),
            Some(infer_kind(content)),
        );
        if let Some(prev) = prev.take() {
            graph.push_edge(Edge::new(prev, id.clone()));
        }
        prev = Some(id);
    }

    if graph.nodes.is_empty() {
        bail!("no outline items found (expected numbered or bulleted lines)");
    }
    Ok(ParseOutput {
        graph,
        orientation: None,
        format: InputFormat::Outline,
    })
}

/// Mermaid-style arrow notation: `A[Label] --> B{Choice}`, chains,
/// `-->|label|` and `-- label -->` edge labels, `&` fan-out.
pub fn parse_arrows(input: &str) -> Result<ParseOutput> {
    let mut graph = Graph::new();
    let mut orientation = None;

    for raw_line in input.lines() {
        let stripped = strip_trailing_comment(raw_line);
        for line in split_statements(&stripped) {
            if line.is_empty() {
                continue;
            }
            if let Some(caps) = HEADER_RE.captures(line) {
                if let Some(dir) = caps.get(1).and_then(|m| Orientation::from_token(m.as_str())) {
                    orientation = Some(dir);
                }
                continue;
            }
            if let Some(dir) = DIRECTION_RE
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| Orientation::from_token(m.as_str()))
            {
                orientation = Some(dir);
                continue;
            }

            if let Some(statements) = split_edge_chain(line) {
                let mut added = false;
                for statement in statements {
                    added |= add_edge_statement(&statement, &mut graph);
                }
                if added {
                    continue;
                }
            }
            if add_edge_statement(line, &mut graph) {
                continue;
            }
            if let Some((id, label, kind)) = parse_node_token(line) {
                graph.ensure_node(&id, label, kind);
            }
        }
    }

    if graph.nodes.is_empty() {
        bail!("no nodes found in arrow notation");
    }
    Ok(ParseOutput {
        graph,
        orientation,
        format: InputFormat::Arrows,
    })
}

/// Kind from keywords: whole Latin words, CJK substrings.
pub fn infer_kind(label: &str) -> NodeKind {
    let lower = label.to_lowercase();
    let words: Vec<&str> = lower
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    let has_word = |list: &[&str]| words.iter().any(|word| list.contains(word));
    let has_cjk = |list: &[&str]| list.iter().any(|needle| lower.contains(needle));

    if has_word(START_WORDS) || has_cjk(START_CJK) {
        NodeKind::Start
    } else if has_word(END_WORDS) || has_cjk(END_CJK) {
        NodeKind::End
    } else if lower.contains('?')
        || lower.contains('？')
        || has_word(DECISION_WORDS)
        || has_cjk(DECISION_CJK)
    {
        NodeKind::Decision
    } else {
        NodeKind::Default
    }
}

fn add_edge_statement(line: &str, graph: &mut Graph) -> bool {
    let Some((left, label, right)) = parse_edge_line(line) else {
        return false;
    };

    let mut source_ids = Vec::new();
    for token in left.split('&').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((id, node_label, kind)) = parse_node_token(token) {
            graph.ensure_node(&id, node_label, kind);
            source_ids.push(id);
        }
    }
    let mut target_ids = Vec::new();
    for token in right.split('&').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((id, node_label, kind)) = parse_node_token(token) {
            graph.ensure_node(&id, node_label, kind);
            target_ids.push(id);
        }
    }
    if source_ids.is_empty() || target_ids.is_empty() {
        return false;
    }

    for from in &source_ids {
        for to in &target_ids {
            let edge = match &label {
                Some(text) => Edge::labeled(from.clone(), to.clone(), text.clone()),
                None => Edge::new(from.clone(), to.clone()),
            };
            graph.push_edge(edge);
        }
    }
    true
}

fn parse_edge_line(line: &str) -> Option<(String, Option<String>, String)> {
    // Dashes inside brackets (A[wi-fi]) must not count as arrows.
    let masked = mask_bracket_content(line);
    let extract = |m: regex::Match| -> &str { line[m.start()..m.end()].trim() };

    if let Some(caps) = PIPE_LABEL_RE.captures(&masked) {
        let left = extract(caps.name("left")?);
        let right = extract(caps.name("right")?);
        let label = strip_quotes(extract(caps.name("label")?));
        if !left.is_empty() && !right.is_empty() {
            return Some((left.to_string(), Some(label), right.to_string()));
        }
    }

    if let Some(caps) = LABEL_ARROW_RE.captures(&masked) {
        let left = extract(caps.name("left")?);
        let right = extract(caps.name("right")?);
        let label = strip_quotes(extract(caps.name("label")?));
        if !left.is_empty() && !right.is_empty() && !label.is_empty() {
            return Some((left.to_string(), Some(label), right.to_string()));
        }
    }

    let caps = ARROW_RE.captures(&masked)?;
    let left = extract(caps.name("left")?);
    let right = extract(caps.name("right")?);
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.to_string(), None, right.to_string()))
}

/// Splits `A --> B --> C` into one statement per arrow, carrying pipe
/// labels along with their arrow.
fn split_edge_chain(line: &str) -> Option<Vec<String>> {
    let masked = mask_bracket_content(line);
    if LABEL_ARROW_RE.is_match(&masked) {
        return None;
    }

    let matches: Vec<regex::Match> = ARROW_TOKEN_RE.find_iter(&masked).collect();
    if matches.len() < 2 {
        return None;
    }

    let mut nodes: Vec<String> = Vec::with_capacity(matches.len() + 1);
    let mut arrows: Vec<String> = Vec::with_capacity(matches.len());
    let mut last_idx = 0usize;
    for m in matches {
        nodes.push(line[last_idx..m.start()].trim().to_string());
        arrows.push(line[m.start()..m.end()].trim().to_string());
        last_idx = m.end();
    }
    nodes.push(line[last_idx..].trim().to_string());

    for i in 1..nodes.len() {
        let trimmed = nodes[i].trim_start();
        if let Some(stripped) = trimmed.strip_prefix('|')
            && let Some(end_idx) = stripped.find('|')
        {
            let label_len = end_idx + 2;
            let label = &trimmed[..label_len];
            let rest = trimmed[label_len..].trim_start();
            arrows[i - 1].push_str(label);
            nodes[i] = rest.to_string();
        }
    }

    if nodes.iter().any(|node| node.is_empty()) {
        return None;
    }

    Some(
        arrows
            .iter()
            .enumerate()
            .map(|(i, arrow)| format!("{} {} {}", nodes[i], arrow, nodes[i + 1]))
            .collect(),
    )
}

/// `id`, `id[label]`, `id{label}`, `id(label)` and the doubled forms
/// `id((label))`, `id([label])`, `id{{label}}`.
fn parse_node_token(token: &str) -> Option<(String, Option<String>, Option<NodeKind>)> {
    let trimmed = token.trim();
    let Some(open_idx) = trimmed.find(['[', '{', '(']) else {
        let id = trimmed.split_whitespace().next()?;
        return Some((id.to_string(), None, None));
    };
    let id = trimmed[..open_idx].trim();
    if id.is_empty() {
        return None;
    }
    let shape = &trimmed[open_idx..];
    let open = shape.chars().next()?;
    let close = match open {
        '[' => ']',
        '{' => '}',
        _ => ')',
    };
    if !shape.ends_with(close) {
        return Some((id.to_string(), None, None));
    }

    let inner = shape
        .trim_start_matches(['[', '{', '('])
        .trim_end_matches([']', '}', ')'])
        .trim();
    let label = strip_quotes(inner);
    let keyword_kind = infer_kind(&label);
    let kind = match open {
        '{' => NodeKind::Decision,
        '(' => match keyword_kind {
            NodeKind::End => NodeKind::End,
            _ => NodeKind::Start,
        },
        _ => match keyword_kind {
            NodeKind::Start | NodeKind::End => keyword_kind,
            _ => NodeKind::Process,
        },
    };
    Some((id.to_string(), Some(label), Some(kind)))
}

fn strip_quotes(input: &str) -> String {
    let trimmed = input.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

fn strip_trailing_comment(line: &str) -> String {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if ch == '"' {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        if ch == '%'
            && let Some('%') = chars.peek().copied()
        {
            break;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Replaces bracketed and quoted text with spaces, keeping byte offsets.
/// Splits on `;` outside brackets and quotes.
fn split_statements(line: &str) -> Vec<&str> {
    let masked = mask_bracket_content(line);
    let mut statements = Vec::new();
    let mut start = 0usize;
    for (idx, _) in masked.match_indices(';') {
        statements.push(line[start..idx].trim());
        start = idx + 1;
    }
    statements.push(line[start..].trim());
    statements
}

fn mask_bracket_content(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut depth = 0usize;
    let mut in_quote = false;
    for ch in line.chars() {
        let masked = match ch {
            '"' => {
                in_quote = !in_quote;
                depth > 0
            }
            '[' | '{' | '(' if !in_quote => {
                depth += 1;
                depth > 1
            }
            ']' | '}' | ')' if !in_quote && depth > 0 => {
                depth -= 1;
                depth > 0
            }
            _ => depth > 0 || in_quote,
        };
        if masked {
            for _ in 0..ch.len_utf8() {
                result.push(' ');
            }
        } else {
            result.push(ch);
        }
    }
    result
}
