use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::ir::{Edge, Node, NodeKind};

/// Topology summary recomputed on every layout call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StructureAnalysis {
    pub out_degree: BTreeMap<String, usize>,
    pub in_degree: BTreeMap<String, usize>,
    pub branch_nodes: BTreeSet<String>,
    pub decision_nodes: BTreeSet<String>,
    pub merge_nodes: BTreeSet<String>,
    pub max_branches: usize,
    pub total_branches: usize,
    pub has_branches: bool,
    pub has_complex_branches: bool,
}

impl StructureAnalysis {
    pub fn is_branch_or_merge(&self, id: &str) -> bool {
        self.branch_nodes.contains(id) || self.merge_nodes.contains(id)
    }

    pub fn has_merges(&self) -> bool {
        !self.merge_nodes.is_empty()
    }
}

/// Degree maps and branch/merge classification. Edges naming unknown
/// nodes do not count.
pub fn analyze(nodes: &[Node], edges: &[Edge]) -> StructureAnalysis {
    let mut out_degree: BTreeMap<String, usize> = BTreeMap::new();
    let mut in_degree: BTreeMap<String, usize> = BTreeMap::new();
    for node in nodes {
        out_degree.insert(node.id.clone(), 0);
        in_degree.insert(node.id.clone(), 0);
    }

    for edge in edges {
        if !out_degree.contains_key(&edge.from) || !in_degree.contains_key(&edge.to) {
            continue;
        }
        if let Some(count) = out_degree.get_mut(&edge.from) {
            *count += 1;
        }
        if let Some(count) = in_degree.get_mut(&edge.to) {
            *count += 1;
        }
    }

    let kinds: HashMap<&str, NodeKind> = nodes.iter().map(|n| (n.id.as_str(), n.kind)).collect();
    let branch_nodes: BTreeSet<String> = out_degree
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| id.clone())
        .collect();
    let decision_nodes = branch_nodes
        .iter()
        .filter(|id| kinds.get(id.as_str()) == Some(&NodeKind::Decision))
        .cloned()
        .collect();
    let merge_nodes = in_degree
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| id.clone())
        .collect();
    let max_branches = out_degree.values().copied().max().unwrap_or(0);
    let total_branches = out_degree.values().map(|count| count.saturating_sub(1)).sum();
    let has_branches = !branch_nodes.is_empty();

    StructureAnalysis {
        out_degree,
        in_degree,
        branch_nodes,
        decision_nodes,
        merge_nodes,
        max_branches,
        total_branches,
        has_branches,
        has_complex_branches: max_branches > 2 || total_branches > 2,
    }
}

/// Breadth-first levels seeded by every in-degree-0 node.
///
/// A node keeps the depth of the first visit, so in a diamond where one
/// path is longer than the other the merge node sits one level after the
/// shorter path rather than after the longest one. Nodes the traversal
/// never reaches (for example members of a cycle without an entry point)
/// stay at depth 0.
pub fn build_hierarchy(nodes: &[Node], edges: &[Edge]) -> BTreeMap<String, usize> {
    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
    for edge in edges {
        if !known.contains(edge.from.as_str()) || !known.contains(edge.to.as_str()) {
            continue;
        }
        children
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
        if let Some(count) = in_degree.get_mut(edge.to.as_str()) {
            *count += 1;
        }
    }

    let mut depths: BTreeMap<String, usize> = BTreeMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for node in nodes {
        if in_degree.get(node.id.as_str()).copied().unwrap_or(0) == 0
            && !depths.contains_key(&node.id)
        {
            depths.insert(node.id.clone(), 0);
            queue.push_back(node.id.as_str());
        }
    }

    while let Some(current) = queue.pop_front() {
        let depth = depths.get(current).copied().unwrap_or(0);
        let Some(next) = children.get(current) else {
            continue;
        };
        for child in next {
            if depths.contains_key(*child) {
                continue;
            }
            depths.insert((*child).to_string(), depth + 1);
            queue.push_back(*child);
        }
    }

    for node in nodes {
        depths.entry(node.id.clone()).or_insert(0);
    }
    depths
}
