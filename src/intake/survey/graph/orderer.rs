// SPDX-License-Identifier: MIT

//! Linear reading order for a branching survey graph
//!
//! Depth-first from the start node, always descending into the branch with
//! the longest downstream chain first so that each branch reads as one
//! contiguous block. Nodes not reachable from the start are appended in
//! authored order.

use std::collections::{HashMap, HashSet};

use crate::intake::survey::types::QuestionNode;

type Index<'a> = HashMap<&'a str, &'a QuestionNode>;

/// Order every node of the graph for display, starting at `start_id`
pub fn order(nodes: &[QuestionNode], start_id: &str) -> Vec<String> {
    let index: Index<'_> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut depths: HashMap<&str, usize> = HashMap::with_capacity(index.len());
    let mut visited: HashSet<&str> = HashSet::with_capacity(index.len());
    let mut ordered: Vec<String> = Vec::with_capacity(index.len());

    match index.get_key_value(start_id) {
        Some((&start, _)) => {
            // Depths are measured from the start only
            depth(start, &index, &mut depths);
            visit(start, &index, &mut depths, &mut visited, &mut ordered);
        }
        None => log::warn!(
            "Start node '{}' not in graph, falling back to authored order",
            start_id
        ),
    }

    for node in nodes {
        if visited.insert(&node.id) {
            ordered.push(node.id.clone());
        }
    }

    ordered
}

/// Depth of `id` measured with `id` itself as the root of the walk
fn depth<'a>(id: &'a str, index: &Index<'a>, depths: &mut HashMap<&'a str, usize>) -> usize {
    depth_of(id, index, depths, &mut Vec::new()).0
}

/// Longest number of hops from `id` to a node without outgoing edges.
///
/// A node already on the exploration path counts as depth 0, which is what
/// bounds the recursion on cyclic graphs. Also returns the shallowest path
/// position the walk was cut at. A depth cut at a node above `id` depends on
/// how `id` was reached and is not memoised.
fn depth_of<'a>(
    id: &'a str,
    index: &Index<'a>,
    depths: &mut HashMap<&'a str, usize>,
    path: &mut Vec<&'a str>,
) -> (usize, usize) {
    if let Some(position) = path.iter().position(|p| *p == id) {
        return (0, position);
    }
    if let Some(depth) = depths.get(id) {
        return (*depth, usize::MAX);
    }
    let Some(node) = index.get(id).copied() else {
        return (0, usize::MAX);
    };

    let own = path.len();
    path.push(id);
    let mut depth = 0;
    let mut cut = usize::MAX;
    for target in node.targets() {
        if !index.contains_key(target) {
            continue;
        }
        let (target_depth, target_cut) = depth_of(target, index, depths, path);
        depth = depth.max(target_depth + 1);
        cut = cut.min(target_cut);
    }
    path.pop();

    if cut >= own {
        depths.insert(id, depth);
    }
    (depth, cut)
}

fn visit<'a>(
    id: &'a str,
    index: &Index<'a>,
    depths: &mut HashMap<&'a str, usize>,
    visited: &mut HashSet<&'a str>,
    ordered: &mut Vec<String>,
) {
    if !visited.insert(id) {
        return;
    }
    ordered.push(id.to_string());

    let Some(node) = index.get(id).copied() else {
        return;
    };

    let mut targets: Vec<(&'a str, usize)> = node
        .targets()
        .into_iter()
        .filter(|target| index.contains_key(target))
        .map(|target| (target, depth(target, index, depths)))
        .collect();
    // Stable: equal depths keep authored order
    targets.sort_by_key(|(_, d)| std::cmp::Reverse(*d));

    for (target, _) in targets {
        visit(target, index, depths, visited, ordered);
    }
}
