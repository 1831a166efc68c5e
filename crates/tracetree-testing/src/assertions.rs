//! Custom assertions for diffed and projected trees.
//!
//! Provides high-level assertions that make tests more readable:
//! - Node lookup by name anywhere in a tree
//! - Diff classification checks
//! - Filter propagation checks

use anyhow::{Context, Result};
use tracetree_types::{DiffType, HierarchyTreeNode, TreeNode};

/// Find the first node named `name` (pre-order).
pub fn find_by_name<'a, T: TreeNode>(root: &'a T, name: &str) -> Option<&'a T> {
    if root.name() == name {
        return Some(root);
    }
    root.tree_children()
        .iter()
        .find_map(|child| find_by_name(child, name))
}

/// Collect `(name, diff type)` for every node, pre-order.
pub fn collect_diff_types(root: &HierarchyTreeNode) -> Vec<(String, DiffType)> {
    let mut out = Vec::new();
    collect_into(root, &mut out);
    out
}

fn collect_into(node: &HierarchyTreeNode, out: &mut Vec<(String, DiffType)>) {
    out.push((node.name().to_string(), node.diff_type()));
    for child in node.children() {
        collect_into(child, out);
    }
}

/// Assert that the node named `name` exists and carries `expected`.
pub fn assert_diff_type(root: &HierarchyTreeNode, name: &str, expected: DiffType) -> Result<()> {
    let matches: Vec<DiffType> = collect_diff_types(root)
        .into_iter()
        .filter(|(node_name, _)| node_name == name)
        .map(|(_, diff_type)| diff_type)
        .collect();

    if matches.is_empty() {
        anyhow::bail!("Node {} not found in tree", name);
    }
    if matches.len() > 1 {
        anyhow::bail!("Node {} appears {} times: {:?}", name, matches.len(), matches);
    }
    if matches[0] != expected {
        anyhow::bail!("Node {} is {} but expected {}", name, matches[0], expected);
    }
    Ok(())
}

/// Assert that every node on the path from the root to `name` is shown in the filtered view.
pub fn assert_path_shown(root: &HierarchyTreeNode, name: &str) -> Result<()> {
    let path = path_to(root, name).with_context(|| format!("Node {} not found in tree", name))?;
    for node in path {
        if !node.show_in_filtered_view() {
            anyhow::bail!("Node {} on the path to {} is hidden", node.name(), name);
        }
    }
    Ok(())
}

fn path_to<'a>(node: &'a HierarchyTreeNode, name: &str) -> Option<Vec<&'a HierarchyTreeNode>> {
    if node.name() == name {
        return Some(vec![node]);
    }
    node.children().iter().find_map(|child| {
        let mut path = path_to(child, name)?;
        path.insert(0, node);
        Some(path)
    })
}
