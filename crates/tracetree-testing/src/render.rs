//! Deterministic text rendering of display trees.
//!
//! One line per node, two spaces of indent per level, so trees can be
//! compared with inline snapshots.

use std::fmt::Write;

use tracetree_types::{DiffType, HierarchyTreeNode, PropertyTreeNode, TreeNode};

/// Render a hierarchy as `name (DIFF) [CHIPS]`; `NONE` and empty chip sets are omitted
pub fn render_hierarchy(node: &HierarchyTreeNode) -> String {
    let mut out = String::new();
    write_hierarchy(node, 0, &mut out);
    out
}

fn write_hierarchy(node: &HierarchyTreeNode, depth: usize, out: &mut String) {
    let _ = write!(out, "{:indent$}{}", "", node.display_name(), indent = depth * 2);
    if node.diff_type() != DiffType::None {
        let _ = write!(out, " ({})", node.diff_type());
    }
    if !node.chips().is_empty() {
        let labels: Vec<_> = node.chips().iter().map(|chip| chip.short_label()).collect();
        let _ = write!(out, " [{}]", labels.join(", "));
    }
    out.push('\n');
    for child in node.children() {
        write_hierarchy(child, depth + 1, out);
    }
}

/// Render a property tree; filtered-out nodes are marked with `~`
pub fn render_properties(node: &PropertyTreeNode) -> String {
    let mut out = String::new();
    write_properties(node, 0, &mut out);
    out
}

fn write_properties(node: &PropertyTreeNode, depth: usize, out: &mut String) {
    let marker = if node.is_filtered_out() { "~" } else { "" };
    let _ = write!(out, "{:indent$}{}{}", "", marker, node.name(), indent = depth * 2);
    if let Some(diff_type) = node.diff_type().filter(|diff| *diff != DiffType::None) {
        let _ = write!(out, " ({})", diff_type);
    }
    out.push('\n');
    for child in node.children() {
        write_properties(child, depth + 1, out);
    }
}
