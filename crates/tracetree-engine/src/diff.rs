use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use tracetree_types::{DiffType, Error, Result, TraceTreeNode};

use crate::node_id::{build_id_map, resolve_id, sibling_ids, NodeIdResolver};

/// Name and stable id of the synthetic root wrapping multiple diff roots
pub const DIFF_TREE_ROOT_NAME: &str = "DiffTree";

static DIFF_TREE_ROOT: Lazy<TraceTreeNode> =
    Lazy::new(|| TraceTreeNode::structural(DIFF_TREE_ROOT_NAME, DIFF_TREE_ROOT_NAME));

/// Decides whether two matched nodes differ in content
pub trait ModifiedCheck {
    fn is_modified(&self, new_node: Option<&TraceTreeNode>, old_node: Option<&TraceTreeNode>)
    -> bool;
}

impl<F> ModifiedCheck for F
where
    F: Fn(Option<&TraceTreeNode>, Option<&TraceTreeNode>) -> bool,
{
    fn is_modified(
        &self,
        new_node: Option<&TraceTreeNode>,
        old_node: Option<&TraceTreeNode>,
    ) -> bool {
        self(new_node, old_node)
    }
}

/// Structural nodes are never modified; one-sided pairs always are;
/// otherwise the node's own equality capability decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModifiedCheck;

impl ModifiedCheck for DefaultModifiedCheck {
    fn is_modified(
        &self,
        new_node: Option<&TraceTreeNode>,
        old_node: Option<&TraceTreeNode>,
    ) -> bool {
        match (new_node, old_node) {
            (None, None) => false,
            (Some(new_node), _) if new_node.kind.is_structural() => false,
            (Some(_), None) | (None, Some(_)) => true,
            (Some(new_node), Some(old_node)) => new_node.equals(old_node).is_some_and(|eq| !eq),
        }
    }
}

/// A node of the diffed tree.
///
/// Borrows the raw node it was matched from; `children` are the diffed
/// children, which may include deleted nodes from the old snapshot.
#[derive(Debug, Clone)]
pub struct DiffTreeNode<'a> {
    pub node: &'a TraceTreeNode,
    pub diff_type: DiffType,
    pub children: Vec<DiffTreeNode<'a>>,
}

impl<'a> DiffTreeNode<'a> {
    /// Wrap a raw tree without diffing (every node `NONE`)
    pub fn unchanged(node: &'a TraceTreeNode) -> Self {
        Self {
            node,
            diff_type: DiffType::None,
            children: node.children.iter().map(Self::unchanged).collect(),
        }
    }
}

/// Diff `new_tree` against `old_tree`.
///
/// Returns a sequence because a root replaced by a different node yields
/// both the deleted old root and the new one; see [`merge_diff_roots`].
pub fn diff_trees<'a>(
    new_tree: Option<&'a TraceTreeNode>,
    old_tree: Option<&'a TraceTreeNode>,
    resolver: &dyn NodeIdResolver,
    is_modified: &dyn ModifiedCheck,
) -> Result<Vec<DiffTreeNode<'a>>> {
    if new_tree.is_none() && old_tree.is_none() {
        return Err(both_undefined());
    }

    let new_map = match new_tree {
        Some(tree) => build_id_map(tree, resolver)?,
        None => HashMap::new(),
    };
    let old_map = match old_tree {
        Some(tree) => build_id_map(tree, resolver)?,
        None => HashMap::new(),
    };
    tracing::debug!(
        new_nodes = new_map.len(),
        old_nodes = old_map.len(),
        "diffing hierarchy snapshots"
    );

    let engine = DiffEngine {
        resolver,
        is_modified,
        new_map,
        old_map,
    };
    let no_siblings = HashSet::new();
    engine.diff_pair(new_tree, old_tree, &no_siblings, &no_siblings)
}

/// Collapse diff roots into one tree, wrapping several under a structural
/// `DiffTree` node
pub fn merge_diff_roots(mut roots: Vec<DiffTreeNode<'_>>) -> Option<DiffTreeNode<'_>> {
    if roots.len() > 1 {
        Some(DiffTreeNode {
            node: &DIFF_TREE_ROOT,
            diff_type: DiffType::None,
            children: roots,
        })
    } else {
        roots.pop()
    }
}

fn both_undefined() -> Error {
    Error::Contradiction("both trees undefined".to_string())
}

struct DiffEngine<'a, 'r> {
    resolver: &'r dyn NodeIdResolver,
    is_modified: &'r dyn ModifiedCheck,
    new_map: HashMap<String, &'a TraceTreeNode>,
    old_map: HashMap<String, &'a TraceTreeNode>,
}

impl<'a> DiffEngine<'a, '_> {
    fn diff_pair(
        &self,
        new_node: Option<&'a TraceTreeNode>,
        old_node: Option<&'a TraceTreeNode>,
        new_sibling_ids: &HashSet<String>,
        old_sibling_ids: &HashSet<String>,
    ) -> Result<Vec<DiffTreeNode<'a>>> {
        let old_id = old_node
            .map(|node| resolve_id(self.resolver, node))
            .transpose()?;
        let mut diff_trees = Vec::new();

        match (new_node, old_node) {
            (Some(new_node), _) => {
                let new_id = resolve_id(self.resolver, new_node)?;
                let mut diff_type = DiffType::None;
                let mut compare_with = old_node;

                if !new_node.kind.is_structural() && old_id.as_deref() != Some(new_id.as_str()) {
                    if old_sibling_ids.contains(&new_id) {
                        // Reordered among the same siblings: not a move
                        compare_with = self.old_map.get(&new_id).copied();
                        if self.is_modified.is_modified(Some(new_node), compare_with) {
                            diff_type = DiffType::Modified;
                        }
                    } else if let Some(&moved_from) = self.old_map.get(&new_id) {
                        tracing::trace!(id = %new_id, "node moved from another parent");
                        diff_type = DiffType::AddedMove;
                        compare_with = Some(moved_from);
                    } else {
                        diff_type = DiffType::Added;
                        compare_with = None;
                    }

                    if let (Some(old_node), Some(old_id)) = (old_node, old_id.as_ref())
                        && !new_sibling_ids.contains(old_id)
                    {
                        diff_trees.push(self.removed(old_node, old_id)?);
                    }
                } else if self.is_modified.is_modified(Some(new_node), old_node) {
                    diff_type = DiffType::Modified;
                }

                diff_trees.push(DiffTreeNode {
                    node: new_node,
                    diff_type,
                    children: self.visit_children(Some(new_node), compare_with)?,
                });
            }
            (None, Some(old_node)) => {
                if let Some(old_id) = old_id.as_ref()
                    && !new_sibling_ids.contains(old_id)
                {
                    diff_trees.push(self.removed(old_node, old_id)?);
                }
            }
            (None, None) => return Err(both_undefined()),
        }

        Ok(diff_trees)
    }

    /// Node present in the old snapshot whose position has no counterpart
    fn removed(&self, old_node: &'a TraceTreeNode, old_id: &str) -> Result<DiffTreeNode<'a>> {
        if self.new_map.contains_key(old_id) {
            // Visited properly when reached from the new side
            tracing::trace!(id = %old_id, "node moved to another parent");
            return Ok(DiffTreeNode {
                node: old_node,
                diff_type: DiffType::DeletedMove,
                children: Vec::new(),
            });
        }

        tracing::trace!(id = %old_id, "node deleted");
        Ok(DiffTreeNode {
            node: old_node,
            diff_type: DiffType::Deleted,
            children: self.visit_children(None, Some(old_node))?,
        })
    }

    /// Pair children by position; existence checks use the full sibling sets
    fn visit_children(
        &self,
        new_node: Option<&'a TraceTreeNode>,
        old_node: Option<&'a TraceTreeNode>,
    ) -> Result<Vec<DiffTreeNode<'a>>> {
        let new_children = new_node
            .map(|node| node.children.as_slice())
            .unwrap_or_default();
        let old_children = old_node
            .map(|node| node.children.as_slice())
            .unwrap_or_default();
        let new_ids = sibling_ids(new_children, self.resolver)?;
        let old_ids = sibling_ids(old_children, self.resolver)?;

        let mut diff_children = Vec::new();
        for i in 0..new_children.len().max(old_children.len()) {
            diff_children.extend(self.diff_pair(
                new_children.get(i),
                old_children.get(i),
                &new_ids,
                &old_ids,
            )?);
        }
        Ok(diff_children)
    }
}
