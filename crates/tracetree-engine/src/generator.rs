use tracetree_types::{Result, TraceTreeNode};

use crate::diff::{diff_trees, merge_diff_roots, DefaultModifiedCheck, ModifiedCheck};
use crate::filter::Filter;
use crate::node_id::{NodeIdResolver, StableIdResolver};
use crate::projector::{HierarchyViewProjector, Projection};

/// One-stop builder: optionally diff a snapshot against its predecessor,
/// then project it with the configured view options.
///
/// ```ignore
/// let projection = HierarchyGenerator::new(Some(&current), filter)
///     .simplify_names(true)
///     .compare_with(Some(&previous))
///     .generate_final_tree_with_diff()?;
/// ```
pub struct HierarchyGenerator<'a> {
    tree: Option<&'a TraceTreeNode>,
    previous: Option<&'a TraceTreeNode>,
    projector: HierarchyViewProjector,
    resolver: Box<dyn NodeIdResolver + 'a>,
    is_modified: Box<dyn ModifiedCheck + 'a>,
}

impl<'a> HierarchyGenerator<'a> {
    pub fn new(tree: Option<&'a TraceTreeNode>, filter: Filter) -> Self {
        Self {
            tree,
            previous: None,
            projector: HierarchyViewProjector::new(filter),
            resolver: Box::new(StableIdResolver),
            is_modified: Box::new(DefaultModifiedCheck),
        }
    }

    pub fn only_visible(mut self, enabled: bool) -> Self {
        self.projector = self.projector.only_visible(enabled);
        self
    }

    pub fn simplify_names(mut self, enabled: bool) -> Self {
        self.projector = self.projector.simplify_names(enabled);
        self
    }

    pub fn flatten(mut self, enabled: bool) -> Self {
        self.projector = self.projector.flatten(enabled);
        self
    }

    pub fn with_pinned_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projector = self.projector.pinned_ids(ids);
        self
    }

    /// Previous snapshot to diff against
    pub fn compare_with(mut self, previous: Option<&'a TraceTreeNode>) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_unique_node_id(mut self, resolver: impl NodeIdResolver + 'a) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_modified_check(mut self, check: impl ModifiedCheck + 'a) -> Self {
        self.is_modified = Box::new(check);
        self
    }

    /// Project the tree as-is; every node's diff type stays `NONE`
    pub fn generate_tree(&self) -> Projection {
        match self.tree {
            Some(tree) => self.projector.project(tree),
            None => Projection::default(),
        }
    }

    /// Diff against the previous snapshot, then project.
    ///
    /// Fails when both trees are absent, or when node ids are missing or
    /// duplicated in either snapshot.
    pub fn generate_final_tree_with_diff(&self) -> Result<Projection> {
        let roots = diff_trees(
            self.tree,
            self.previous,
            self.resolver.as_ref(),
            self.is_modified.as_ref(),
        )?;
        Ok(match merge_diff_roots(roots) {
            Some(root) => self.projector.project(&root),
            None => Projection::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracetree_types::{DiffType, Error, NodeKind, TreeNode};

    fn layer(name: &str, stable_id: &str) -> TraceTreeNode {
        TraceTreeNode::new(NodeKind::Layer, name, stable_id)
    }

    fn snapshot(children: Vec<TraceTreeNode>) -> TraceTreeNode {
        let mut root = TraceTreeNode::structural("root", "root");
        root.children = children;
        root
    }

    #[test]
    fn test_generate_tree_without_diff() {
        let tree = snapshot(vec![layer("A", "1"), layer("B", "2")]);
        let projection = HierarchyGenerator::new(Some(&tree), Filter::match_all()).generate_tree();

        let root = projection.tree.unwrap();
        assert_eq!(root.subtree_size(), 3);
        assert!(
            root.children()
                .iter()
                .all(|child| child.diff_type() == DiffType::None)
        );
    }

    #[test]
    fn test_generate_tree_of_nothing() {
        let projection = HierarchyGenerator::new(None, Filter::match_all()).generate_tree();
        assert!(projection.tree.is_none());
        assert!(projection.pinned.is_empty());
    }

    #[test]
    fn test_diff_requires_a_tree() {
        let err = HierarchyGenerator::new(None, Filter::match_all())
            .generate_final_tree_with_diff()
            .unwrap_err();
        assert!(matches!(err, Error::Contradiction(_)));
    }

    #[test]
    fn test_generate_with_diff() {
        let old = snapshot(vec![layer("A", "1"), layer("Gone", "9")]);
        let new = snapshot(vec![layer("A", "1"), layer("Fresh", "3")]);

        let projection = HierarchyGenerator::new(Some(&new), Filter::match_all())
            .compare_with(Some(&old))
            .generate_final_tree_with_diff()
            .unwrap();

        let root = projection.tree.unwrap();
        let summary: Vec<_> = root
            .children()
            .iter()
            .map(|child| (child.name(), child.diff_type()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("A", DiffType::None),
                ("Gone", DiffType::Deleted),
                ("Fresh", DiffType::Added),
            ]
        );
    }

    #[test]
    fn test_custom_resolver_and_check() {
        let old = snapshot(vec![layer("A", "1")]);
        let new = snapshot(vec![layer("A", "1")]);
        let by_name = |node: &TraceTreeNode| Some(node.name.clone());
        let always = |new_node: Option<&TraceTreeNode>, _: Option<&TraceTreeNode>| {
            new_node.is_some_and(|node| !node.kind.is_structural())
        };

        let projection = HierarchyGenerator::new(Some(&new), Filter::match_all())
            .compare_with(Some(&old))
            .with_unique_node_id(by_name)
            .with_modified_check(always)
            .generate_final_tree_with_diff()
            .unwrap();

        let root = projection.tree.unwrap();
        assert_eq!(root.diff_type(), DiffType::None);
        assert_eq!(root.children()[0].diff_type(), DiffType::Modified);
    }

    #[test]
    fn test_pinned_items_keep_diff_state() {
        let with_id = |name: &str, id: &str| {
            let mut node = layer(name, id);
            node.id = Some(id.to_string());
            node
        };
        let old = snapshot(vec![with_id("A", "1"), with_id("Gone", "9")]);
        let new = snapshot(vec![with_id("A", "1"), with_id("Fresh", "3")]);

        let projection = HierarchyGenerator::new(Some(&new), Filter::match_all())
            .compare_with(Some(&old))
            .with_pinned_ids(["9", "3"])
            .generate_final_tree_with_diff()
            .unwrap();

        let pinned: Vec<_> = projection
            .pinned
            .iter()
            .map(|node| (node.name(), node.diff_type()))
            .collect();
        assert_eq!(
            pinned,
            vec![("Gone", DiffType::Deleted), ("Fresh", DiffType::Added)]
        );
    }
}
