use std::collections::{BTreeSet, HashSet};

use tracetree_types::{Chip, DiffType, HierarchyTreeNode, TraceTreeNode};

use crate::chips::{node_chips, RelativeZTargets};
use crate::diff::DiffTreeNode;
use crate::filter::Filter;

/// Tree shape the projector can walk: a raw snapshot or a diffed one
pub trait ProjectionSource {
    fn trace_node(&self) -> &TraceTreeNode;

    fn diff_type(&self) -> DiffType;

    fn source_children(&self) -> &[Self]
    where
        Self: Sized;
}

impl ProjectionSource for TraceTreeNode {
    fn trace_node(&self) -> &TraceTreeNode {
        self
    }

    fn diff_type(&self) -> DiffType {
        DiffType::None
    }

    fn source_children(&self) -> &[Self] {
        &self.children
    }
}

impl ProjectionSource for DiffTreeNode<'_> {
    fn trace_node(&self) -> &TraceTreeNode {
        self.node
    }

    fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    fn source_children(&self) -> &[Self] {
        &self.children
    }
}

/// Output of one projection: the frozen tree plus the pinned side list
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub tree: Option<HierarchyTreeNode>,
    pub pinned: Vec<HierarchyTreeNode>,
}

/// Applies view options (filter, only-visible, flatten, simplified names,
/// pinning) to a hierarchy and freezes the result.
#[derive(Debug, Clone, Default)]
pub struct HierarchyViewProjector {
    filter: Filter,
    only_visible: bool,
    simplify_names: bool,
    flatten: bool,
    pinned_ids: HashSet<String>,
}

impl HierarchyViewProjector {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn only_visible(mut self, enabled: bool) -> Self {
        self.only_visible = enabled;
        self
    }

    pub fn simplify_names(mut self, enabled: bool) -> Self {
        self.simplify_names = enabled;
        self
    }

    pub fn flatten(mut self, enabled: bool) -> Self {
        self.flatten = enabled;
        self
    }

    pub fn pinned_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pinned_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn project<S: ProjectionSource>(&self, tree: &S) -> Projection {
        let mut targets = RelativeZTargets::default();
        let Some(draft) = self.apply_checks(tree, false, &mut targets) else {
            tracing::debug!("projection filtered out the whole tree");
            return Projection::default();
        };

        let mut pinned = Vec::new();
        let mut root = self.freeze(draft, &mut targets, &mut pinned);
        for target in targets.unmatched() {
            tracing::warn!(
                relative_z_target = target,
                "relative z target not present in projected tree"
            );
        }

        if self.flatten {
            let mut flattened = Vec::new();
            self.flatten_children(root.children(), &mut flattened);
            root = root.to_builder().children(flattened).build();
        }

        tracing::debug!(pinned = pinned.len(), flatten = self.flatten, "projected hierarchy");
        Projection {
            tree: Some(root),
            pinned,
        }
    }

    /// First pass: filter/visibility propagation and chips.
    ///
    /// `parent_filter_match` flows down; children's retention flows back up.
    fn apply_checks<'s, S: ProjectionSource>(
        &self,
        source: &'s S,
        parent_filter_match: bool,
        targets: &mut RelativeZTargets,
    ) -> Option<Draft<'s>> {
        let node = source.trace_node();
        let structural = node.kind.is_structural();

        let mut show_in_filtered_view;
        let mut child_filter_match = parent_filter_match;
        if structural || parent_filter_match {
            show_in_filtered_view = true;
        } else {
            show_in_filtered_view = self.filter.matches(Some(node));
            child_filter_match = show_in_filtered_view;
        }

        let mut show_in_only_visible_view = self.only_visible && (structural || node.is_visible);

        let mut children = Vec::new();
        for child in source.source_children() {
            let Some(draft) = self.apply_checks(child, child_filter_match, targets) else {
                continue;
            };
            show_in_filtered_view |= draft.show_in_filtered_view;
            if self.only_visible && draft.show_in_only_visible_view {
                show_in_only_visible_view = true;
            }
            children.push(draft);
        }

        if !show_in_filtered_view || (self.only_visible && !show_in_only_visible_view) {
            return None;
        }

        targets.record(node);
        Some(Draft {
            node,
            diff_type: source.diff_type(),
            show_in_filtered_view,
            show_in_only_visible_view,
            chips: node_chips(node),
            children,
        })
    }

    /// Second pass: relative-z parent chips, pinning, construction of immutable nodes
    fn freeze(
        &self,
        draft: Draft<'_>,
        targets: &mut RelativeZTargets,
        pinned: &mut Vec<HierarchyTreeNode>,
    ) -> HierarchyTreeNode {
        let children = draft
            .children
            .into_iter()
            .map(|child| self.freeze(child, targets, pinned))
            .collect();

        let mut builder = HierarchyTreeNode::builder(draft.node)
            .simplify_names(self.simplify_names)
            .show_in_filtered_view(draft.show_in_filtered_view)
            .show_in_only_visible_view(draft.show_in_only_visible_view)
            .diff_type(draft.diff_type)
            .chips(draft.chips)
            .children(children);
        if targets.is_target(draft.node.display_id()) {
            builder = builder.chip(Chip::RelativeZParent);
        }
        let node = builder.build();

        if node.id().is_some_and(|id| self.pinned_ids.contains(id)) {
            pinned.push(node.clone());
        }
        node
    }

    /// Depth-first, document order; flattened nodes are emitted without children
    fn flatten_children(&self, children: &[HierarchyTreeNode], out: &mut Vec<HierarchyTreeNode>) {
        for child in children {
            let passes_visible_check =
                !self.only_visible || (child.is_visible() && !child.kind().is_structural());
            if self.filter.matches(Some(child)) && passes_visible_check {
                out.push(child.to_builder().children(Vec::new()).build());
            }
            self.flatten_children(child.children(), out);
        }
    }
}

struct Draft<'s> {
    node: &'s TraceTreeNode,
    diff_type: DiffType,
    show_in_filtered_view: bool,
    show_in_only_visible_view: bool,
    chips: BTreeSet<Chip>,
    children: Vec<Draft<'s>>,
}
