use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::node::{HwcCompositionType, NodeKind, TraceTreeNode, TreeNode};

/// Change classification of a node relative to the previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffType {
    #[default]
    None,
    Added,
    Deleted,
    AddedMove,
    DeletedMove,
    Modified,
}

impl DiffType {
    pub fn is_deletion(&self) -> bool {
        matches!(self, DiffType::Deleted | DiffType::DeletedMove)
    }

    pub fn is_move(&self) -> bool {
        matches!(self, DiffType::AddedMove | DiffType::DeletedMove)
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiffType::None => "NONE",
            DiffType::Added => "ADDED",
            DiffType::Deleted => "DELETED",
            DiffType::AddedMove => "ADDED_MOVE",
            DiffType::DeletedMove => "DELETED_MOVE",
            DiffType::Modified => "MODIFIED",
        };
        write!(f, "{}", label)
    }
}

/// Cosmetic annotation attached to a hierarchy node.
///
/// Ordering follows declaration order so chip sets render deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Chip {
    Gpu,
    Hwc,
    Visible,
    RelativeZ,
    RelativeZParent,
    Missing,
}

impl Chip {
    pub fn short_label(&self) -> &'static str {
        match self {
            Chip::Gpu => "GPU",
            Chip::Hwc => "HWC",
            Chip::Visible => "V",
            Chip::RelativeZ => "RelZ",
            Chip::RelativeZParent => "RelZParent",
            Chip::Missing => "MISSING",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            Chip::Gpu => "This layer was composed on the GPU",
            Chip::Hwc => "This layer was composed by Hardware Composer",
            Chip::Visible => "This layer is visible",
            Chip::RelativeZ => "Is relative Z-ordered to another surface",
            Chip::RelativeZParent => "Something is relative Z-ordered to this surface",
            Chip::Missing => {
                "This layer was referenced from the parent, but not present in the trace"
            }
        }
    }
}

/// Immutable display node produced by the hierarchy projector.
///
/// Only obtainable through [`HierarchyNodeBuilder::build`]; there are no
/// mutating accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyTreeNode {
    kind: NodeKind,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    short_name: Option<String>,
    stable_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer_id: Option<String>,
    is_visible: bool,
    is_missing: bool,
    is_root_layer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    hwc_composition_type: Option<HwcCompositionType>,
    z_order_relative_of_id: i32,
    simplify_names: bool,
    show_in_filtered_view: bool,
    show_in_only_visible_view: bool,
    chips: BTreeSet<Chip>,
    diff_type: DiffType,
    children: Vec<HierarchyTreeNode>,
}

impl HierarchyTreeNode {
    /// Start a display node as a shallow clone of `source` (children are not copied)
    pub fn builder(source: &TraceTreeNode) -> HierarchyNodeBuilder {
        HierarchyNodeBuilder {
            node: HierarchyTreeNode {
                kind: source.kind.clone(),
                name: source.name.clone(),
                short_name: source.short_name.clone(),
                stable_id: source.stable_id.clone(),
                // WM-style nodes only carry a layer id
                id: source.display_id().map(str::to_string),
                layer_id: source.layer_id.clone(),
                is_visible: source.is_visible,
                is_missing: source.is_missing,
                is_root_layer: source.is_root_layer,
                hwc_composition_type: source.hwc_composition_type,
                z_order_relative_of_id: source.z_order_relative_of_id,
                simplify_names: false,
                show_in_filtered_view: false,
                show_in_only_visible_view: false,
                chips: BTreeSet::new(),
                diff_type: DiffType::None,
                children: Vec::new(),
            },
        }
    }

    /// Copy this node into a new builder, children included
    pub fn to_builder(&self) -> HierarchyNodeBuilder {
        HierarchyNodeBuilder { node: self.clone() }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Name to show: the short name when names are simplified and one exists
    pub fn display_name(&self) -> &str {
        match (&self.short_name, self.simplify_names) {
            (Some(short), true) => short,
            _ => &self.name,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_missing(&self) -> bool {
        self.is_missing
    }

    pub fn is_root_layer(&self) -> bool {
        self.is_root_layer
    }

    pub fn hwc_composition_type(&self) -> Option<HwcCompositionType> {
        self.hwc_composition_type
    }

    pub fn z_order_relative_of_id(&self) -> i32 {
        self.z_order_relative_of_id
    }

    pub fn simplify_names(&self) -> bool {
        self.simplify_names
    }

    pub fn show_in_filtered_view(&self) -> bool {
        self.show_in_filtered_view
    }

    pub fn show_in_only_visible_view(&self) -> bool {
        self.show_in_only_visible_view
    }

    pub fn chips(&self) -> &BTreeSet<Chip> {
        &self.chips
    }

    pub fn has_chip(&self, chip: Chip) -> bool {
        self.chips.contains(&chip)
    }

    pub fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    pub fn children(&self) -> &[HierarchyTreeNode] {
        &self.children
    }
}

impl TreeNode for HierarchyTreeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn stable_id(&self) -> &str {
        &self.stable_id
    }

    fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }

    fn tree_children(&self) -> &[Self] {
        &self.children
    }
}

/// Construct-once builder for [`HierarchyTreeNode`]
#[derive(Debug, Clone)]
pub struct HierarchyNodeBuilder {
    node: HierarchyTreeNode,
}

impl HierarchyNodeBuilder {
    pub fn simplify_names(mut self, enabled: bool) -> Self {
        self.node.simplify_names = enabled;
        self
    }

    pub fn show_in_filtered_view(mut self, shown: bool) -> Self {
        self.node.show_in_filtered_view = shown;
        self
    }

    pub fn show_in_only_visible_view(mut self, shown: bool) -> Self {
        self.node.show_in_only_visible_view = shown;
        self
    }

    pub fn diff_type(mut self, diff_type: DiffType) -> Self {
        self.node.diff_type = diff_type;
        self
    }

    pub fn chip(mut self, chip: Chip) -> Self {
        self.node.chips.insert(chip);
        self
    }

    pub fn chips(mut self, chips: impl IntoIterator<Item = Chip>) -> Self {
        self.node.chips.extend(chips);
        self
    }

    pub fn children(mut self, children: Vec<HierarchyTreeNode>) -> Self {
        self.node.children = children;
        self
    }

    pub fn build(self) -> HierarchyTreeNode {
        self.node
    }
}
