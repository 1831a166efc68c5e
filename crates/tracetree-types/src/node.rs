use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of `z_order_relative_of_id` meaning "not relative to anything"
pub const NO_RELATIVE_Z: i32 = -1;

fn no_relative_z() -> i32 {
    NO_RELATIVE_Z
}

/// Closed set of node shapes produced by snapshot parsers.
///
/// Only the structural/non-structural distinction matters to the engine;
/// the remaining variants exist so parsers can tag what they produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Positional container (trace entry root, display, container group).
    /// Exempt from move/delete-by-id semantics.
    Structural,
    /// Composited surface
    Layer,
    /// Window manager container or window
    Window,
    /// Anything else, tagged with the parser's own kind name
    Other(String),
}

impl NodeKind {
    pub fn is_structural(&self) -> bool {
        matches!(self, NodeKind::Structural)
    }
}

/// How hardware composer handled a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HwcCompositionType {
    Client,
    Device,
    SolidColor,
}

/// Raw snapshot node as handed over by a parser.
///
/// The engine only ever borrows these; every display tree is built fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceTreeNode {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub stable_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub is_missing: bool,
    #[serde(default)]
    pub is_root_layer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hwc_composition_type: Option<HwcCompositionType>,
    #[serde(default = "no_relative_z")]
    pub z_order_relative_of_id: i32,
    /// Raw keyed properties; their presence gives the node an equality capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(default)]
    pub children: Vec<TraceTreeNode>,
}

impl TraceTreeNode {
    pub fn new(kind: NodeKind, name: impl Into<String>, stable_id: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            short_name: None,
            stable_id: stable_id.into(),
            id: None,
            layer_id: None,
            is_visible: false,
            is_missing: false,
            is_root_layer: false,
            hwc_composition_type: None,
            z_order_relative_of_id: NO_RELATIVE_Z,
            properties: None,
            children: Vec::new(),
        }
    }

    /// Create a structural container node
    pub fn structural(name: impl Into<String>, stable_id: impl Into<String>) -> Self {
        Self::new(NodeKind::Structural, name, stable_id)
    }

    /// Domain id used for chips and pinning: `id`, falling back to `layer_id`
    pub fn display_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.layer_id.as_deref())
    }

    /// Target of relative z-ordering, if any
    pub fn relative_z_target(&self) -> Option<i32> {
        (self.z_order_relative_of_id != NO_RELATIVE_Z).then_some(self.z_order_relative_of_id)
    }

    /// Equality capability used for modification detection.
    ///
    /// Returns `None` when this node carries no properties to compare.
    pub fn equals(&self, other: &TraceTreeNode) -> Option<bool> {
        let own = self.properties.as_ref()?;
        Some(other.properties.as_ref() == Some(own))
    }

    /// Find a node by stable id anywhere in this subtree (pre-order)
    pub fn find_by_stable_id(&self, stable_id: &str) -> Option<&TraceTreeNode> {
        if self.stable_id == stable_id {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by_stable_id(stable_id))
    }
}

/// Capability interface shared by raw and display trees
pub trait TreeNode {
    fn name(&self) -> &str;

    fn stable_id(&self) -> &str;

    fn is_structural(&self) -> bool;

    fn tree_children(&self) -> &[Self]
    where
        Self: Sized;

    /// Number of nodes in this subtree, including self
    fn subtree_size(&self) -> usize
    where
        Self: Sized,
    {
        1 + self
            .tree_children()
            .iter()
            .map(|child| child.subtree_size())
            .sum::<usize>()
    }
}

impl TreeNode for TraceTreeNode {
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
