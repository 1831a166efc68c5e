use serde::Serialize;
use serde_json::Value;

use crate::hierarchy::DiffType;
use crate::node::TreeNode;

/// Separator between key and value in a path-compressed property name
pub const KEY_VALUE_SEPARATOR: &str = ": ";

/// Immutable display node of a property tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTreeNode {
    name: String,
    stable_id: String,
    children: Vec<PropertyTreeNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff_type: Option<DiffType>,
    combined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    property_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    property_value: Option<String>,
    filtered_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
}

impl PropertyTreeNode {
    pub fn builder(name: impl Into<String>, stable_id: impl Into<String>) -> PropertyNodeBuilder {
        PropertyNodeBuilder {
            node: PropertyTreeNode {
                name: name.into(),
                stable_id: stable_id.into(),
                children: Vec::new(),
                diff_type: None,
                combined: false,
                property_key: None,
                property_value: None,
                filtered_out: false,
                metadata: None,
            },
        }
    }

    pub fn children(&self) -> &[PropertyTreeNode] {
        &self.children
    }

    /// Diff classification; `None` unless diffing was requested
    pub fn diff_type(&self) -> Option<DiffType> {
        self.diff_type
    }

    /// Whether this node is the result of merging a single leaf child into its parent
    pub fn is_combined(&self) -> bool {
        self.combined
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Key half of a leaf's `key: value` name; cleared when filtered out
    pub fn property_key(&self) -> Option<&str> {
        self.property_key.as_deref()
    }

    pub fn property_value(&self) -> Option<&str> {
        self.property_value.as_deref()
    }

    /// Neither this node nor any descendant passed the filter
    pub fn is_filtered_out(&self) -> bool {
        self.filtered_out
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Look up a direct child by its display name
    pub fn child(&self, name: &str) -> Option<&PropertyTreeNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Look up a direct child by the key half of its name
    pub fn child_by_key(&self, key: &str) -> Option<&PropertyTreeNode> {
        self.children.iter().find(|child| {
            child.name == key
                || child
                    .name
                    .split_once(KEY_VALUE_SEPARATOR)
                    .is_some_and(|(k, _)| k == key)
        })
    }
}

impl TreeNode for PropertyTreeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn stable_id(&self) -> &str {
        &self.stable_id
    }

    fn is_structural(&self) -> bool {
        false
    }

    fn tree_children(&self) -> &[Self] {
        &self.children
    }
}

/// Construct-once builder for [`PropertyTreeNode`]
#[derive(Debug, Clone)]
pub struct PropertyNodeBuilder {
    node: PropertyTreeNode,
}

impl PropertyNodeBuilder {
    pub fn children(mut self, children: Vec<PropertyTreeNode>) -> Self {
        self.node.children = children;
        self
    }

    pub fn diff_type(mut self, diff_type: Option<DiffType>) -> Self {
        self.node.diff_type = diff_type;
        self
    }

    pub fn combined(mut self, combined: bool) -> Self {
        self.node.combined = combined;
        self
    }

    pub fn metadata(mut self, metadata: Option<Value>) -> Self {
        self.node.metadata = metadata;
        self
    }

    /// Mark the node as failing the filter; its key is cleared but structure kept
    pub fn filtered_out(mut self, filtered_out: bool) -> Self {
        self.node.filtered_out = filtered_out;
        self
    }

    pub fn build(self) -> PropertyTreeNode {
        let mut node = self.node;
        if node.children.is_empty() {
            match node.name.split_once(KEY_VALUE_SEPARATOR) {
                Some((key, value)) => {
                    node.property_key = Some(key.to_string());
                    node.property_value = Some(value.to_string());
                }
                None => node.property_key = Some(node.name.clone()),
            }
        }
        if node.filtered_out {
            node.property_key = None;
        }
        node
    }
}
