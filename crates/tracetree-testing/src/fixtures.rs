//! Fixtures for snapshot tree construction.
//!
//! Provides utilities to:
//! - Build raw snapshot trees fluently (`layer("A").visible().children(..)`)
//! - Produce a small multi-snapshot trace with adds, deletes and moves

use serde_json::Value;
use tracetree_types::{HwcCompositionType, NodeKind, TraceTreeNode};

/// Fluent builder for [`TraceTreeNode`] fixtures.
///
/// The stable id defaults to the node name.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: TraceTreeNode,
}

/// Surface node
pub fn layer(name: &str) -> NodeBuilder {
    NodeBuilder::new(NodeKind::Layer, name)
}

/// Window manager node
pub fn window(name: &str) -> NodeBuilder {
    NodeBuilder::new(NodeKind::Window, name)
}

/// Structural container node
pub fn container(name: &str) -> NodeBuilder {
    NodeBuilder::new(NodeKind::Structural, name)
}

impl NodeBuilder {
    pub fn new(kind: NodeKind, name: &str) -> Self {
        Self {
            node: TraceTreeNode::new(kind, name, name),
        }
    }

    pub fn stable_id(mut self, stable_id: &str) -> Self {
        self.node.stable_id = stable_id.to_string();
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.node.id = Some(id.to_string());
        self
    }

    pub fn layer_id(mut self, layer_id: &str) -> Self {
        self.node.layer_id = Some(layer_id.to_string());
        self
    }

    pub fn short_name(mut self, short_name: &str) -> Self {
        self.node.short_name = Some(short_name.to_string());
        self
    }

    pub fn visible(mut self) -> Self {
        self.node.is_visible = true;
        self
    }

    pub fn missing(mut self) -> Self {
        self.node.is_missing = true;
        self
    }

    pub fn root_layer(mut self) -> Self {
        self.node.is_root_layer = true;
        self
    }

    pub fn hwc(mut self, composition: HwcCompositionType) -> Self {
        self.node.hwc_composition_type = Some(composition);
        self
    }

    pub fn relative_z(mut self, target: i32) -> Self {
        self.node.z_order_relative_of_id = target;
        self
    }

    pub fn props(mut self, properties: Value) -> Self {
        self.node.properties = Some(properties);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TraceTreeNode>,
    {
        self.node.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> TraceTreeNode {
        self.node
    }
}

impl From<NodeBuilder> for TraceTreeNode {
    fn from(builder: NodeBuilder) -> Self {
        builder.build()
    }
}

/// Three consecutive snapshots of a small compositor hierarchy.
///
/// - 0 -> 1: `Dim` is added under `App`, `Toast` is deleted, `NavBar` changes alpha
/// - 1 -> 2: `Dim` moves from `App` to the display root
pub fn sample_snapshots() -> Vec<TraceTreeNode> {
    use serde_json::json;

    let status_bar = || {
        layer("StatusBar")
            .id("1")
            .visible()
            .hwc(HwcCompositionType::Device)
            .props(json!({"alpha": 1.0, "z": 10}))
    };
    let nav_bar = |alpha: f64| {
        layer("NavBar")
            .id("2")
            .visible()
            .hwc(HwcCompositionType::Client)
            .props(json!({"alpha": alpha, "z": 11}))
    };
    let dim = || layer("Dim").id("5").relative_z(4).props(json!({"alpha": 0.5}));
    let app = |children: Vec<NodeBuilder>| {
        layer("App")
            .id("4")
            .visible()
            .short_name("App")
            .props(json!({"alpha": 1.0, "z": 1}))
            .children(children)
    };
    let display = |children: Vec<NodeBuilder>| container("Display 0").children(children);

    let first = container("root").children([display(vec![
        status_bar(),
        nav_bar(1.0),
        app(vec![]),
        layer("Toast").id("6").props(json!({"alpha": 1.0})),
    ])]);
    let second = container("root").children([display(vec![
        status_bar(),
        nav_bar(0.5),
        app(vec![dim()]),
    ])]);
    let third = container("root").children([display(vec![
        status_bar(),
        nav_bar(0.5),
        app(vec![]),
        dim(),
    ])]);

    vec![first.build(), second.build(), third.build()]
}
