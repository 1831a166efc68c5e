// Engine module - Hierarchy diffing, view projection and property transformation
// This layer sits between raw parsed snapshots (types) and the hosting view layer

mod chips;
pub mod diff;
pub mod filter;
pub mod generator;
pub mod node_id;
pub mod projector;
pub mod properties;

pub use chips::node_chips;
pub use diff::{
    diff_trees, merge_diff_roots, DefaultModifiedCheck, DiffTreeNode, ModifiedCheck,
    DIFF_TREE_ROOT_NAME,
};
pub use filter::Filter;
pub use generator::HierarchyGenerator;
pub use node_id::{NodeIdResolver, StableIdResolver};
pub use projector::{HierarchyViewProjector, Projection, ProjectionSource};
pub use properties::{DefaultFormatter, PropertyFormatter, PropertyTreeTransformer};

use tracetree_types::{PropertyTreeNode, Result, TraceTreeNode};

// Façade API - Stable public interface for hosts
// Hosts needing more control use the builders directly

/// Project a snapshot with default view options and a filter string
pub fn project_snapshot(tree: &TraceTreeNode, filter: &str) -> Result<Projection> {
    let filter = Filter::compile(filter)?;
    Ok(HierarchyGenerator::new(Some(tree), filter).generate_tree())
}

/// Diff two snapshots by stable id and project the result
pub fn diff_snapshots(
    current: Option<&TraceTreeNode>,
    previous: Option<&TraceTreeNode>,
    filter: &str,
) -> Result<Projection> {
    let filter = Filter::compile(filter)?;
    HierarchyGenerator::new(current, filter)
        .compare_with(previous)
        .generate_final_tree_with_diff()
}

/// Transform a node's properties with the default formatter
pub fn transform_properties(node: &TraceTreeNode, filter: &str) -> Result<PropertyTreeNode> {
    let filter = Filter::compile(filter)?;
    let empty = serde_json::Value::Object(Default::default());
    let properties = node.properties.as_ref().unwrap_or(&empty);
    PropertyTreeTransformer::new(properties, filter)
        .with_root(node.name.as_str(), node.stable_id.as_str())
        .formatter(DefaultFormatter)
        .transform()
}
