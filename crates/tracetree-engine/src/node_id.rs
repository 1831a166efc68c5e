use std::collections::{HashMap, HashSet};

use tracetree_types::{Error, Result, TraceTreeNode};

/// Maps a raw node to the identifier used for diff matching.
///
/// Ids must be unique within one snapshot. Returning `None` for a live node
/// is a fatal error.
pub trait NodeIdResolver {
    fn resolve(&self, node: &TraceTreeNode) -> Option<String>;
}

impl<F> NodeIdResolver for F
where
    F: Fn(&TraceTreeNode) -> Option<String>,
{
    fn resolve(&self, node: &TraceTreeNode) -> Option<String> {
        self(node)
    }
}

/// Default resolver: the node's intrinsic stable id
#[derive(Debug, Clone, Copy, Default)]
pub struct StableIdResolver;

impl NodeIdResolver for StableIdResolver {
    fn resolve(&self, node: &TraceTreeNode) -> Option<String> {
        Some(node.stable_id.clone())
    }
}

pub(crate) fn resolve_id(resolver: &dyn NodeIdResolver, node: &TraceTreeNode) -> Result<String> {
    resolver.resolve(node).ok_or_else(|| {
        tracing::error!(stable_id = %node.stable_id, name = %node.name, "null node id");
        Error::InvalidNodeId {
            stable_id: node.stable_id.clone(),
        }
    })
}

/// Flat id -> node map over a whole snapshot
pub(crate) fn build_id_map<'a>(
    root: &'a TraceTreeNode,
    resolver: &dyn NodeIdResolver,
) -> Result<HashMap<String, &'a TraceTreeNode>> {
    let mut map = HashMap::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let id = resolve_id(resolver, node)?;
        if map.insert(id.clone(), node).is_some() {
            return Err(Error::DuplicateNodeId { id });
        }
        stack.extend(node.children.iter().rev());
    }

    Ok(map)
}

pub(crate) fn sibling_ids(
    siblings: &[TraceTreeNode],
    resolver: &dyn NodeIdResolver,
) -> Result<HashSet<String>> {
    siblings
        .iter()
        .map(|node| resolve_id(resolver, node))
        .collect()
}
