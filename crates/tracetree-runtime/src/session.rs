use crate::config::Config;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracetree_engine::{HierarchyGenerator, Projection, PropertyTreeTransformer};
use tracetree_types::{PropertyTreeNode, TraceTreeNode};

/// One captured hierarchy state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp_ns: u64,
    pub tree: TraceTreeNode,
}

/// A time-ordered sequence of snapshots viewed with one configuration.
///
/// Every query builds fresh output; the snapshots themselves are never modified.
#[derive(Debug, Clone)]
pub struct SnapshotSession {
    snapshots: Vec<Snapshot>,
    config: Config,
}

impl SnapshotSession {
    /// Snapshots are ordered by timestamp; equal timestamps keep input order
    pub fn new(mut snapshots: Vec<Snapshot>, config: Config) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.timestamp_ns);
        Self { snapshots, config }
    }

    /// Decode a JSON array of `{"timestampNs": .., "tree": {..}}` entries
    pub fn from_json(json: &str, config: Config) -> Result<Self> {
        let snapshots: Vec<Snapshot> = serde_json::from_str(json)?;
        tracing::debug!(snapshots = snapshots.len(), "decoded snapshot trace");
        Ok(Self::new(snapshots, config))
    }

    pub fn load_from(path: &Path, config: Config) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, config)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn snapshot(&self, index: usize) -> Result<&Snapshot> {
        self.snapshots.get(index).ok_or(Error::SnapshotOutOfRange {
            index,
            len: self.snapshots.len(),
        })
    }

    /// Index of the last snapshot taken at or before `timestamp_ns`
    pub fn index_at(&self, timestamp_ns: u64) -> Option<usize> {
        self.snapshots
            .partition_point(|snapshot| snapshot.timestamp_ns <= timestamp_ns)
            .checked_sub(1)
    }

    fn previous(&self, index: usize) -> Option<&Snapshot> {
        index.checked_sub(1).and_then(|prev| self.snapshots.get(prev))
    }

    /// Project snapshot `index`, diffed against `index - 1` when diffing is enabled
    pub fn hierarchy_at(&self, index: usize) -> Result<Projection> {
        let snapshot = self.snapshot(index)?;
        let options = &self.config.hierarchy;
        let generator = options.apply(HierarchyGenerator::new(
            Some(&snapshot.tree),
            options.compile_filter()?,
        ));

        if !options.show_diff {
            return Ok(generator.generate_tree());
        }

        let previous = self.previous(index).map(|snapshot| &snapshot.tree);
        tracing::debug!(
            index,
            timestamp_ns = snapshot.timestamp_ns,
            has_previous = previous.is_some(),
            "generating hierarchy with diff"
        );
        Ok(generator
            .compare_with(previous)
            .generate_final_tree_with_diff()?)
    }

    /// Property tree of node `stable_id` in snapshot `index`, diffed against
    /// the same node in `index - 1` when diffing is enabled
    pub fn properties_at(&self, index: usize, stable_id: &str) -> Result<PropertyTreeNode> {
        let snapshot = self.snapshot(index)?;
        let node = snapshot
            .tree
            .find_by_stable_id(stable_id)
            .ok_or_else(|| Error::NodeNotFound {
                stable_id: stable_id.to_string(),
            })?;

        let empty = Value::Object(Default::default());
        let properties = node.properties.as_ref().unwrap_or(&empty);
        let previous = self
            .previous(index)
            .and_then(|snapshot| snapshot.tree.find_by_stable_id(stable_id))
            .map(|node| node.properties.as_ref().unwrap_or(&empty));
        if previous.is_none() && index > 0 {
            tracing::debug!(stable_id, index, "node absent from previous snapshot");
        }

        let options = &self.config.properties;
        let transformer = PropertyTreeTransformer::new(properties, options.compile_filter()?)
            .with_root(node.name.as_str(), node.stable_id.as_str())
            .compare_with(previous);
        Ok(options.apply(transformer).transform()?)
    }
}
