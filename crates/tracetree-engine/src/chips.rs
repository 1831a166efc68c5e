use std::collections::{BTreeSet, HashSet};

use tracetree_types::{Chip, HwcCompositionType, TraceTreeNode};

/// Chips derived from a single node. Pure: independent of filtering and diffing.
pub fn node_chips(node: &TraceTreeNode) -> BTreeSet<Chip> {
    let mut chips = BTreeSet::new();
    let structural = node.kind.is_structural();

    match node.hwc_composition_type {
        Some(HwcCompositionType::Client) => {
            chips.insert(Chip::Gpu);
        }
        Some(HwcCompositionType::Device | HwcCompositionType::SolidColor) => {
            chips.insert(Chip::Hwc);
        }
        None => {}
    }
    if node.is_visible && !structural {
        chips.insert(Chip::Visible);
    }
    if relative_z_target(node).is_some() {
        chips.insert(Chip::RelativeZ);
    }
    if node.is_missing {
        chips.insert(Chip::Missing);
    }
    chips
}

/// Id of the surface `node` is relative z-ordered to, when it earns a RelZ chip
fn relative_z_target(node: &TraceTreeNode) -> Option<String> {
    if node.kind.is_structural() || node.is_root_layer {
        return None;
    }
    node.relative_z_target().map(|target| target.to_string())
}

/// Relative-z targets seen during one projection.
///
/// Scoped to a single call so concurrent projections never share state.
#[derive(Debug, Default)]
pub struct RelativeZTargets {
    targets: HashSet<String>,
    matched: HashSet<String>,
}

impl RelativeZTargets {
    pub fn record(&mut self, node: &TraceTreeNode) {
        if let Some(target) = relative_z_target(node) {
            self.targets.insert(target);
        }
    }

    /// Whether something is relative z-ordered to the node with this id
    pub fn is_target(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if self.targets.contains(id) => {
                self.matched.insert(id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Targets that never matched a node id in the projected tree
    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.targets
            .difference(&self.matched)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracetree_types::NodeKind;

    fn layer() -> TraceTreeNode {
        TraceTreeNode::new(NodeKind::Layer, "Surface", "1")
    }

    #[test]
    fn test_composition_chips() {
        let mut node = layer();
        node.hwc_composition_type = Some(HwcCompositionType::Client);
        assert_eq!(node_chips(&node), BTreeSet::from([Chip::Gpu]));

        node.hwc_composition_type = Some(HwcCompositionType::SolidColor);
        assert_eq!(node_chips(&node), BTreeSet::from([Chip::Hwc]));

        node.hwc_composition_type = Some(HwcCompositionType::Device);
        assert_eq!(node_chips(&node), BTreeSet::from([Chip::Hwc]));
    }

    #[test]
    fn test_visible_chip_skips_structural_nodes() {
        let mut node = layer();
        node.is_visible = true;
        assert!(node_chips(&node).contains(&Chip::Visible));

        let mut root = TraceTreeNode::structural("root", "root");
        root.is_visible = true;
        assert!(node_chips(&root).is_empty());
    }

    #[test]
    fn test_relative_z_chip() {
        let mut node = layer();
        node.z_order_relative_of_id = 42;
        assert!(node_chips(&node).contains(&Chip::RelativeZ));

        node.is_root_layer = true;
        assert!(!node_chips(&node).contains(&Chip::RelativeZ));
    }

    #[test]
    fn test_missing_chip() {
        let mut node = layer();
        node.is_missing = true;
        assert_eq!(node_chips(&node), BTreeSet::from([Chip::Missing]));
    }

    #[test]
    fn test_chips_are_idempotent() {
        let mut node = layer();
        node.is_visible = true;
        node.is_missing = true;
        node.hwc_composition_type = Some(HwcCompositionType::Client);
        assert_eq!(node_chips(&node), node_chips(&node));
    }

    #[test]
    fn test_relative_z_targets() {
        let mut node = layer();
        node.z_order_relative_of_id = 7;

        let mut targets = RelativeZTargets::default();
        targets.record(&node);
        targets.record(&layer());

        assert!(targets.is_target(Some("7")));
        assert!(!targets.is_target(Some("1")));
        assert!(!targets.is_target(None));
        assert_eq!(targets.unmatched().count(), 0);
    }
}
