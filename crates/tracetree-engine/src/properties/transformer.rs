use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracetree_types::{DiffType, Error, PropertyTreeNode, Result, KEY_VALUE_SEPARATOR};

use super::formatter::{format_number, PropertyFormatter};
use crate::filter::Filter;

pub const DEFAULT_ROOT_NAME: &str = "root";

/// One side of a diffed property position
#[derive(Debug, Clone, Copy)]
enum Slot<'v> {
    Present(Content<'v>),
    Absent,
}

#[derive(Debug, Clone, Copy)]
enum Content<'v> {
    /// Raw value still to be expanded
    Raw(&'v Value),
    /// Terminal label with no further structure
    Leaf,
}

impl Slot<'_> {
    fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }
}

/// Children of one side of a node, in display order
struct Expansion<'v> {
    entries: Vec<(String, Slot<'v>)>,
    keyed: bool,
    /// Entries are the keys or indices of an object or array
    structured: bool,
    /// Source value is `[]` or `{}`, whatever label it was given
    empty_container: bool,
}

impl<'v> Expansion<'v> {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            keyed: false,
            structured: false,
            empty_container: false,
        }
    }

    fn leaf(label: String) -> Self {
        Self {
            entries: vec![(label, Slot::Present(Content::Leaf))],
            ..Self::empty()
        }
    }

    fn structured(entries: Vec<(String, Slot<'v>)>, keyed: bool) -> Self {
        Self {
            entries,
            keyed,
            structured: true,
            empty_container: false,
        }
    }

    /// Single terminal label (scalar, null, formatted or skipped value)
    fn single_leaf(&self) -> Option<&str> {
        match self.entries.as_slice() {
            [(label, Slot::Present(Content::Leaf))] if !self.keyed => Some(label.as_str()),
            _ => None,
        }
    }
}

/// Turns a raw property object (and optionally its previous-snapshot
/// counterpart) into a formatted, diffable, filterable display tree.
pub struct PropertyTreeTransformer<'a> {
    properties: &'a Value,
    compare_with: Option<&'a Value>,
    root_name: String,
    root_stable_id: String,
    filter: Filter,
    show_defaults: bool,
    show_diff: bool,
    formatter: Option<Box<dyn PropertyFormatter + 'a>>,
    skip: HashSet<String>,
    metadata_key: Option<String>,
}

impl<'a> PropertyTreeTransformer<'a> {
    pub fn new(properties: &'a Value, filter: Filter) -> Self {
        Self {
            properties,
            compare_with: None,
            root_name: DEFAULT_ROOT_NAME.to_string(),
            root_stable_id: DEFAULT_ROOT_NAME.to_string(),
            filter,
            show_defaults: false,
            show_diff: false,
            formatter: None,
            skip: HashSet::new(),
            metadata_key: None,
        }
    }

    /// Name and stable id of the root display node
    pub fn with_root(mut self, name: impl Into<String>, stable_id: impl Into<String>) -> Self {
        self.root_name = name.into();
        self.root_stable_id = stable_id.into();
        self
    }

    /// Previous-snapshot counterpart, only consulted with `show_diff`
    pub fn compare_with(mut self, previous: Option<&'a Value>) -> Self {
        self.compare_with = previous;
        self
    }

    pub fn show_defaults(mut self, enabled: bool) -> Self {
        self.show_defaults = enabled;
        self
    }

    pub fn show_diff(mut self, enabled: bool) -> Self {
        self.show_diff = enabled;
        self
    }

    pub fn formatter(mut self, formatter: impl PropertyFormatter + 'a) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Dotted property paths (relative to the root) rendered opaque
    pub fn skip<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Key whose value is hoisted onto the node's metadata instead of displayed
    pub fn metadata_key(mut self, key: impl Into<String>) -> Self {
        self.metadata_key = Some(key.into());
        self
    }

    pub fn transform(&self) -> Result<PropertyTreeNode> {
        let formatter = self.formatter.as_deref().ok_or(Error::MissingFormatter)?;
        let run = Transform {
            options: self,
            formatter,
        };

        let compare = match (self.show_diff, self.compare_with) {
            (true, Some(previous)) => Slot::Present(Content::Raw(previous)),
            _ => Slot::Absent,
        };
        tracing::debug!(
            root = %self.root_stable_id,
            show_diff = self.show_diff,
            has_previous = self.compare_with.is_some(),
            "transforming properties"
        );

        Ok(run.node(
            &self.root_name,
            &self.root_name,
            &self.root_stable_id,
            "",
            Slot::Present(Content::Raw(self.properties)),
            compare,
        ))
    }
}

struct Transform<'t, 'a> {
    options: &'t PropertyTreeTransformer<'a>,
    formatter: &'t dyn PropertyFormatter,
}

impl Transform<'_, '_> {
    /// Build the display node for one position of the tree.
    ///
    /// `name`/`compare_name` are the keys on each side (they differ only for
    /// paired scalar leaves); `path` is the dotted path used for skipping.
    fn node<'v>(
        &self,
        name: &str,
        compare_name: &str,
        stable_id: &str,
        path: &str,
        value: Slot<'v>,
        compare: Slot<'v>,
    ) -> PropertyTreeNode {
        let own = self.expand(path, value);
        let other = self.expand(path, compare);
        let mut children = self.children(stable_id, path, &own, &other);

        let display_name = if value.is_present() { name } else { compare_name };
        let builder = if children.len() == 1 && children[0].is_leaf() && !children[0].is_combined()
        {
            let child = children.remove(0);
            // Both sides present: compare raw values, labels can collide ("1" vs 1)
            let diff_type = if self.options.show_diff && value.is_present() && compare.is_present() {
                Some(classify(name, compare_name, value, compare))
            } else {
                child.diff_type()
            };
            PropertyTreeNode::builder(
                format!("{}{}{}", display_name, KEY_VALUE_SEPARATOR, leaf_name(&child)),
                stable_id,
            )
            .combined(true)
            .diff_type(diff_type)
            .children(child.children().to_vec())
        } else {
            let diff_type = self
                .options
                .show_diff
                .then(|| classify(name, compare_name, value, compare));
            PropertyTreeNode::builder(display_name, stable_id)
                .diff_type(diff_type)
                .children(children)
        };

        let builder = builder.metadata(self.metadata(value));
        let node = builder.clone().build();
        let matches = self.options.filter.matches_name(leaf_name(&node));
        if matches || node.children().iter().any(|child| !child.is_filtered_out()) {
            node
        } else {
            builder.filtered_out(true).build()
        }
    }

    fn children<'v>(
        &self,
        stable_id: &str,
        path: &str,
        own: &Expansion<'v>,
        other: &Expansion<'v>,
    ) -> Vec<PropertyTreeNode> {
        // A scalar that changed value is one modified leaf, not an add plus a delete
        if let (Some(label), Some(old_label)) = (own.single_leaf(), other.single_leaf()) {
            let leaf = Slot::Present(Content::Leaf);
            return vec![self.node(
                label,
                old_label,
                &child_id(stable_id, label),
                &child_path(path, label),
                leaf,
                leaf,
            )];
        }

        // A terminal label never mixes with keyed or indexed entries: an empty
        // container contributes nothing, any other label on the compare side is dropped
        let nothing = Expansion::empty();
        let (own, other) = match (own.single_leaf(), other.single_leaf()) {
            (Some(_), None) if other.structured && own.empty_container => (&nothing, other),
            (Some(_), None) if other.structured => (own, &nothing),
            (None, Some(_)) if own.structured => (own, &nothing),
            _ => (own, other),
        };

        let other_index: HashMap<&str, Slot<'v>> = other
            .entries
            .iter()
            .map(|(key, slot)| (key.as_str(), *slot))
            .collect();
        let own_keys: HashSet<&str> = own.entries.iter().map(|(key, _)| key.as_str()).collect();
        let keyed = own.keyed || other.keyed;

        let additions = own.entries.iter().map(|(key, slot)| {
            let previous = other_index.get(key.as_str()).copied().unwrap_or(Slot::Absent);
            (key, *slot, previous)
        });
        let deletions = other
            .entries
            .iter()
            .filter(|(key, _)| !own_keys.contains(key.as_str()))
            .map(|(key, slot)| (key, Slot::Absent, *slot));

        additions
            .chain(deletions)
            .filter(|(_, value, compare)| {
                self.options.show_defaults || !keyed || !(is_default(*value) && is_default(*compare))
            })
            .map(|(key, value, compare)| {
                self.node(
                    key,
                    key,
                    &child_id(stable_id, key),
                    &child_path(path, key),
                    value,
                    compare,
                )
            })
            .collect()
    }

    /// Classify one side's value into display children
    fn expand<'v>(&self, path: &str, slot: Slot<'v>) -> Expansion<'v> {
        let value = match slot {
            Slot::Present(Content::Raw(value)) => value,
            Slot::Present(Content::Leaf) | Slot::Absent => return Expansion::empty(),
        };

        let mut expansion = self.expand_value(path, value);
        expansion.empty_container = match value {
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        expansion
    }

    fn expand_value<'v>(&self, path: &str, value: &'v Value) -> Expansion<'v> {
        if !path.is_empty() && self.options.skip.contains(path) {
            return Expansion::leaf(value.to_string());
        }
        if let Some(formatted) = self.formatter.format(value) {
            return Expansion::leaf(formatted);
        }

        match value {
            Value::Array(items) => Expansion::structured(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), Slot::Present(Content::Raw(item))))
                    .collect(),
                false,
            ),
            Value::String(s) => Expansion::leaf(s.clone()),
            Value::Number(n) => Expansion::leaf(format_number(n)),
            Value::Bool(b) => Expansion::leaf(b.to_string()),
            Value::Object(map) => Expansion::structured(
                map.iter()
                    .filter(|(key, _)| self.options.metadata_key.as_deref() != Some(key.as_str()))
                    .map(|(key, item)| (key.clone(), Slot::Present(Content::Raw(item))))
                    .collect(),
                true,
            ),
            Value::Null => Expansion::leaf("null".to_string()),
        }
    }

    fn metadata(&self, slot: Slot<'_>) -> Option<Value> {
        let key = self.options.metadata_key.as_deref()?;
        match slot {
            Slot::Present(Content::Raw(Value::Object(map))) => map.get(key).cloned(),
            _ => None,
        }
    }
}

fn classify(name: &str, compare_name: &str, value: Slot<'_>, compare: Slot<'_>) -> DiffType {
    match (value, compare) {
        (Slot::Present(_), Slot::Absent) => DiffType::Added,
        (Slot::Absent, Slot::Present(_)) => DiffType::Deleted,
        (Slot::Absent, Slot::Absent) => DiffType::None,
        (Slot::Present(Content::Raw(a)), Slot::Present(Content::Raw(b))) => {
            if a != b {
                DiffType::Modified
            } else {
                DiffType::None
            }
        }
        (Slot::Present(Content::Leaf), Slot::Present(Content::Leaf)) => {
            if name != compare_name {
                DiffType::Modified
            } else {
                DiffType::None
            }
        }
        (Slot::Present(_), Slot::Present(_)) => DiffType::Modified,
    }
}

/// Values hidden unless `show_defaults` is on
fn is_default(slot: Slot<'_>) -> bool {
    match slot {
        Slot::Absent => true,
        Slot::Present(Content::Leaf) => false,
        Slot::Present(Content::Raw(value)) => match value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
        },
    }
}

fn leaf_name(node: &PropertyTreeNode) -> &str {
    tracetree_types::TreeNode::name(node)
}

fn child_id(stable_id: &str, key: &str) -> String {
    format!("{}.{}", stable_id, key)
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::DefaultFormatter;
    use serde_json::json;
    use tracetree_types::TreeNode;

    fn transformer(value: &Value) -> PropertyTreeTransformer<'_> {
        PropertyTreeTransformer::new(value, Filter::match_all()).formatter(DefaultFormatter)
    }

    fn child_names(node: &PropertyTreeNode) -> Vec<&str> {
        node.children().iter().map(|child| child.name()).collect()
    }

    #[test]
    fn test_missing_formatter_is_fatal() {
        let value = json!({"a": 1});
        let err = PropertyTreeTransformer::new(&value, Filter::match_all())
            .transform()
            .unwrap_err();
        assert_eq!(err, Error::MissingFormatter);
    }

    #[test]
    fn test_scalars_compress_into_key_value() {
        let value = json!({"name": "StatusBar", "z": 3, "opaque": true});
        let tree = transformer(&value).transform().unwrap();

        assert_eq!(
            child_names(&tree),
            vec!["name: StatusBar", "z: 3", "opaque: true"]
        );
        let z = &tree.children()[1];
        assert!(z.is_combined());
        assert!(z.children().is_empty());
        assert_eq!(z.property_key(), Some("z"));
        assert_eq!(z.property_value(), Some("3"));
        assert_eq!(z.stable_id(), "root.z");
    }

    #[test]
    fn test_combined_node_does_not_compress_again() {
        let value = json!({"outer": {"inner": 1}});
        let tree = transformer(&value).transform().unwrap();

        let outer = &tree.children()[0];
        assert_eq!(outer.name(), "outer");
        assert_eq!(child_names(outer), vec!["inner: 1"]);
    }

    #[test]
    fn test_null_and_formatted_values() {
        let value = json!({
            "parent": null,
            "bounds": {"left": 0, "top": 0, "right": 10, "bottom": 20},
        });
        let tree = transformer(&value).show_defaults(true).transform().unwrap();

        assert_eq!(
            child_names(&tree),
            vec!["parent: null", "bounds: (0, 0) - (10, 20)"]
        );
    }

    #[test]
    fn test_arrays_are_keyed_by_index() {
        let value = json!({"ids": [4, 5]});
        let tree = transformer(&value).transform().unwrap();

        let ids = &tree.children()[0];
        assert_eq!(child_names(ids), vec!["0: 4", "1: 5"]);
    }

    #[test]
    fn test_defaults_hidden_unless_requested() {
        let value = json!({"alpha": 0, "name": "", "visible": false, "layer": 3});
        let hidden = transformer(&value).transform().unwrap();
        assert_eq!(child_names(&hidden), vec!["layer: 3"]);

        let shown = transformer(&value).show_defaults(true).transform().unwrap();
        assert_eq!(shown.children().len(), 4);
    }

    #[test]
    fn test_diff_modified_scalar() {
        let old = json!({"z": 1, "name": "a"});
        let new = json!({"z": 2, "name": "a"});
        let tree = transformer(&new)
            .show_diff(true)
            .compare_with(Some(&old))
            .transform()
            .unwrap();

        assert_eq!(tree.diff_type(), Some(DiffType::Modified));
        let z = &tree.children()[0];
        assert_eq!(z.name(), "z: 2");
        assert_eq!(z.diff_type(), Some(DiffType::Modified));
        assert_eq!(tree.children()[1].diff_type(), Some(DiffType::None));
    }

    #[test]
    fn test_diff_added_and_deleted_keys() {
        let old = json!({"gone": 7, "kept": 1});
        let new = json!({"kept": 1, "fresh": 9});
        let tree = transformer(&new)
            .show_diff(true)
            .compare_with(Some(&old))
            .transform()
            .unwrap();

        let summary: Vec<_> = tree
            .children()
            .iter()
            .map(|child| (child.name(), child.diff_type()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("kept: 1", Some(DiffType::None)),
                ("fresh: 9", Some(DiffType::Added)),
                ("gone: 7", Some(DiffType::Deleted)),
            ]
        );
    }

    fn diff_summary<'n>(node: &'n PropertyTreeNode) -> Vec<(&'n str, Option<DiffType>)> {
        let mut out = vec![(node.name(), node.diff_type())];
        for child in node.children() {
            out.extend(diff_summary(child));
        }
        out
    }

    fn diff(new: &Value, old: &Value) -> PropertyTreeNode {
        transformer(new)
            .show_diff(true)
            .compare_with(Some(old))
            .transform()
            .unwrap()
    }

    #[test]
    fn test_empty_object_has_no_entries_to_diff() {
        let added = diff(&json!({"a": 5}), &json!({}));
        assert_eq!(
            diff_summary(&added),
            vec![
                ("root", Some(DiffType::Modified)),
                ("a: 5", Some(DiffType::Added)),
            ]
        );

        let deleted = diff(&json!({}), &json!({"a": 5}));
        assert_eq!(
            diff_summary(&deleted),
            vec![
                ("root", Some(DiffType::Modified)),
                ("a: 5", Some(DiffType::Deleted)),
            ]
        );
    }

    #[test]
    fn test_empty_array_has_no_entries_to_diff() {
        let tree = diff(&json!({"l": []}), &json!({"l": [7]}));
        assert_eq!(
            diff_summary(&tree),
            vec![
                ("root", Some(DiffType::Modified)),
                ("l", Some(DiffType::Modified)),
                ("0: 7", Some(DiffType::Deleted)),
            ]
        );

        let tree = diff(&json!({"l": [7]}), &json!({"l": []}));
        assert_eq!(tree.children()[0].children()[0].name(), "0: 7");
        assert_eq!(
            tree.children()[0].children()[0].diff_type(),
            Some(DiffType::Added)
        );
    }

    #[test]
    fn test_hidden_default_against_empty_object() {
        let tree = diff(&json!({"x": 0}), &json!({}));
        assert_eq!(tree.name(), "root");
        assert_eq!(tree.diff_type(), Some(DiffType::Modified));
        assert!(tree.children().is_empty());
    }

    #[test]
    fn test_scalar_replaced_by_object() {
        let tree = diff(&json!({"x": 5}), &json!({"x": {"a": 1}}));
        assert_eq!(
            diff_summary(&tree),
            vec![
                ("root", Some(DiffType::Modified)),
                ("x: 5", Some(DiffType::Modified)),
            ]
        );

        let tree = diff(&json!({"x": {"a": 1}}), &json!({"x": 5}));
        assert_eq!(
            diff_summary(&tree),
            vec![
                ("root", Some(DiffType::Modified)),
                ("x", Some(DiffType::Modified)),
                ("a: 1", Some(DiffType::Added)),
            ]
        );
    }

    #[test]
    fn test_same_label_different_type_is_modified() {
        let tree = diff(&json!({"x": "1"}), &json!({"x": 1}));
        assert_eq!(
            diff_summary(&tree),
            vec![
                ("root", Some(DiffType::Modified)),
                ("x: 1", Some(DiffType::Modified)),
            ]
        );
    }

    #[test]
    fn test_no_diff_types_without_show_diff() {
        let old = json!({"z": 1});
        let new = json!({"z": 2});
        let tree = transformer(&new).compare_with(Some(&old)).transform().unwrap();

        assert_eq!(tree.diff_type(), None);
        assert_eq!(tree.children()[0].diff_type(), None);
    }

    #[test]
    fn test_skip_renders_opaque() {
        let value = json!({"buffer": {"width": 1, "format": 4}, "z": 1});
        let tree = transformer(&value).skip(["buffer"]).transform().unwrap();

        assert_eq!(tree.children()[0].name(), r#"buffer: {"width":1,"format":4}"#);
    }

    #[test]
    fn test_metadata_hoisted() {
        let value = json!({"z": 1, "metadata": {"source": "sf"}});
        let tree = transformer(&value)
            .metadata_key("metadata")
            .transform()
            .unwrap();

        assert_eq!(child_names(&tree), vec!["z: 1"]);
        assert_eq!(tree.metadata(), Some(&json!({"source": "sf"})));
    }

    #[test]
    fn test_filter_suppression_keeps_shape() {
        let value = json!({"color": {"alpha": 0.5, "name": "red"}, "z": 1});
        let filter = Filter::compile("alpha").unwrap();
        let tree = PropertyTreeTransformer::new(&value, filter)
            .formatter(DefaultFormatter)
            .transform()
            .unwrap();

        let color = &tree.children()[0];
        assert!(!color.is_filtered_out());
        assert!(!color.children()[0].is_filtered_out());
        assert!(color.children()[1].is_filtered_out());
        assert_eq!(color.children()[1].property_key(), None);

        let z = &tree.children()[1];
        assert!(z.is_filtered_out());
        assert_eq!(tree.subtree_size(), 5);
    }

    #[test]
    fn test_custom_root_and_closure_formatter() {
        let value = json!({"flags": 3});
        let hex = |value: &Value| value.as_u64().map(|n| format!("0x{:x}", n));
        let tree = PropertyTreeTransformer::new(&value, Filter::match_all())
            .formatter(hex)
            .with_root("StatusBar#3", "Layer 3")
            .transform()
            .unwrap();

        assert_eq!(tree.name(), "StatusBar#3");
        assert_eq!(tree.stable_id(), "Layer 3");
        assert_eq!(child_names(&tree), vec!["flags: 0x3"]);
        assert_eq!(tree.children()[0].stable_id(), "Layer 3.flags");
    }
}
