// Integration tests for the complete flow: JSON trace -> session -> projected hierarchy and properties
use tracetree_runtime::{Config, Snapshot, SnapshotSession};
use tracetree_testing::assertions::{assert_diff_type, find_by_name};
use tracetree_testing::fixtures::sample_snapshots;
use tracetree_testing::{render_hierarchy, render_properties};
use tracetree_types::{DiffType, TreeNode};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn trace_json() -> anyhow::Result<String> {
    let snapshots: Vec<Snapshot> = sample_snapshots()
        .into_iter()
        .enumerate()
        .map(|(i, tree)| Snapshot {
            timestamp_ns: 10 * (i as u64 + 1),
            tree,
        })
        .collect();
    Ok(serde_json::to_string(&snapshots)?)
}

#[test]
fn test_trace_file_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("trace.json");
    std::fs::write(&path, trace_json()?)?;

    let session = SnapshotSession::load_from(&path, Config::default())?;
    assert_eq!(session.len(), 3);
    assert_eq!(session.snapshot(2)?.timestamp_ns, 30);
    Ok(())
}

#[test]
fn test_hierarchy_diff_between_entries() -> anyhow::Result<()> {
    init_tracing();
    let session = SnapshotSession::from_json(&trace_json()?, Config::default())?;

    let tree = session.hierarchy_at(1)?.tree.expect("tree");
    assert_diff_type(&tree, "NavBar", DiffType::Modified)?;
    assert_diff_type(&tree, "Dim", DiffType::Added)?;
    assert_diff_type(&tree, "Toast", DiffType::Deleted)?;

    let first = session.hierarchy_at(0)?.tree.expect("tree");
    assert_diff_type(&first, "StatusBar", DiffType::Added)?;
    Ok(())
}

#[test]
fn test_hierarchy_without_diff() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::parse(
        r#"
[hierarchy]
show_diff = false
only_visible = true
pinned_ids = ["2"]
"#,
    )?;
    let session = SnapshotSession::from_json(&trace_json()?, config)?;

    let projection = session.hierarchy_at(2)?;
    let tree = projection.tree.expect("tree");
    assert_eq!(
        render_hierarchy(&tree),
        "root\n  Display 0\n    StatusBar [HWC, V]\n    NavBar [GPU, V]\n    App [V]\n"
    );
    assert!(find_by_name(&tree, "Dim").is_none());
    assert_eq!(projection.pinned.len(), 1);
    assert_eq!(projection.pinned[0].name(), "NavBar");
    Ok(())
}

#[test]
fn test_properties_diff_between_entries() -> anyhow::Result<()> {
    init_tracing();
    let session = SnapshotSession::from_json(&trace_json()?, Config::default())?;

    let tree = session.properties_at(1, "NavBar")?;
    assert_eq!(
        render_properties(&tree),
        "NavBar (MODIFIED)\n  alpha: 0.5 (MODIFIED)\n  z: 11\n"
    );

    // Dim did not exist in the previous entry
    let added = session.properties_at(1, "Dim")?;
    assert_eq!(added.diff_type(), Some(DiffType::Added));
    Ok(())
}

#[test]
fn test_properties_filter_from_config() -> anyhow::Result<()> {
    let config = Config::parse("[properties]\nfilter = \"alpha\"\nshow_diff = false\n")?;
    let session = SnapshotSession::from_json(&trace_json()?, config)?;

    let tree = session.properties_at(0, "StatusBar")?;
    assert_eq!(render_properties(&tree), "StatusBar\n  alpha: 1\n  ~z: 10\n");
    Ok(())
}
