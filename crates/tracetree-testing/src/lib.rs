//! Testing infrastructure for tracetree tests.
//!
//! This crate provides utilities for writing readable tree tests:
//! - `fixtures`: Fluent builders for raw snapshot trees and sample traces
//! - `render`: Deterministic text rendering of display trees for snapshots
//! - `assertions`: Custom assertions over diffed and projected trees

pub mod assertions;
pub mod fixtures;
pub mod render;

pub use fixtures::{container, layer, window, NodeBuilder};
pub use render::{render_hierarchy, render_properties};
