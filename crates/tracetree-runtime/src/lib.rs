pub mod config;
pub mod error;
pub mod session;

pub use config::{Config, HierarchyOptions, PropertyOptions};
pub use error::{Error, Result};
pub use session::{Snapshot, SnapshotSession};
