use std::fmt;

/// Result type for tracetree-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Engine precondition violated (bad ids, bad filter, missing formatter)
    Engine(tracetree_types::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Snapshot file could not be decoded
    Json(serde_json::Error),

    /// No snapshot at the requested position
    SnapshotOutOfRange { index: usize, len: usize },

    /// No node with this stable id in the selected snapshot
    NodeNotFound { stable_id: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Engine(err) => write!(f, "Engine error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Json(err) => write!(f, "Snapshot decode error: {}", err),
            Error::SnapshotOutOfRange { index, len } => {
                write!(f, "Snapshot {} out of range ({} snapshots)", index, len)
            }
            Error::NodeNotFound { stable_id } => write!(f, "Node not found: {}", stable_id),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Config(_) | Error::SnapshotOutOfRange { .. } | Error::NodeNotFound { .. } => {
                None
            }
        }
    }
}

impl From<tracetree_types::Error> for Error {
    fn from(err: tracetree_types::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
