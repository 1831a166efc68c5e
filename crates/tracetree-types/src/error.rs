use std::fmt;

/// Result type for tracetree-types and tracetree-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal precondition violations raised while building display trees.
///
/// None of these are retried: they indicate a malformed snapshot or a
/// misconfigured caller, and the entry should be reported as unrenderable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The node id resolver returned nothing for a live node
    InvalidNodeId { stable_id: String },

    /// Two nodes of one snapshot resolved to the same id
    DuplicateNodeId { id: String },

    /// Diff requested with neither side present
    Contradiction(String),

    /// Property transform configured without a value formatter
    MissingFormatter,

    /// A filter clause is not a valid regular expression
    InvalidFilter { clause: String, reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidNodeId { stable_id } => {
                write!(f, "Node ID can't be null or undefined (node {})", stable_id)
            }
            Error::DuplicateNodeId { id } => write!(f, "Duplicate node id '{}' detected", id),
            Error::Contradiction(msg) => write!(f, "Contradiction: {}", msg),
            Error::MissingFormatter => write!(f, "Property transformer has no formatter"),
            Error::InvalidFilter { clause, reason } => {
                write!(f, "Invalid filter clause '{}': {}", clause, reason)
            }
        }
    }
}

impl std::error::Error for Error {}
