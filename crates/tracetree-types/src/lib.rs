pub mod error;
pub mod hierarchy;
pub mod node;
pub mod properties;

pub use error::{Error, Result};
pub use hierarchy::*;
pub use node::*;
pub use properties::*;
