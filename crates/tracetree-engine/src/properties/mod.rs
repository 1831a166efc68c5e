//! Property tree transformation: raw property values to formatted display trees

pub mod formatter;
pub mod transformer;

pub use formatter::{format_number, DefaultFormatter, PropertyFormatter};
pub use transformer::{PropertyTreeTransformer, DEFAULT_ROOT_NAME};
