//! Working-set management and path helpers.

pub mod discovery;
pub mod managed;
pub mod operations;
pub mod set;
pub mod validation;

pub use discovery::expand;
pub use managed::ManagedFile;
pub use operations::{has_reserved_suffix, temp_path};
pub use set::{AddResult, DuplicateEntry, FileSet, RejectReason, Rejected};
pub use validation::is_eligible;
