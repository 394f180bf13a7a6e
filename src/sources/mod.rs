//! Property source implementations.

mod env;
mod file;
mod memory;
mod prop_source;
mod snapshot;

pub use env::EnvSource;
pub use file::FileSource;
pub use memory::InMemorySource;
pub use prop_source::PropSource;
pub(crate) use snapshot::Snapshot;
