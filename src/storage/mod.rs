mod backing_store;
mod file_backing_store;

pub use backing_store::*;
pub use file_backing_store::*;
