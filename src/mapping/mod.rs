mod mapping_store;
mod page_table;
mod translation_cache;

pub use mapping_store::*;
pub use page_table::*;
pub use translation_cache::*;
