mod frame_data;
mod frame_pool;

pub use frame_data::*;
pub use frame_pool::*;
