mod counters;
mod fault_handler;
mod translation_log;
mod translator;

pub use counters::*;
pub use fault_handler::*;
pub use translation_log::*;
pub use translator::*;
