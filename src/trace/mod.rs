mod address_stream;

pub use address_stream::*;
