use thiserror::Error;

use super::types::{FrameIndex, VirtualAddress};

/// Simulator error types
#[derive(Error, Debug)]
pub enum VmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid address {address}: does not fit in {bits} address bits")]
    InvalidAddress { address: VirtualAddress, bits: u32 },

    #[error(
        "Backing store short read at offset {offset}: requested {requested} bytes, {available} available"
    )]
    BackingStore {
        offset: u64,
        requested: usize,
        available: u64,
    },

    #[error("{index} out of range for frame pool of {len} resident frames")]
    OutOfRange { index: FrameIndex, len: usize },

    #[error("Frame pool is full, evict before admitting")]
    PoolFull,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed address on line {line}: {text:?}")]
    AddressParse { line: usize, text: String },

    #[error("Address stream error: {0}")]
    AddressStream(String),
}

impl VmError {
    /// Returns true if the error rejects only the request that raised it,
    /// leaving the address space usable for the next one.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            VmError::InvalidAddress { .. } | VmError::BackingStore { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VmError>;
