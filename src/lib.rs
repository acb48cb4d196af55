//! Pagesim - a demand-paged virtual memory translation simulator in Rust
//!
//! This crate models how a single process's virtual addresses are translated
//! to physical addresses through a small translation cache, a page table, and
//! a fixed pool of physical frames filled on demand from a read-only backing
//! store.
//!
//! # Architecture
//!
//! The system is organized into several layers:
//!
//! - **Addressing** (`address`): Splits virtual addresses into page and offset
//!   - `AddressDecoder`: Fixed-width, non-overlapping page/offset split
//!
//! - **Mapping** (`mapping`): Page -> frame lookup stores
//!   - `MappingStore`: Fixed-capacity slot arena with insertion-order eviction
//!   - `TranslationCache`: Small first-level store with hit statistics
//!   - `PageTable`: Authoritative second-level store
//!
//! - **Frames** (`frame`): Physical memory
//!   - `FramePool`: FIFO-occupied frame queue; a frame's index is its rank
//!   - `Frame`: Immutable contents of one resident page
//!
//! - **Storage** (`storage`): Where pages come from
//!   - `BackingStore`: Read-only page source
//!   - `FileBackingStore` / `MemoryBackingStore`: File and in-memory sources
//!
//! - **MMU** (`mmu`): The translation pipeline
//!   - `Translator`: Decode, cache, page table, fault, physical address
//!   - `PageFaultHandler`: Loads missing pages and recycles the oldest frame
//!   - `TranslationLog` / `Summary`: Per-request records and final report
//!
//! - **Trace** (`trace`): Address lists
//!   - `AddressStream`: Parses an address file on a background thread
//!
//! # Frame indices are ranks
//!
//! A page's frame index is its position in the frame pool's residency
//! queue, not a fixed slot. When the pool retires its oldest frame, every
//! surviving index moves down by one, and both mapping stores are
//! renumbered in the same step.
//!
//! # Example
//!
//! ```rust
//! use pagesim::common::{VirtualAddress, VmConfig};
//! use pagesim::mmu::{LookupOutcome, Translator};
//! use pagesim::storage::MemoryBackingStore;
//!
//! // 16-bit addresses, 256-byte pages, 4 frames, 4 cache entries
//! let config = VmConfig::new(16, 256, 4, 4);
//! let store = MemoryBackingStore::from_fn(256, 256, |page, _| page as u8);
//! let mut translator = Translator::new(config, store).unwrap();
//!
//! let first = translator.translate(VirtualAddress::new(0x0105)).unwrap();
//! assert_eq!(first.outcome, LookupOutcome::PageFault);
//! assert_eq!(first.physical_address.as_u64(), 5);
//!
//! let second = translator.translate(VirtualAddress::new(0x0110)).unwrap();
//! assert_eq!(second.outcome, LookupOutcome::CacheHit);
//! assert_eq!(second.value(), 1);
//! ```

pub mod address;
pub mod common;
pub mod frame;
pub mod mapping;
pub mod mmu;
pub mod storage;
pub mod trace;

// Re-export commonly used types at the crate root
pub use common::{FrameIndex, PageNumber, Result, VirtualAddress, VmConfig, VmError};
pub use mmu::Translator;
