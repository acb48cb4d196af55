use std::fmt;
use std::io::Write;

use crate::common::{FrameIndex, Offset, PageNumber, PhysicalAddress, Result, VirtualAddress};

use super::Counters;

/// Where a translation found its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOutcome {
    /// Mapping found in the translation cache
    CacheHit,
    /// Cache miss, mapping found in the page table
    TableHit,
    /// Page loaded from the backing store
    PageFault,
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupOutcome::CacheHit => "cache hit",
            LookupOutcome::TableHit => "page table hit",
            LookupOutcome::PageFault => "page fault",
        };
        f.write_str(label)
    }
}

/// One completed translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub virtual_address: VirtualAddress,
    pub page: PageNumber,
    pub offset: Offset,
    pub frame: FrameIndex,
    pub physical_address: PhysicalAddress,
    pub outcome: LookupOutcome,
    /// Signed byte stored at the physical address
    pub value: i8,
}

impl fmt::Display for TranslationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Virtual address: {} (page {}, offset {}) Physical address: {} (frame {}, {}) Value: {}",
            self.virtual_address.as_u64(),
            self.page.as_u64(),
            self.offset.as_u32(),
            self.physical_address.as_u64(),
            self.frame.as_u32(),
            self.outcome,
            self.value
        )
    }
}

/// End-of-run report: the geometry plus the final counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub address_bits: u32,
    pub page_size: u32,
    pub num_pages: usize,
    pub num_frames: usize,
    pub cache_capacity: usize,
    pub counters: Counters,
}

impl Summary {
    pub fn page_fault_rate(&self) -> f64 {
        self.counters.page_fault_rate()
    }

    pub fn cache_hit_rate(&self) -> f64 {
        self.counters.cache_hit_rate()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Address space: {} bits", self.address_bits)?;
        writeln!(f, "Page size: {} bytes", self.page_size)?;
        writeln!(f, "Virtual pages: {}", self.num_pages)?;
        writeln!(f, "Physical frames: {}", self.num_frames)?;
        writeln!(f, "Translation cache entries: {}", self.cache_capacity)?;
        writeln!(f, "Addresses translated: {}", self.counters.total_accesses)?;
        writeln!(
            f,
            "Page faults: {} ({:.2}%)",
            self.counters.page_faults,
            self.page_fault_rate()
        )?;
        write!(
            f,
            "Cache hits: {} of {} ({:.2}%)",
            self.counters.cache_hits,
            self.counters.cache_accesses,
            self.cache_hit_rate()
        )
    }
}

/// Running log of completed translations, in request order
#[derive(Debug, Clone, Default)]
pub struct TranslationLog {
    records: Vec<TranslationRecord>,
}

impl TranslationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TranslationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TranslationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes every record, one per line, followed by `summary`.
    pub fn write_to<W: Write>(&self, mut writer: W, summary: &Summary) -> Result<()> {
        for record in &self.records {
            writeln!(writer, "{}", record)?;
        }
        writeln!(writer)?;
        writeln!(writer, "{}", summary)?;
        writer.flush()?;
        Ok(())
    }
}
