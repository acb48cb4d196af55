use std::fmt;
use std::io::Write;

use crate::address::AddressDecoder;
use crate::common::{
    FrameIndex, Offset, PageNumber, PhysicalAddress, Result, VirtualAddress, VmConfig, VmError,
};
use crate::frame::{Frame, FramePool};
use crate::mapping::{PageTable, TranslationCache};
use crate::storage::BackingStore;

use super::{Counters, LookupOutcome, PageFaultHandler, Summary, TranslationLog, TranslationRecord};

/// The result of translating one virtual address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub virtual_address: VirtualAddress,
    pub physical_address: PhysicalAddress,
    pub page: PageNumber,
    pub frame_index: FrameIndex,
    pub offset: Offset,
    pub outcome: LookupOutcome,
    /// The frame holding the page
    pub frame: Frame,
}

impl Translation {
    /// Returns the signed byte stored at the physical address.
    pub fn value(&self) -> i8 {
        self.frame.byte_at(self.offset).unwrap_or_default() as i8
    }

    /// Builds the log record for this translation.
    pub fn to_record(&self) -> TranslationRecord {
        TranslationRecord {
            virtual_address: self.virtual_address,
            page: self.page,
            offset: self.offset,
            frame: self.frame_index,
            physical_address: self.physical_address,
            outcome: self.outcome,
            value: self.value(),
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_record(), f)
    }
}

/// How a trace run went: translations completed and requests rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceReport {
    pub completed: usize,
    pub rejected: usize,
}

/// Translator owns one simulated address space: the translation cache, the
/// page table, the frame pool, the counters and the running log.
///
/// Every request runs to completion before the next one starts. The
/// translator is the only writer of its three stores, and frame evictions go
/// through the pool's single eviction routine so that both mapping stores are
/// renumbered together.
pub struct Translator<S: BackingStore> {
    config: VmConfig,
    decoder: AddressDecoder,
    cache: TranslationCache,
    page_table: PageTable,
    pool: FramePool,
    store: S,
    /// Completed translations
    total_accesses: u64,
    /// Pages loaded from the backing store
    page_faults: u64,
    log: TranslationLog,
}

impl<S: BackingStore> Translator<S> {
    /// Builds an empty address space over `store`.
    pub fn new(config: VmConfig, store: S) -> Result<Self> {
        config.validate()?;

        log::debug!(
            "address space: {} bits, {} byte pages, {} pages, {} frames, {} cache entries",
            config.address_bits,
            config.page_size,
            config.num_pages,
            config.num_frames,
            config.cache_capacity
        );

        Ok(Self {
            decoder: AddressDecoder::from_config(&config),
            cache: TranslationCache::new(config.cache_capacity),
            page_table: PageTable::new(config.num_pages),
            pool: FramePool::new(config.num_frames),
            store,
            total_accesses: 0,
            page_faults: 0,
            log: TranslationLog::new(),
            config,
        })
    }

    /// Translates `va`, loading its page on demand.
    ///
    /// A rejected address or a failed backing-store read leaves the counters
    /// and the log exactly as they were.
    pub fn translate(&mut self, va: VirtualAddress) -> Result<Translation> {
        let (page, offset) = match self.decoder.decode(va) {
            Ok(split) => split,
            Err(e) => {
                log::warn!("rejected address {}: {}", va, e);
                return Err(e);
            }
        };

        let (frame_index, outcome) = match self.cache.peek(page) {
            Some(frame_index) => (frame_index, LookupOutcome::CacheHit),
            None => match self.page_table.lookup(page) {
                Some(frame_index) => {
                    if self.config.promote_on_table_hit {
                        self.cache.insert(page, frame_index);
                    }
                    (frame_index, LookupOutcome::TableHit)
                }
                None => {
                    let frame_index = PageFaultHandler::new(
                        &self.store,
                        self.config.page_size,
                        &mut self.pool,
                        &mut self.page_table,
                        &mut self.cache,
                        &mut self.page_faults,
                    )
                    .fault(page)?;
                    (frame_index, LookupOutcome::PageFault)
                }
            },
        };

        // Every mapping points at a resident frame; a miss here is a bug
        let frame = self.pool.read(frame_index)?;

        self.cache.record_access(outcome == LookupOutcome::CacheHit);
        self.total_accesses += 1;

        let physical_address = PhysicalAddress::new(
            frame_index.as_u32() as u64 * self.config.page_size as u64 + offset.as_u32() as u64,
        );

        let translation = Translation {
            virtual_address: va,
            physical_address,
            page,
            frame_index,
            offset,
            outcome,
            frame,
        };

        let record = translation.to_record();
        log::trace!("{}", record);
        self.log.push(record);

        Ok(translation)
    }

    /// Translates every address from `addresses` in order.
    ///
    /// A rejected address or a short backing-store read skips that one
    /// request and the run carries on. Any other error, including one from
    /// the address source, ends the run.
    pub fn translate_all<I>(&mut self, addresses: I) -> Result<TraceReport>
    where
        I: IntoIterator<Item = Result<VirtualAddress>>,
    {
        self.drive(addresses, |_, _| {})
    }

    /// Runs a whole trace and persists the log and summary to `log_out`.
    ///
    /// `on_request` sees every completed translation and every rejected
    /// request as it happens. The log is written even when the run ends on
    /// an error, and that error is returned afterwards.
    pub fn replay<I, W, F>(
        &mut self,
        addresses: I,
        log_out: W,
        on_request: F,
    ) -> Result<TraceReport>
    where
        I: IntoIterator<Item = Result<VirtualAddress>>,
        W: Write,
        F: FnMut(VirtualAddress, std::result::Result<&Translation, &VmError>),
    {
        let run = self.drive(addresses, on_request);
        self.log.write_to(log_out, &self.summary())?;
        run
    }

    fn drive<I, F>(&mut self, addresses: I, mut on_request: F) -> Result<TraceReport>
    where
        I: IntoIterator<Item = Result<VirtualAddress>>,
        F: FnMut(VirtualAddress, std::result::Result<&Translation, &VmError>),
    {
        let mut report = TraceReport::default();
        for address in addresses {
            let address = address?;
            match self.translate(address) {
                Ok(translation) => {
                    report.completed += 1;
                    on_request(address, Ok(&translation));
                }
                Err(e) if e.is_request_error() => {
                    log::warn!("skipped address {}: {}", address, e);
                    report.rejected += 1;
                    on_request(address, Err(&e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Returns a snapshot of the counters.
    pub fn counters(&self) -> Counters {
        Counters {
            total_accesses: self.total_accesses,
            page_faults: self.page_faults,
            cache_hits: self.cache.hits(),
            cache_accesses: self.cache.accesses(),
        }
    }

    /// Page faults per hundred translations.
    pub fn page_fault_rate(&self) -> f64 {
        self.counters().page_fault_rate()
    }

    /// Cache hits per hundred cache lookups.
    pub fn cache_hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }

    /// Builds the end-of-run summary.
    pub fn summary(&self) -> Summary {
        Summary {
            address_bits: self.config.address_bits,
            page_size: self.config.page_size,
            num_pages: self.config.num_pages,
            num_frames: self.config.num_frames,
            cache_capacity: self.config.cache_capacity,
            counters: self.counters(),
        }
    }

    /// Checks that every mapping in both stores names its page's true rank
    /// in the frame pool.
    pub fn check_consistency(&self) -> Result<()> {
        let resident = self.pool.resident_pages();
        let entries = self
            .page_table
            .entries()
            .into_iter()
            .chain(self.cache.entries());

        for entry in entries {
            match resident.get(entry.frame.as_usize()) {
                Some(&page) if page == entry.page => {}
                _ => {
                    return Err(VmError::OutOfRange {
                        index: entry.frame,
                        len: resident.len(),
                    })
                }
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn frame_pool(&self) -> &FramePool {
        &self.pool
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn log(&self) -> &TranslationLog {
        &self.log
    }
}
