use crate::common::{FrameIndex, PageNumber, Result};
use crate::frame::{Frame, FrameEvictionListener, FramePool};
use crate::mapping::{PageTable, TranslationCache};
use crate::storage::BackingStore;

/// PageFaultHandler brings a missing page into memory.
///
/// It borrows the translator's state for the duration of one fault: the
/// backing store to read from, the frame pool to install into, and both
/// mapping stores to register the new mapping in.
pub struct PageFaultHandler<'a, S: BackingStore> {
    store: &'a S,
    page_size: u32,
    pool: &'a mut FramePool,
    page_table: &'a mut PageTable,
    cache: &'a mut TranslationCache,
    page_faults: &'a mut u64,
}

impl<'a, S: BackingStore> PageFaultHandler<'a, S> {
    pub fn new(
        store: &'a S,
        page_size: u32,
        pool: &'a mut FramePool,
        page_table: &'a mut PageTable,
        cache: &'a mut TranslationCache,
        page_faults: &'a mut u64,
    ) -> Self {
        Self {
            store,
            page_size,
            pool,
            page_table,
            cache,
            page_faults,
        }
    }

    /// Loads `page` and returns the frame index it now occupies, which is
    /// always the highest index in the pool.
    ///
    /// The page is read before anything is evicted, so a failed read leaves
    /// the pool, both stores and the fault counter untouched.
    pub fn fault(&mut self, page: PageNumber) -> Result<FrameIndex> {
        let data = self.store.read_page(page, self.page_size)?;

        if self.pool.is_full() {
            let mut listeners: [&mut dyn FrameEvictionListener; 2] =
                [&mut *self.page_table, &mut *self.cache];
            self.pool.evict_oldest(&mut listeners);
        }

        let frame_index = self.pool.admit(Frame::new(page, data))?;
        debug_assert_eq!(frame_index.as_usize(), self.pool.len() - 1);

        self.page_table.insert(page, frame_index);
        self.cache.insert(page, frame_index);

        *self.page_faults += 1;

        log::debug!("page fault: loaded {} into {}", page, frame_index);

        Ok(frame_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::VmError;
    use crate::storage::MemoryBackingStore;

    const PAGE_SIZE: u32 = 16;

    struct Fixture {
        store: MemoryBackingStore,
        pool: FramePool,
        page_table: PageTable,
        cache: TranslationCache,
        page_faults: u64,
    }

    impl Fixture {
        fn new(num_frames: usize, cache_capacity: usize) -> Self {
            Self {
                store: MemoryBackingStore::from_fn(8, PAGE_SIZE, |page, _| page as u8),
                pool: FramePool::new(num_frames),
                page_table: PageTable::new(8),
                cache: TranslationCache::new(cache_capacity),
                page_faults: 0,
            }
        }

        fn fault(&mut self, page: u64) -> Result<FrameIndex> {
            PageFaultHandler::new(
                &self.store,
                PAGE_SIZE,
                &mut self.pool,
                &mut self.page_table,
                &mut self.cache,
                &mut self.page_faults,
            )
            .fault(PageNumber::new(page))
        }
    }

    #[test]
    fn test_fault_installs_page() {
        let mut fx = Fixture::new(4, 4);

        assert_eq!(fx.fault(3).unwrap(), FrameIndex::new(0));
        assert_eq!(fx.fault(5).unwrap(), FrameIndex::new(1));

        assert_eq!(fx.page_faults, 2);
        assert_eq!(fx.page_table.lookup(PageNumber::new(5)), Some(FrameIndex::new(1)));
        assert_eq!(fx.cache.peek(PageNumber::new(3)), Some(FrameIndex::new(0)));

        let frame = fx.pool.read(FrameIndex::new(1)).unwrap();
        assert_eq!(frame.page(), PageNumber::new(5));
        assert!(frame.data().iter().all(|&b| b == 5));
    }

    #[test]
    fn test_fault_recycles_oldest_frame() {
        let mut fx = Fixture::new(2, 4);
        fx.fault(0).unwrap();
        fx.fault(1).unwrap();

        assert_eq!(fx.fault(2).unwrap(), FrameIndex::new(1));

        assert_eq!(fx.page_table.lookup(PageNumber::new(0)), None);
        assert_eq!(fx.cache.peek(PageNumber::new(0)), None);
        assert_eq!(fx.page_table.lookup(PageNumber::new(1)), Some(FrameIndex::new(0)));
        assert_eq!(fx.cache.peek(PageNumber::new(1)), Some(FrameIndex::new(0)));
        assert_eq!(
            fx.pool.resident_pages(),
            vec![PageNumber::new(1), PageNumber::new(2)]
        );
    }

    #[test]
    fn test_failed_read_changes_nothing() {
        let mut fx = Fixture::new(1, 1);
        fx.fault(0).unwrap();

        let err = fx.fault(100).unwrap_err();
        assert!(matches!(err, VmError::BackingStore { .. }));

        assert_eq!(fx.page_faults, 1);
        assert_eq!(fx.pool.resident_pages(), vec![PageNumber::new(0)]);
        assert_eq!(fx.page_table.lookup(PageNumber::new(0)), Some(FrameIndex::new(0)));
        assert_eq!(fx.cache.peek(PageNumber::new(0)), Some(FrameIndex::new(0)));
    }
}
