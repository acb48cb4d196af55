use crate::common::{FrameIndex, MappingEntry, PageNumber};
use crate::frame::FrameEvictionListener;

use super::MappingStore;

/// PageTable is the authoritative second-level record of resident pages.
/// Its capacity is the number of virtual pages; it shares the cache's
/// insertion-order eviction and renumbering rules.
#[derive(Debug)]
pub struct PageTable {
    store: MappingStore,
}

impl PageTable {
    /// Creates an empty page table covering `num_pages` virtual pages.
    pub fn new(num_pages: usize) -> Self {
        Self {
            store: MappingStore::new(num_pages),
        }
    }

    /// Returns the frame holding `page`, if resident.
    pub fn lookup(&self, page: PageNumber) -> Option<FrameIndex> {
        self.store.lookup(page)
    }

    /// Records `page -> frame`, evicting the oldest insertion when full.
    pub fn insert(&mut self, page: PageNumber, frame: FrameIndex) -> Option<MappingEntry> {
        let evicted = self.store.insert(page, frame);
        if let Some(entry) = evicted {
            log::debug!("page table full, dropped {} -> {}", entry.page, entry.frame);
        }
        evicted
    }

    /// See [`MappingStore::renumber_on_evict`].
    pub fn renumber_on_evict(&mut self, evicted: FrameIndex) -> Option<MappingEntry> {
        self.store.renumber_on_evict(evicted)
    }

    pub fn entries(&self) -> Vec<MappingEntry> {
        self.store.entries()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }
}

impl FrameEvictionListener for PageTable {
    fn on_frame_evicted(&mut self, evicted: FrameIndex) {
        self.store.on_frame_evicted(evicted);
    }
}
