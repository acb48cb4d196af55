use crate::common::{FrameIndex, MappingEntry, PageNumber};
use crate::frame::FrameEvictionListener;

use super::MappingStore;

/// TranslationCache is the small first-level lookup in front of the page
/// table. It evicts in insertion order when full and keeps hit statistics.
#[derive(Debug)]
pub struct TranslationCache {
    /// Cached mappings
    store: MappingStore,
    /// Lookups that found a mapping
    hits: u64,
    /// All counted lookups
    accesses: u64,
}

impl TranslationCache {
    /// Creates an empty cache with room for `capacity` mappings.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: MappingStore::new(capacity),
            hits: 0,
            accesses: 0,
        }
    }

    /// Looks up `page` and counts the access.
    pub fn lookup(&mut self, page: PageNumber) -> Option<FrameIndex> {
        let frame = self.peek(page);
        self.record_access(frame.is_some());
        frame
    }

    /// Looks up `page` without touching the statistics.
    pub fn peek(&self, page: PageNumber) -> Option<FrameIndex> {
        self.store.lookup(page)
    }

    /// Counts one lookup, previously made with [`peek`](Self::peek).
    pub fn record_access(&mut self, hit: bool) {
        self.accesses += 1;
        if hit {
            self.hits += 1;
        }
    }

    /// Caches `page -> frame`, evicting the oldest insertion when full.
    pub fn insert(&mut self, page: PageNumber, frame: FrameIndex) -> Option<MappingEntry> {
        let evicted = self.store.insert(page, frame);
        if let Some(entry) = evicted {
            log::trace!("translation cache dropped {} -> {}", entry.page, entry.frame);
        }
        evicted
    }

    /// See [`MappingStore::renumber_on_evict`].
    pub fn renumber_on_evict(&mut self, evicted: FrameIndex) -> Option<MappingEntry> {
        self.store.renumber_on_evict(evicted)
    }

    /// Hit percentage in `[0, 100]`; zero before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64 * 100.0
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
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

impl FrameEvictionListener for TranslationCache {
    fn on_frame_evicted(&mut self, evicted: FrameIndex) {
        self.store.on_frame_evicted(evicted);
    }
}
