use std::collections::{HashMap, VecDeque};

use crate::common::{FrameIndex, MappingEntry, PageNumber};
use crate::frame::FrameEvictionListener;

/// Fixed-capacity page -> frame store with insertion-order eviction.
///
/// Entries live in an arena of slots. A FIFO queue of slot ids records
/// insertion order for capacity eviction, and a hash index maps each page to
/// its slot. Lookups never reorder anything: the oldest-inserted entry is
/// always the next capacity victim regardless of how often it was read.
///
/// Frame indices stored here are residency ranks in the frame pool, so the
/// store must be renumbered every time the pool retires its oldest frame.
#[derive(Debug)]
pub struct MappingStore {
    /// Maximum number of live entries
    capacity: usize,
    /// Entry arena; `None` marks a free slot
    slots: Vec<Option<MappingEntry>>,
    /// Free slot ids available for reuse
    free_slots: Vec<usize>,
    /// Live slot ids, oldest insertion at the front
    order: VecDeque<usize>,
    /// Page -> slot id
    index: HashMap<PageNumber, usize>,
}

impl MappingStore {
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "mapping store capacity must be positive");
        Self {
            capacity,
            slots: Vec::new(),
            free_slots: Vec::new(),
            order: VecDeque::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the frame mapped to `page`, if any. Never mutates the store.
    pub fn lookup(&self, page: PageNumber) -> Option<FrameIndex> {
        self.index
            .get(&page)
            .and_then(|&slot| self.slots[slot])
            .map(|entry| entry.frame)
    }

    /// Inserts `page -> frame`.
    ///
    /// If the page is already mapped, its frame is replaced and it moves to
    /// the newest end. Otherwise, when the store is full, the oldest-inserted
    /// entry is evicted first and returned.
    pub fn insert(&mut self, page: PageNumber, frame: FrameIndex) -> Option<MappingEntry> {
        let entry = MappingEntry::new(page, frame);

        if let Some(&slot) = self.index.get(&page) {
            self.slots[slot] = Some(entry);
            self.order.retain(|&s| s != slot);
            self.order.push_back(slot);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };

        self.order.push_back(slot);
        self.index.insert(page, slot);

        evicted
    }

    /// Removes and returns the oldest-inserted entry.
    pub fn evict_oldest(&mut self) -> Option<MappingEntry> {
        let slot = self.order.pop_front()?;
        self.release(slot)
    }

    /// Applies the frame pool's eviction to every entry.
    ///
    /// The entry holding `evicted` is removed and returned; every entry with
    /// a higher rank moves down by one. The pool only ever vacates rank 0,
    /// so in practice every surviving entry is decremented. When no entry
    /// holds `evicted` nothing is removed but the shift still applies.
    pub fn renumber_on_evict(&mut self, evicted: FrameIndex) -> Option<MappingEntry> {
        let mut removed = None;

        for slot in 0..self.slots.len() {
            let Some(entry) = self.slots[slot].as_mut() else {
                continue;
            };

            if entry.frame == evicted {
                let entry = *entry;
                self.order.retain(|&s| s != slot);
                self.release(slot);
                removed.get_or_insert(entry);
            } else if entry.frame > evicted {
                entry.frame = FrameIndex::new(entry.frame.as_u32() - 1);
            }
        }

        removed
    }

    /// Returns true if `page` is mapped.
    pub fn contains(&self, page: PageNumber) -> bool {
        self.index.contains_key(&page)
    }

    /// Returns the live entries, oldest insertion first.
    pub fn entries(&self) -> Vec<MappingEntry> {
        self.order
            .iter()
            .filter_map(|&slot| self.slots[slot])
            .collect()
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frees an arena slot that has already been unlinked from `order`.
    fn release(&mut self, slot: usize) -> Option<MappingEntry> {
        let entry = self.slots[slot].take()?;
        self.index.remove(&entry.page);
        self.free_slots.push(slot);
        Some(entry)
    }
}

impl FrameEvictionListener for MappingStore {
    fn on_frame_evicted(&mut self, evicted: FrameIndex) {
        self.renumber_on_evict(evicted);
    }
}
