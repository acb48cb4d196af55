use std::collections::VecDeque;

use crate::common::{FrameIndex, PageNumber, Result, VmError};

use super::Frame;

/// Receives the frame pool's eviction notice.
///
/// Anything that stores frame indices implements this so it can renumber
/// when the pool retires a frame. The pool only ever vacates
/// [`FrameIndex::OLDEST`].
pub trait FrameEvictionListener {
    fn on_frame_evicted(&mut self, evicted: FrameIndex);
}

/// FramePool is the fixed set of physical frames, occupied as a strict FIFO
/// queue. A frame's index is its rank in that queue: index 0 is the oldest
/// resident page and the next to be evicted, and a newly admitted frame
/// always receives the highest index.
#[derive(Debug)]
pub struct FramePool {
    /// Number of physical frames
    capacity: usize,
    /// Resident frames, oldest at the front
    frames: VecDeque<Frame>,
}

impl FramePool {
    /// Creates an empty pool of `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "frame pool capacity must be positive");
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns true if every frame is occupied.
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    /// Appends `frame` at the newest end and returns its index.
    /// Fails with `PoolFull` if the caller did not evict first.
    pub fn admit(&mut self, frame: Frame) -> Result<FrameIndex> {
        if self.is_full() {
            return Err(VmError::PoolFull);
        }

        self.frames.push_back(frame);
        Ok(FrameIndex::new((self.frames.len() - 1) as u32))
    }

    /// Retires the oldest frame and tells every listener that index 0 was
    /// vacated, so that their stored indices keep matching residency rank.
    ///
    /// This is the only place a frame leaves the pool. Returns `None`, and
    /// notifies nobody, if the pool is empty.
    pub fn evict_oldest(
        &mut self,
        listeners: &mut [&mut dyn FrameEvictionListener],
    ) -> Option<Frame> {
        let frame = self.frames.pop_front()?;

        for listener in listeners.iter_mut() {
            listener.on_frame_evicted(FrameIndex::OLDEST);
        }

        log::debug!(
            "evicted {} from {}, {} frames remain",
            frame.page(),
            FrameIndex::OLDEST,
            self.frames.len()
        );

        Some(frame)
    }

    /// Returns the frame at `index`.
    /// Fails with `OutOfRange` if no frame has that rank.
    pub fn read(&self, index: FrameIndex) -> Result<Frame> {
        self.frames
            .get(index.as_usize())
            .cloned()
            .ok_or(VmError::OutOfRange {
                index,
                len: self.frames.len(),
            })
    }

    /// Returns the resident pages in rank order, oldest first.
    pub fn resident_pages(&self) -> Vec<PageNumber> {
        self.frames.iter().map(Frame::page).collect()
    }

    /// Returns the number of resident frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the number of physical frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
