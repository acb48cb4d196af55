use bytes::Bytes;

use crate::common::{Offset, PageNumber};

/// Frame holds the contents of one resident page.
///
/// The bytes are read once from the backing store and never modified, so
/// handing out a `Frame` is a reference-counted clone, not a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The virtual page loaded into this frame
    page: PageNumber,
    /// Page contents, exactly one page long
    data: Bytes,
}

impl Frame {
    /// Creates a frame holding `data` for `page`.
    pub fn new(page: PageNumber, data: impl Into<Bytes>) -> Self {
        Self {
            page,
            data: data.into(),
        }
    }

    /// Returns the page stored in this frame.
    pub fn page(&self) -> PageNumber {
        self.page
    }

    /// Returns the page contents.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the size of the frame in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the byte at `offset`, if it lies within the frame.
    pub fn byte_at(&self, offset: Offset) -> Option<u8> {
        self.data.get(offset.as_usize()).copied()
    }
}
