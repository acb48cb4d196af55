use bytes::Bytes;

use crate::common::{PageNumber, Result, VmError};

/// Read-only source of page contents. Page `k` lives at byte offset
/// `k * page_size`.
pub trait BackingStore {
    /// Fills `buf` with the bytes starting at `offset`.
    /// Fails with `BackingStore` if fewer than `buf.len()` bytes are available.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Returns the store size in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads one whole page.
    fn read_page(&self, page: PageNumber, page_size: u32) -> Result<Bytes> {
        let offset = page
            .as_u64()
            .checked_mul(page_size as u64)
            .ok_or(VmError::BackingStore {
                offset: u64::MAX,
                requested: page_size as usize,
                available: 0,
            })?;

        let mut data = vec![0u8; page_size as usize];
        self.read_at(offset, &mut data)?;
        Ok(Bytes::from(data))
    }
}

/// In-memory backing store
#[derive(Debug, Clone, Default)]
pub struct MemoryBackingStore {
    data: Bytes,
}

impl MemoryBackingStore {
    /// Wraps `data` as a backing store.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Builds a store of `num_pages` pages where byte `i` of page `p` is
    /// `f(p, i)`.
    pub fn from_fn(num_pages: u64, page_size: u32, f: impl Fn(u64, u32) -> u8) -> Self {
        let mut data = Vec::with_capacity((num_pages * page_size as u64) as usize);
        for page in 0..num_pages {
            for i in 0..page_size {
                data.push(f(page, i));
            }
        }
        Self::new(data)
    }
}

impl BackingStore for MemoryBackingStore {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let len = self.data.len() as u64;
        let end = offset.checked_add(buf.len() as u64);

        match end {
            Some(end) if end <= len => {
                buf.copy_from_slice(&self.data[offset as usize..end as usize]);
                Ok(())
            }
            _ => Err(VmError::BackingStore {
                offset,
                requested: buf.len(),
                available: len.saturating_sub(offset),
            }),
        }
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backing_store_read_page() {
        let store = MemoryBackingStore::from_fn(4, 16, |page, i| (page * 16 + i as u64) as u8);
        assert_eq!(store.len(), 64);

        let page = store.read_page(PageNumber::new(2), 16).unwrap();
        assert_eq!(page.len(), 16);
        assert_eq!(page[0], 32);
        assert_eq!(page[15], 47);
    }

    #[test]
    fn test_memory_backing_store_short_read() {
        let store = MemoryBackingStore::new(vec![0u8; 40]);
        let err = store.read_page(PageNumber::new(2), 16).unwrap_err();
        match err {
            VmError::BackingStore {
                offset,
                requested,
                available,
            } => {
                assert_eq!(offset, 32);
                assert_eq!(requested, 16);
                assert_eq!(available, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_memory_backing_store_past_end() {
        let store = MemoryBackingStore::new(vec![0u8; 16]);
        let mut buf = [0u8; 4];
        assert!(matches!(
            store.read_at(100, &mut buf),
            Err(VmError::BackingStore { available: 0, .. })
        ));
        assert!(store.read_at(12, &mut buf).is_ok());
    }
}
