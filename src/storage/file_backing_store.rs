use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{Result, VmError};

use super::BackingStore;

/// FileBackingStore serves page contents from a file opened read-only.
/// The simulator never writes back, so short reads are reported as errors
/// rather than zero-filled.
pub struct FileBackingStore {
    /// The backing file
    file: Mutex<File>,
    /// Path to the backing file
    path: String,
    /// File size in bytes, fixed at open
    len: u64,
    /// Number of reads performed
    num_reads: AtomicU64,
}

impl FileBackingStore {
    /// Opens the file at `path`. The file must already exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let file = File::open(&path)?;
        let len = file.metadata()?.len();

        log::debug!("opened backing store {} ({} bytes)", path_str, len);

        Ok(Self {
            file: Mutex::new(file),
            path: path_str,
            len,
            num_reads: AtomicU64::new(0),
        })
    }

    /// Returns the number of reads performed.
    pub fn num_reads(&self) -> u64 {
        self.num_reads.load(Ordering::Relaxed)
    }

    /// Returns the path to the backing file.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl BackingStore for FileBackingStore {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let requested = buf.len();
        let short_read = || VmError::BackingStore {
            offset,
            requested,
            available: self.len.saturating_sub(offset),
        };

        match offset.checked_add(requested as u64) {
            Some(end) if end <= self.len => {}
            _ => {
                log::warn!(
                    "backing store {}: read of {} bytes at {} runs past end ({} bytes)",
                    self.path,
                    requested,
                    offset,
                    self.len
                );
                return Err(short_read());
            }
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => short_read(),
            _ => VmError::Io(e),
        })?;

        self.num_reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn len(&self) -> u64 {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageNumber;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store_with(bytes: &[u8]) -> (FileBackingStore, NamedTempFile) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(bytes).unwrap();
        temp_file.flush().unwrap();
        let store = FileBackingStore::open(temp_file.path()).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_file_backing_store_open() {
        let (store, temp) = store_with(&[0u8; 512]);
        assert_eq!(store.len(), 512);
        assert_eq!(store.num_reads(), 0);
        assert_eq!(store.path(), temp.path().to_string_lossy());
    }

    #[test]
    fn test_file_backing_store_read_page() {
        let mut data = vec![0u8; 1024];
        data[256] = 42;
        data[511] = 255;
        let (store, _temp) = store_with(&data);

        let page = store.read_page(PageNumber::new(1), 256).unwrap();
        assert_eq!(page[0], 42);
        assert_eq!(page[255], 255);
        assert_eq!(store.num_reads(), 1);
    }

    #[test]
    fn test_file_backing_store_short_read() {
        let (store, _temp) = store_with(&[7u8; 300]);

        let err = store.read_page(PageNumber::new(1), 256).unwrap_err();
        assert!(matches!(
            err,
            VmError::BackingStore {
                offset: 256,
                requested: 256,
                available: 44
            }
        ));
        assert_eq!(store.num_reads(), 0);
    }

    #[test]
    fn test_file_backing_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileBackingStore::open(dir.path().join("missing.bin"));
        assert!(matches!(result, Err(VmError::Io(_))));
    }
}
