use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};

use crate::common::{Result, VirtualAddress, VmError, ADDRESS_QUEUE_DEPTH};

/// Parses one line of an address list.
///
/// Accepts decimal or `0x`-prefixed hexadecimal. Blank lines and lines
/// starting with `#` yield `Ok(None)`. `line` is 1-based and only used for
/// error reporting.
pub fn parse_line(line: usize, text: &str) -> Result<Option<VirtualAddress>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };

    parsed
        .map(|address| Some(VirtualAddress::new(address)))
        .map_err(|_| VmError::AddressParse {
            line,
            text: trimmed.to_string(),
        })
}

/// AddressStream reads an address list on a background worker thread and
/// hands parsed addresses to the consumer through a bounded queue.
///
/// The stream ends after the last address, or right after the first error.
pub struct AddressStream {
    /// Parsed addresses, in file order
    receiver: Receiver<Result<VirtualAddress>>,
    /// Flag to signal shutdown
    shutdown: Arc<AtomicBool>,
    /// Handle to the background worker thread
    worker_handle: Option<JoinHandle<()>>,
}

impl AddressStream {
    /// Opens the address list at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Streams addresses out of any buffered reader.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (sender, receiver) = bounded::<Result<VirtualAddress>>(ADDRESS_QUEUE_DEPTH);
        let shutdown = Arc::new(AtomicBool::new(false));

        let shutdown_clone = Arc::clone(&shutdown);

        let worker_handle = thread::spawn(move || {
            Self::start_worker_thread(reader, sender, shutdown_clone);
        });

        Self {
            receiver,
            shutdown,
            worker_handle: Some(worker_handle),
        }
    }

    /// The background worker thread function.
    /// Parses lines until end of input, the first error, or shutdown.
    fn start_worker_thread<R: BufRead>(
        reader: R,
        sender: Sender<Result<VirtualAddress>>,
        shutdown: Arc<AtomicBool>,
    ) {
        for (i, line) in reader.lines().enumerate() {
            let item = match line {
                Ok(text) => match parse_line(i + 1, &text) {
                    Ok(Some(address)) => Ok(address),
                    Ok(None) => continue,
                    Err(e) => Err(e),
                },
                Err(e) => Err(VmError::Io(e)),
            };

            let failed = item.is_err();
            if !Self::deliver(&sender, &shutdown, item) || failed {
                break;
            }
        }
    }

    /// Sends one item, waking periodically to check the shutdown flag.
    /// Returns false once the consumer is gone or shutdown was requested.
    fn deliver(
        sender: &Sender<Result<VirtualAddress>>,
        shutdown: &AtomicBool,
        mut item: Result<VirtualAddress>,
    ) -> bool {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return false;
            }

            match sender.send_timeout(item, Duration::from_millis(100)) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(returned)) => item = returned,
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}

impl Iterator for AddressStream {
    type Item = Result<VirtualAddress>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.receiver.recv() {
            Ok(item) => Some(item),
            Err(_) => {
                // Worker exited; surface a panic instead of a silent end
                let handle = self.worker_handle.take()?;
                match handle.join() {
                    Ok(()) => None,
                    Err(_) => Some(Err(VmError::AddressStream(
                        "address reader thread panicked".to_string(),
                    ))),
                }
            }
        }
    }
}

impl Drop for AddressStream {
    fn drop(&mut self) {
        // Signal shutdown
        self.shutdown.store(true, Ordering::SeqCst);

        // Wait for worker thread to finish
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_line_formats() {
        assert_eq!(parse_line(1, "42").unwrap(), Some(VirtualAddress::new(42)));
        assert_eq!(
            parse_line(1, "  0x1F4 ").unwrap(),
            Some(VirtualAddress::new(500))
        );
        assert_eq!(parse_line(1, "0XFF").unwrap(), Some(VirtualAddress::new(255)));
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(1, "# comment").unwrap(), None);
    }

    #[test]
    fn test_parse_line_rejects_garbage() {
        let err = parse_line(7, "12ab").unwrap_err();
        match err {
            VmError::AddressParse { line, text } => {
                assert_eq!(line, 7);
                assert_eq!(text, "12ab");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_line(1, "-5").is_err());
    }

    #[test]
    fn test_address_stream_reads_in_order() {
        let input = "16916\n# skip\n\n62493\n0x7530\n";
        let stream = AddressStream::from_reader(Cursor::new(input));
        let addresses: Vec<_> = stream.map(|r| r.unwrap()).collect();
        assert_eq!(
            addresses,
            vec![
                VirtualAddress::new(16916),
                VirtualAddress::new(62493),
                VirtualAddress::new(30000),
            ]
        );
    }

    #[test]
    fn test_address_stream_stops_after_error() {
        let input = "1\nbogus\n3\n";
        let mut stream = AddressStream::from_reader(Cursor::new(input));
        assert_eq!(stream.next().unwrap().unwrap(), VirtualAddress::new(1));
        assert!(matches!(
            stream.next(),
            Some(Err(VmError::AddressParse { line: 2, .. }))
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_address_stream_drop_before_drain() {
        let input: String = (0..(ADDRESS_QUEUE_DEPTH * 4))
            .map(|i| format!("{i}\n"))
            .collect();
        let mut stream = AddressStream::from_reader(Cursor::new(input));
        assert_eq!(stream.next().unwrap().unwrap(), VirtualAddress::new(0));
        drop(stream);
    }
}
