use std::io::{self, Read};
use std::sync::Arc;

use tokio::runtime::Handle;

use super::ReadAt;
use crate::ar::Skip;

/// Sequential, synchronous view of a [`ReadAt`] source.
///
/// Each read becomes one positional read on the source, driven to
/// completion on `handle`. Skipping only moves the position, so an
/// [`ar::Reader`](crate::ar::Reader) built with
/// [`with_skip`](crate::ar::Reader::with_skip) fetches member headers and the
/// content it actually reads, nothing else.
///
/// The reader blocks the calling thread. Use it from
/// [`spawn_blocking`](tokio::task::spawn_blocking), never inside an async task.
pub struct BlockingReader {
    source: Arc<dyn ReadAt>,
    handle: Handle,
    position: u64,
}

impl BlockingReader {
    pub fn new(source: Arc<dyn ReadAt>, handle: Handle) -> Self {
        Self {
            source,
            handle,
            position: 0,
        }
    }

    /// Offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Read for BlockingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.position >= self.source.size() {
            return Ok(0);
        }

        let n = self
            .handle
            .block_on(self.source.read_at(self.position, buf))
            .map_err(|err| err.downcast::<io::Error>().unwrap_or_else(io::Error::other))?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Skip for BlockingReader {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let skipped = n.min(self.source.size().saturating_sub(self.position));
        self.position += skipped;
        Ok(skipped)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use anyhow::{Result, bail};
    use async_trait::async_trait;

    use super::*;

    /// In-memory source that records how many bytes were fetched.
    struct MemorySource {
        data: Vec<u8>,
        fetched: AtomicU64,
        broken: bool,
    }

    impl MemorySource {
        fn new(data: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                data: data.to_vec(),
                fetched: AtomicU64::new(0),
                broken: false,
            })
        }
    }

    #[async_trait]
    impl ReadAt for MemorySource {
        async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
            if self.broken {
                bail!("connection reset");
            }
            let start = (offset as usize).min(self.data.len());
            let n = buf.len().min(self.data.len() - start);
            buf[..n].copy_from_slice(&self.data[start..start + n]);
            self.fetched.fetch_add(n as u64, Ordering::Relaxed);
            Ok(n)
        }

        fn size(&self) -> u64 {
            self.data.len() as u64
        }
    }

    #[test]
    fn test_read_and_skip() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = MemorySource::new(b"0123456789");
        let mut reader = BlockingReader::new(source.clone(), runtime.handle().clone());

        let mut buf = [0u8; 3];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"012");

        assert_eq!(reader.skip(4).unwrap(), 4);
        assert_eq!(reader.position(), 7);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"789");
        assert_eq!(source.fetched.load(Ordering::Relaxed), 6);

        assert_eq!(reader.skip(5).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_skip_stops_at_end() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = MemorySource::new(b"abcdef");
        let mut reader = BlockingReader::new(source, runtime.handle().clone());

        assert_eq!(reader.skip(4).unwrap(), 4);
        assert_eq!(reader.skip(10).unwrap(), 2);
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_source_errors_become_io_errors() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = Arc::new(MemorySource {
            data: b"abc".to_vec(),
            fetched: AtomicU64::new(0),
            broken: true,
        });
        let mut reader = BlockingReader::new(source, runtime.handle().clone());

        let err = reader.read(&mut [0u8; 2]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.to_string().contains("connection reset"), "{err}");
    }

    #[test]
    fn test_archive_walk_fetches_headers_only() {
        let mut data = b"!<arch>\n".to_vec();
        let members = [
            ("debian-binary", 4usize),
            ("control.tar.gz", 999),
            ("data.tar.gz", 200_000),
        ];
        for (name, size) in members {
            let header = format!(
                "{:<16}{:<12}{:<6}{:<6}{:<8}{:<10}`\n",
                name, 0, 0, 0, 100644, size
            );
            data.extend_from_slice(header.as_bytes());
            data.resize(data.len() + size, b'x');
            if size % 2 == 1 {
                data.push(b'\n');
            }
        }

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = MemorySource::new(&data);
        let reader = BlockingReader::new(source.clone(), runtime.handle().clone());
        let mut archive = crate::ar::Reader::with_skip(reader);

        let mut names = Vec::new();
        while let Some(header) = archive.next().unwrap() {
            names.push(header.name);
        }
        assert_eq!(names, vec!["debian-binary", "control.tar.gz", "data.tar.gz"]);
        // magic, three headers and one pad byte
        assert_eq!(source.fetched.load(Ordering::Relaxed), 8 + 3 * 60 + 1);
    }
}
