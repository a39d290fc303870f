//! Byte sources a package can be fetched from.
//!
//! A package lives in a local file or on a web server that answers HTTP
//! Range requests. Either source can be read whole with
//! [`ReadAt::read_all`], or streamed through a [`BlockingReader`] so a
//! synchronous parser only fetches the spans it consumes.

mod blocking;
mod http;
mod local;

pub use blocking::BlockingReader;
pub use http::HttpRangeReader;
pub use local::LocalFileReader;

use anyhow::{Result, bail};
use async_trait::async_trait;

/// Largest span fetched by a single [`ReadAt::read_all`] step.
pub const READ_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Read the entire source into memory, chunk by chunk.
    async fn read_all(&self) -> Result<Vec<u8>> {
        let size = usize::try_from(self.size())?;
        let mut data = vec![0u8; size];

        let mut offset = 0;
        while offset < size {
            let end = (offset + READ_CHUNK_SIZE).min(size);
            let n = self.read_at(offset as u64, &mut data[offset..end]).await?;
            if n == 0 {
                bail!("source ended after {} of {} bytes", offset, size);
            }
            offset += n;
        }

        Ok(data)
    }
}
