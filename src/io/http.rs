use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderMap, RANGE};
use reqwest::{Client, StatusCode};

use super::ReadAt;

/// Attempts per ranged request on timeouts and connection failures
const MAX_ATTEMPTS: u32 = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote package file read with HTTP Range requests.
///
/// Every [`read_at`](ReadAt::read_at) is a `GET` for exactly the requested
/// span, so callers only pay for the bytes they ask for.
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
    requests: AtomicU64,
}

impl HttpRangeReader {
    /// Open `url` with a default client.
    pub async fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(client, url).await
    }

    /// Open `url`, sending a `HEAD` request through `client` to learn its size.
    ///
    /// Fails unless the server reports a length and byte-range support.
    pub async fn with_client(client: Client, url: String) -> Result<Self> {
        let resp = client
            .head(&url)
            .send()
            .await
            .with_context(|| format!("HEAD {}", url))?;
        if !resp.status().is_success() {
            bail!("HEAD {} failed with status: {}", url, resp.status());
        }
        let size = ranged_length(resp.headers()).with_context(|| format!("HEAD {}", url))?;

        debug!("{} is {} bytes", url, size);

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
            requests: AtomicU64::new(0),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Content bytes received so far
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// Ranged `GET` requests answered so far
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Fetch bytes `start..=end` into the front of `buf`.
    ///
    /// Timeouts and connection failures are retried with a linear backoff.
    /// Returns the number of bytes copied, which may be short if the server
    /// sends less than asked.
    async fn fetch(&self, start: u64, end: u64, buf: &mut [u8]) -> Result<usize> {
        let range = format!("bytes={}-{}", start, end);
        let mut attempt = 1;

        let resp = loop {
            match self.client.get(&self.url).header(RANGE, &range).send().await {
                Ok(resp) => break resp,
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < MAX_ATTEMPTS => {
                    warn!(
                        "{} ({}): attempt {}/{} failed: {}",
                        self.url, range, attempt, MAX_ATTEMPTS, e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                    attempt += 1;
                }
                Err(e) => return Err(e).with_context(|| format!("GET {} ({})", self.url, range)),
            }
        };

        // A plain 200 would carry the whole file from offset zero
        if resp.status() != StatusCode::PARTIAL_CONTENT {
            bail!("GET {} ({}) failed with status: {}", self.url, range, resp.status());
        }

        let bytes = resp.bytes().await?;
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);

        self.requests.fetch_add(1, Ordering::Relaxed);
        self.transferred_bytes.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }

        let len = (self.size - offset).min(buf.len() as u64) as usize;
        let last = offset + len as u64 - 1;

        let mut received = 0;
        while received < len {
            let start = offset + received as u64;
            let n = self.fetch(start, last, &mut buf[received..len]).await?;
            if n == 0 {
                bail!("empty response for bytes {}-{} of {}", start, last, self.url);
            }
            received += n;
        }

        Ok(received)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Length of a resource whose `HEAD` response advertises byte ranges.
fn ranged_length(headers: &HeaderMap) -> Result<u64> {
    let accepts_bytes = headers
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|unit| unit.trim() == "bytes"));
    if !accepts_bytes {
        bail!("server does not support Range requests");
    }

    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| anyhow!("server did not return a usable Content-Length"))
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(pairs: &[(reqwest::header::HeaderName, &'static str)]) -> HeaderMap {
        pairs
            .iter()
            .map(|(name, value)| (name.clone(), HeaderValue::from_static(*value)))
            .collect()
    }

    #[test]
    fn test_ranged_length() {
        let map = headers(&[(ACCEPT_RANGES, "bytes"), (CONTENT_LENGTH, "1024")]);
        assert_eq!(ranged_length(&map).unwrap(), 1024);

        let map = headers(&[(ACCEPT_RANGES, "none, bytes"), (CONTENT_LENGTH, " 7 ")]);
        assert_eq!(ranged_length(&map).unwrap(), 7);
    }

    #[test]
    fn test_ranged_length_requires_byte_ranges() {
        for map in [
            headers(&[(CONTENT_LENGTH, "1024")]),
            headers(&[(ACCEPT_RANGES, "none"), (CONTENT_LENGTH, "1024")]),
        ] {
            let err = ranged_length(&map).unwrap_err();
            assert!(err.to_string().contains("Range"), "{err}");
        }
    }

    #[test]
    fn test_ranged_length_requires_length() {
        for map in [
            headers(&[(ACCEPT_RANGES, "bytes")]),
            headers(&[(ACCEPT_RANGES, "bytes"), (CONTENT_LENGTH, "lots")]),
        ] {
            let err = ranged_length(&map).unwrap_err();
            assert!(err.to_string().contains("Content-Length"), "{err}");
        }
    }
}
