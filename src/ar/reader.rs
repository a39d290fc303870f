//! Streaming ar archive reader.
//!
//! This module walks an ar archive front to back over any [`Read`]
//! implementation. Nothing is buffered beyond a single 60-byte member header,
//! so the reader works equally well on files, pipes and decompressed streams.
//!
//! ## Reading Strategy
//!
//! ar archives can only be read forwards:
//! 1. Check the 8-byte global magic once, on the first call to [`Reader::next`]
//! 2. Read a 60-byte member header and parse its fixed-width text fields
//! 3. Hand out at most `size` bytes of member content through [`Read`]
//! 4. On the next advance, discard unread content and the optional pad byte
//!
//! Any failure is sticky: the reader remembers the error and returns it from
//! every later call without touching the stream again.
//!
//! Streams that implement [`Skip`] can discard unread content without
//! transferring it, which matters when every byte is a network fetch.

use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::str;

use log::trace;

use super::error::{Error, Result};
use super::structures::*;

/// A stream that can move forward without producing the bytes it passes.
pub trait Skip: Read {
    /// Advance past up to `n` bytes, returning how many were skipped.
    ///
    /// Fewer than `n` means the stream ended.
    fn skip(&mut self, n: u64) -> io::Result<u64>;
}

impl<R: Skip> Skip for BufReader<R> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let buffered = (self.buffer().len() as u64).min(n);
        self.consume(buffered as usize);
        if buffered == n {
            return Ok(n);
        }
        Ok(buffered + self.get_mut().skip(n - buffered)?)
    }
}

fn skip_by_reading<R: Read>(inner: &mut R, n: u64) -> io::Result<u64> {
    io::copy(&mut inner.by_ref().take(n), &mut io::sink())
}

/// Position of a [`Reader`] within its archive.
#[derive(Debug)]
enum State {
    /// The global magic has not been checked yet.
    Fresh,
    /// Between members, nothing to read.
    Idle,
    /// A member is current.
    Entry { remaining: u64, padded: bool },
    /// End of archive has been reached.
    Done,
    /// A terminal error occurred.
    Failed(Error),
}

/// Sequential reader over the members of an ar archive.
///
/// [`next`](Reader::next) advances to the next member (including the first),
/// after which the reader itself can be used as a [`Read`] to access that
/// member's content. Reads never cross into the following member.
///
/// ## Example
///
/// ```no_run
/// use std::fs::File;
/// use std::io::Read;
/// use rundeb::ar::Reader;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = Reader::new(File::open("package.deb")?);
/// while let Some(header) = archive.next()? {
///     let mut content = Vec::new();
///     archive.read_to_end(&mut content)?;
///     println!("{} ({} bytes)", header.name, content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Reader<R: Read> {
    /// The underlying byte stream
    inner: R,
    state: State,
    skip: fn(&mut R, u64) -> io::Result<u64>,
}

impl<R: Read> Reader<R> {
    /// Create a reader over `inner`.
    ///
    /// Nothing is read until the first call to [`next`](Reader::next).
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: State::Fresh,
            skip: skip_by_reading::<R>,
        }
    }

    /// Unwrap the reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Number of content bytes of the current member not read yet.
    pub fn remaining(&self) -> u64 {
        match self.state {
            State::Entry { remaining, .. } => remaining,
            _ => 0,
        }
    }

    /// Advance to the next member of the archive.
    ///
    /// Unread content of the previous member is skipped, together with its
    /// pad byte if the member had an odd size.
    ///
    /// # Returns
    ///
    /// The next member's [`Header`], or `None` once the archive is exhausted.
    /// After `None` every further call returns `None` again.
    ///
    /// # Errors
    ///
    /// - [`Error::Magic`] if the archive does not start with `!<arch>\n`
    /// - [`Error::Header`] if a member header or pad byte is malformed
    /// - [`Error::Io`] if the underlying stream fails
    ///
    /// All of these are terminal: later calls return the same error.
    pub fn next(&mut self) -> Result<Option<Header>> {
        match self.advance() {
            Ok(Some(header)) => {
                trace!(
                    "ar member {:?}: size {} mode {:o}",
                    header.name, header.size, header.mode
                );
                self.state = State::Entry {
                    remaining: header.size,
                    padded: header.is_padded(),
                };
                Ok(Some(header))
            }
            Ok(None) => {
                self.state = State::Done;
                Ok(None)
            }
            Err(err) => {
                self.state = State::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<Header>> {
        match self.state {
            State::Failed(ref err) => return Err(err.clone()),
            State::Done => return Ok(None),
            State::Fresh => self.validate()?,
            State::Idle => {}
            State::Entry { remaining, padded } => self.skip_unread(remaining, padded)?,
        }
        self.state = State::Idle;
        self.read_header()
    }

    /// Check the global magic at the start of the stream.
    fn validate(&mut self) -> Result<()> {
        let mut magic = [0u8; GLOBAL_MAGIC.len()];
        match self.inner.read_exact(&mut magic) {
            Ok(()) if magic == *GLOBAL_MAGIC => Ok(()),
            Ok(()) => Err(Error::Magic),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(Error::Magic),
            Err(err) => Err(err.into()),
        }
    }

    /// Discard what is left of the current member, then its pad byte.
    ///
    /// The pad byte comes straight from the underlying stream, right after
    /// the member's last content byte.
    fn skip_unread(&mut self, remaining: u64, padded: bool) -> Result<()> {
        if remaining > 0 {
            let skipped = (self.skip)(&mut self.inner, remaining)?;
            if skipped < remaining {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "archive ended inside member content",
                )
                .into());
            }
        }

        if padded {
            let mut pad = [0u8; 1];
            match self.inner.read_exact(&mut pad) {
                Ok(()) if pad[0] == PAD_BYTE => {}
                Ok(()) => {
                    return Err(Error::Header(format!(
                        "invalid padding byte ({:#04x})",
                        pad[0]
                    )));
                }
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                    return Err(Error::Header("missing padding byte".to_string()));
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    fn read_header(&mut self) -> Result<Option<Header>> {
        let mut block = [0u8; HEADER_SIZE];
        match read_exactish(&mut self.inner, &mut block) {
            Ok(true) => parse_header(&block).map(Some),
            Ok(false) => Ok(None),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(Error::Header(
                "unexpected end of archive inside member header".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}

impl<R: Skip> Reader<R> {
    /// Create a reader that skips unread member content with [`Skip::skip`]
    /// instead of reading it.
    pub fn with_skip(inner: R) -> Self {
        Self {
            inner,
            state: State::Fresh,
            skip: R::skip,
        }
    }
}

impl<R: Read> Read for Reader<R> {
    /// Read content of the current member, never past its end.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = match &mut self.state {
            State::Entry { remaining, .. } => remaining,
            State::Failed(err) => return Err(err.clone().into()),
            _ => return Err(Error::NotAvailable.into()),
        };

        if *remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let limit = usize::try_from(*remaining).map_or(buf.len(), |r| r.min(buf.len()));
        match self.inner.read(&mut buf[..limit]) {
            Ok(0) => {
                let err = Error::from(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "archive ended inside member content",
                ));
                self.state = State::Failed(err.clone());
                Err(err.into())
            }
            Ok(n) => {
                *remaining -= n as u64;
                Ok(n)
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => Err(err),
            Err(err) => {
                let err = Error::from(err);
                self.state = State::Failed(err.clone());
                Err(err.into())
            }
        }
    }
}

/// Fill `buf` completely, distinguishing a clean EOF from a truncated one.
///
/// Returns `Ok(true)` when the buffer was filled, `Ok(false)` when the stream
/// ended before any byte was read, and an `UnexpectedEof` error when it ended
/// part-way through.
fn read_exactish(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<bool> {
    let buflen = buf.len();
    let mut todo: &mut [u8] = buf;

    while !todo.is_empty() {
        match reader.read(todo) {
            Ok(0) => {
                return match todo.len() {
                    s if s == buflen => Ok(false),
                    _ => Err(io::Error::from(ErrorKind::UnexpectedEof)),
                };
            }
            Ok(n) => todo = &mut todo[n..],
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(true)
}

/// Parse a 60-byte member header.
///
/// Either every field parses or the whole header is rejected; no partially
/// filled [`Header`] is ever returned.
pub(crate) fn parse_header(block: &[u8; HEADER_SIZE]) -> Result<Header> {
    if block[HEADER_SIZE - 2..] != HEADER_TERMINATOR[..] {
        return Err(Error::Header(format!(
            "invalid header terminator ({:?})",
            String::from_utf8_lossy(&block[HEADER_SIZE - 2..])
        )));
    }

    let field = |(start, end): (usize, usize)| &block[start..end];

    // Lossy conversion keeps odd member names readable
    let name = String::from_utf8_lossy(field(NAME_FIELD)).trim().to_string();
    let mtime = parse_number("timestamp", field(MTIME_FIELD), 10)?;
    let uid = parse_u32("owner ID", field(UID_FIELD), 10)?;
    let gid = parse_u32("group ID", field(GID_FIELD), 10)?;
    let mode = parse_u32("file mode", field(MODE_FIELD), 8)?;
    let size = parse_number("file size", field(SIZE_FIELD), 10)?;

    Ok(Header {
        name,
        mtime: mtime_from_secs(mtime),
        uid,
        gid,
        mode,
        size,
    })
}

/// Parse a space-padded numeric header field in the given radix.
pub(crate) fn parse_number(field: &str, bytes: &[u8], radix: u32) -> Result<u64> {
    str::from_utf8(bytes)
        .ok()
        .and_then(|s| u64::from_str_radix(s.trim(), radix).ok())
        .ok_or_else(|| {
            Error::Header(format!(
                "invalid {} field ({:?})",
                field,
                String::from_utf8_lossy(bytes)
            ))
        })
}

fn parse_u32(field: &str, bytes: &[u8], radix: u32) -> Result<u32> {
    let value = parse_number(field, bytes, radix)?;
    u32::try_from(value)
        .map_err(|_| Error::Header(format!("{} field out of range ({})", field, value)))
}
