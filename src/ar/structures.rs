use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Global header that opens every ar archive
pub const GLOBAL_MAGIC: &[u8; 8] = b"!<arch>\n";

/// Terminator closing each member header
pub const HEADER_TERMINATOR: &[u8; 2] = b"`\n";

/// Member header - 60 bytes
pub const HEADER_SIZE: usize = 60;

/// Byte that follows odd-sized member content
pub const PAD_BYTE: u8 = b'\n';

/// Field ranges within a member header, as (start, end) offsets.
pub(crate) const NAME_FIELD: (usize, usize) = (0, 16);
pub(crate) const MTIME_FIELD: (usize, usize) = (16, 28);
pub(crate) const UID_FIELD: (usize, usize) = (28, 34);
pub(crate) const GID_FIELD: (usize, usize) = (34, 40);
pub(crate) const MODE_FIELD: (usize, usize) = (40, 48);
pub(crate) const SIZE_FIELD: (usize, usize) = (48, 58);

/// Parsed ar member header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    /// Modification time, `None` when the archive records zero
    pub mtime: Option<SystemTime>,
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub size: u64,
}

impl Header {
    /// Permission bits of the member's mode
    pub fn permissions(&self) -> u32 {
        self.mode & 0o777
    }

    /// Whether a pad byte follows the member's content
    pub fn is_padded(&self) -> bool {
        self.size % 2 == 1
    }

    /// Modification time as seconds since the Unix epoch (0 when unset)
    pub fn mtime_secs(&self) -> u64 {
        self.mtime
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Map a raw timestamp to a point in time, treating zero as unset.
pub(crate) fn mtime_from_secs(secs: u64) -> Option<SystemTime> {
    if secs == 0 {
        None
    } else {
        Some(UNIX_EPOCH + Duration::from_secs(secs))
    }
}
