use std::io;
use std::sync::Arc;

/// Errors produced by the ar [`Reader`](super::Reader).
///
/// Every variant except [`Error::NotAvailable`] leaves the reader in a
/// terminal state: later calls return a clone of the same error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The archive does not start with `!<arch>\n`.
    #[error("invalid ar global header magic string")]
    Magic,

    /// A member header (or the pad byte before it) is malformed.
    #[error("invalid ar header: {0}")]
    Header(String),

    /// The underlying stream failed.
    #[error(transparent)]
    Io(Arc<io::Error>),

    /// Content was read while no member is current.
    #[error("no archive member is available for reading")]
    NotAvailable,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::Io(inner) => inner.kind(),
            Error::NotAvailable => io::ErrorKind::NotFound,
            Error::Magic | Error::Header(_) => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}
