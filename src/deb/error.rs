use std::io;

use crate::ar;

/// Errors produced while assembling a [`Package`](super::Package).
///
/// The first error aborts the whole read; no partial package is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("empty control file")]
    EmptyControl,

    #[error("empty data file")]
    EmptyData,

    /// A control or data bundle uses a compression that is not supported.
    #[error("data format not implemented: {0}")]
    UnsupportedFormat(String),

    /// A control file line is neither `Key: value` nor a continuation.
    #[error("invalid control field: {0:?}")]
    InvalidField(String),

    #[error(transparent)]
    Archive(#[from] ar::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
