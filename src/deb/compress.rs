use std::io::Read;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;

use super::error::{Error, Result};

/// Compression applied to a tar bundle inside a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Uncompressed,
    Gzip,
    Zstd,
    Xz,
    Bzip2,
    Lzma,
}

impl Compression {
    /// Detect the compression of a bundle member such as `data.tar.gz`.
    ///
    /// Returns `None` when `name` is not `<stem>.tar` with an optional known
    /// compression suffix.
    pub fn from_member_name(name: &str, stem: &str) -> Option<Self> {
        let suffix = name.strip_prefix(stem)?.strip_prefix(".tar")?;
        match suffix {
            "" => Some(Compression::Uncompressed),
            ".gz" => Some(Compression::Gzip),
            ".zst" => Some(Compression::Zstd),
            ".xz" => Some(Compression::Xz),
            ".bz2" => Some(Compression::Bzip2),
            ".lzma" => Some(Compression::Lzma),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Compression::Uncompressed => "",
            Compression::Gzip => ".gz",
            Compression::Zstd => ".zst",
            Compression::Xz => ".xz",
            Compression::Bzip2 => ".bz2",
            Compression::Lzma => ".lzma",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Compression::Uncompressed
                | Compression::Gzip
                | Compression::Bzip2
                | Compression::Zstd
        )
    }

    /// Wrap `reader` in the matching decompressor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for xz and lzma bundles.
    pub fn decoder<'a, R: Read + 'a>(self, reader: R) -> Result<Box<dyn Read + 'a>> {
        match self {
            Compression::Uncompressed => Ok(Box::new(reader)),
            Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(reader))),
            Compression::Bzip2 => Ok(Box::new(MultiBzDecoder::new(reader))),
            Compression::Zstd => Ok(Box::new(zstd::stream::read::Decoder::new(reader)?)),
            Compression::Xz | Compression::Lzma => Err(
                Error::UnsupportedFormat(format!("tar{} compression", self.extension())),
            ),
        }
    }
}
