//! Debian binary package inspection.
//!
//! A `.deb` file is an ar archive with three well-known members:
//!
//! 1. `debian-binary`: the format version (`2.0\n`)
//! 2. `control.tar[.gz|.bz2|.zst]`: the `control` file and maintainer scripts
//! 3. `data.tar[.gz|.bz2|.zst]`: the files the package installs
//!
//! [`Package`] drives an [`ar::Reader`](crate::ar::Reader) over the archive,
//! decompresses and untars the two bundles, parses the control fields and
//! records MD5, SHA1 and SHA256 digests of the whole file.
//!
//! ## Limitations
//!
//! - xz and lzma bundles are rejected with
//!   [`Error::UnsupportedFormat`]
//! - File contents of the data bundle are not extracted, only listed

mod checksum;
mod compress;
pub mod control;
mod error;
mod package;

pub use checksum::Checksums;
pub use compress::Compression;
pub use error::{Error, Result};
pub use package::{CONTROL_STEM, DATA_STEM, Package};
