//! # rundeb
//!
//! A Rust `.deb` package inspector with HTTP URL support using Range requests.
//!
//! This library reads Debian binary packages from the local filesystem or
//! from remote HTTP servers. Packages are ar archives; the [`ar`] module
//! streams their members one by one, and the [`deb`] module builds a
//! [`Package`] out of them: control fields, maintainer scripts, the list of
//! installed files and whole-file checksums.
//!
//! ## Features
//!
//! - Streaming, forward-only ar reader with sticky errors
//! - Control and data bundles compressed with gzip, bzip2 or zstd, or uncompressed
//! - MD5, SHA1 and SHA256 digests of the package file
//! - Fetch packages over HTTP/HTTPS with Range requests, downloading only
//!   the member headers when listing
//!
//! ## Example
//!
//! ```no_run
//! use rundeb::Package;
//!
//! fn main() -> Result<(), rundeb::deb::Error> {
//!     let package = Package::open("hello_2.10-3_amd64.deb")?;
//!
//!     println!("{} {}", package.field("Package").unwrap_or("?"), package.field("Version").unwrap_or("?"));
//!     for file in &package.files {
//!         println!("{}", file);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod ar;
pub mod cli;
pub mod deb;
pub mod io;

pub use cli::Cli;
pub use deb::Package;
pub use io::{BlockingReader, HttpRangeReader, LocalFileReader, ReadAt};
