//! ar archive reading.
//!
//! This module provides a forward-only, streaming reader for the common ar
//! format used by Debian binary packages.
//!
//! ## Architecture
//!
//! - [`structures`]: the member [`Header`] and the format's constants
//! - [`reader`]: the stateful [`Reader`] that parses headers and bounds
//!   content reads
//! - [`error`]: the sticky [`Error`] type
//!
//! ## ar Format Overview
//!
//! An ar file consists of:
//! 1. The global magic `!<arch>\n`
//! 2. For each member, a 60-byte ASCII header (name, timestamp, owner,
//!    group, octal mode, size, and the terminator `` `\n ``)
//! 3. The member's content, followed by a `\n` pad byte if its size is odd
//!
//! The archive ends where a new header would start and no bytes remain.
//!
//! ## Limitations
//!
//! - No writing support
//! - No GNU or BSD extended name tables; names are taken as stored
//! - No seeking; members are visited once, in order

mod error;
mod reader;
mod structures;

pub use error::{Error, Result};
pub use reader::{Reader, Skip};
pub use structures::*;
