use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use log::debug;

use crate::ar;

use super::checksum::Checksums;
use super::compress::Compression;
use super::control;
use super::error::{Error, Result};

/// Stem of the member holding package metadata and maintainer scripts
pub const CONTROL_STEM: &str = "control";

/// Stem of the member holding the installed files
pub const DATA_STEM: &str = "data";

/// A Debian binary package, as read from a `.deb` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    /// Path (or URL) the package was read from
    pub path: String,
    /// Base file name
    pub name: String,
    /// Size of the package in bytes
    pub size: u64,
    /// Installed files, sorted
    pub files: Vec<String>,
    /// Control fields plus the `MD5sum`, `SHA1` and `SHA256` digests
    pub fields: BTreeMap<String, String>,
    /// The `control` file
    pub control: String,
    pub preinst: String,
    pub prerm: String,
    pub postinst: String,
    pub postrm: String,
}

impl Package {
    /// Read the package at `path`.
    ///
    /// The archive is streamed once to collect the control data and file
    /// list, then the whole file is read again to compute its digests.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed member, unsupported bundle compression,
    /// empty bundle, invalid control line or I/O error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        let mut package = Package {
            path: path.to_string_lossy().into_owned(),
            name: base_name(&path.to_string_lossy()),
            size,
            ..Default::default()
        };
        package.read_members(BufReader::new(file))?;
        package.parse_fields()?;
        package.add_checksums(&Checksums::from_path(path)?);
        package.files.sort();

        Ok(package)
    }

    /// Read a package already held in memory.
    ///
    /// `path` is recorded as given and may be a URL; the base name is its
    /// last segment.
    pub fn from_bytes(path: impl Into<String>, data: &[u8]) -> Result<Self> {
        let path = path.into();

        let mut package = Package {
            name: base_name(&path),
            path,
            size: data.len() as u64,
            ..Default::default()
        };
        package.read_members(data)?;
        package.parse_fields()?;
        package.add_checksums(&Checksums::compute(data));
        package.files.sort();

        Ok(package)
    }

    /// Look up a control field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Maintainer scripts present in the package, by name.
    pub fn scripts(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("preinst", self.preinst.as_str()),
            ("prerm", self.prerm.as_str()),
            ("postinst", self.postinst.as_str()),
            ("postrm", self.postrm.as_str()),
        ]
        .into_iter()
        .filter(|(_, text)| !text.is_empty())
    }

    fn read_members<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut archive = ar::Reader::new(reader);

        while let Some(header) = archive.next()? {
            if let Some(compression) = Compression::from_member_name(&header.name, CONTROL_STEM) {
                debug!("reading control bundle {} ({} bytes)", header.name, header.size);
                let decoder = compression.decoder(&mut archive)?;
                if header.size == 0 {
                    return Err(Error::EmptyControl);
                }
                self.read_control(decoder).map_err(bundle_error)?;
            } else if let Some(compression) = Compression::from_member_name(&header.name, DATA_STEM)
            {
                debug!("reading data bundle {} ({} bytes)", header.name, header.size);
                let decoder = compression.decoder(&mut archive)?;
                if header.size == 0 {
                    return Err(Error::EmptyData);
                }
                self.read_data(decoder).map_err(bundle_error)?;
            } else {
                debug!("skipping member {}", header.name);
            }
        }

        Ok(())
    }

    /// Collect the control file and maintainer scripts from a control bundle.
    fn read_control(&mut self, reader: impl Read) -> io::Result<()> {
        let mut bundle = tar::Archive::new(reader);

        for entry in bundle.entries()? {
            let mut entry = entry?;
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

            let slot = match name.strip_prefix("./").unwrap_or(&name) {
                "control" => &mut self.control,
                "preinst" => &mut self.preinst,
                "prerm" => &mut self.prerm,
                "postinst" => &mut self.postinst,
                "postrm" => &mut self.postrm,
                _ => continue,
            };

            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            *slot = String::from_utf8_lossy(&buf).into_owned();
        }

        Ok(())
    }

    /// Collect the paths of every non-directory entry in a data bundle.
    fn read_data(&mut self, reader: impl Read) -> io::Result<()> {
        let mut bundle = tar::Archive::new(reader);

        for entry in bundle.entries()? {
            let entry = entry?;
            if entry.header().entry_type().is_dir() {
                continue;
            }
            self.files
                .push(String::from_utf8_lossy(&entry.path_bytes()).into_owned());
        }

        Ok(())
    }

    fn parse_fields(&mut self) -> Result<()> {
        self.fields = control::parse_fields(&self.control)?;
        Ok(())
    }

    fn add_checksums(&mut self, checksums: &Checksums) {
        for (key, value) in checksums.fields() {
            self.fields.insert(key.to_string(), value.to_string());
        }
    }
}

/// Surface archive errors raised underneath a decompressor as such.
fn bundle_error(err: io::Error) -> Error {
    match err.get_ref().and_then(|inner| inner.downcast_ref::<ar::Error>()) {
        Some(ar_err) => Error::Archive(ar_err.clone()),
        None => Error::Io(err),
    }
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("testdata/basic.deb"), "basic.deb");
        assert_eq!(base_name("https://example.com/pool/h/hello.deb"), "hello.deb");
        assert_eq!(base_name("basic.deb"), "basic.deb");
        assert_eq!(base_name(""), "");
    }

    #[test]
    fn test_bundle_error_unwraps_archive_errors() {
        let err = io::Error::from(ar::Error::Magic);
        assert!(matches!(bundle_error(err), Error::Archive(ar::Error::Magic)));

        let err = io::Error::from(io::ErrorKind::BrokenPipe);
        match bundle_error(err) {
            Error::Io(err) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn test_scripts_skips_empty() {
        let package = Package {
            preinst: "#!/bin/sh\n".to_string(),
            postrm: "#!/bin/sh\nexit 0\n".to_string(),
            ..Default::default()
        };
        let names: Vec<_> = package.scripts().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["preinst", "postrm"]);
    }
}
