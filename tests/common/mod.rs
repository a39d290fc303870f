//! Builders for in-memory ar archives and .deb packages.

#![allow(dead_code)]

use std::io::Write;

use flate2::{Compression, write::GzEncoder};

pub const MTIME: u64 = 1393442320;

/// One member of an ar archive
pub struct Member<'a> {
    pub name: &'a str,
    pub content: Vec<u8>,
}

pub fn member(name: &str, content: impl Into<Vec<u8>>) -> Member<'_> {
    Member {
        name,
        content: content.into(),
    }
}

/// Serialize members into an ar archive, padding odd-sized content.
pub fn ar_archive(members: &[Member]) -> Vec<u8> {
    let mut out = b"!<arch>\n".to_vec();
    for m in members {
        let header = format!(
            "{:<16}{:<12}{:<6}{:<6}{:<8o}{:<10}`\n",
            m.name,
            MTIME,
            0,
            0,
            0o100644,
            m.content.len()
        );
        assert_eq!(header.len(), 60);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&m.content);
        if m.content.len() % 2 == 1 {
            out.push(b'\n');
        }
    }
    out
}

/// A tar entry; names are stored byte for byte, `./` prefix included.
pub enum TarEntry<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
}

pub fn tar_bundle(entries: &[TarEntry]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        let empty: &[u8] = &[];
        let (name, data, entry_type, mode) = match *entry {
            TarEntry::File(name, data) => (name, data, tar::EntryType::Regular, 0o644),
            TarEntry::Dir(name) => (name, empty, tar::EntryType::Directory, 0o755),
        };

        let mut header = tar::Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_entry_type(entry_type);
        header.set_mode(mode);
        header.set_size(data.len() as u64);
        header.set_mtime(MTIME);
        header.set_cksum();
        builder.append(&header, data).unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn bzip2_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn zstd_compress(data: &[u8]) -> Vec<u8> {
    zstd::encode_all(data, 0).unwrap()
}

pub const CONTROL: &str = "Package: empty\n\
                           Version: 1.0.0\n\
                           Maintainer: Philip Nelson <me@pnelson.ca>\n";

/// A small but complete package with gzip bundles
pub fn basic_deb() -> Vec<u8> {
    let control = tar_bundle(&[
        TarEntry::Dir("./"),
        TarEntry::File("./control", CONTROL.as_bytes()),
    ]);
    let data = tar_bundle(&[
        TarEntry::Dir("./"),
        TarEntry::File("./c", b"c\n"),
        TarEntry::File("./a", b"a\n"),
        TarEntry::File("./b", b"b\n"),
    ]);
    ar_archive(&[
        member("debian-binary", "2.0\n"),
        member("control.tar.gz", gzip(&control)),
        member("data.tar.gz", gzip(&data)),
    ])
}
