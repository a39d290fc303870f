use std::fs;
use std::io;
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Digests of a whole package file, hex encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksums {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

impl Checksums {
    pub const MD5_FIELD: &'static str = "MD5sum";
    pub const SHA1_FIELD: &'static str = "SHA1";
    pub const SHA256_FIELD: &'static str = "SHA256";

    pub fn compute(data: &[u8]) -> Self {
        Self {
            md5: hex::encode(Md5::digest(data)),
            sha1: hex::encode(Sha1::digest(data)),
            sha256: hex::encode(Sha256::digest(data)),
        }
    }

    /// Read the whole file at `path` and digest it.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        Ok(Self::compute(&data))
    }

    /// Control field names paired with their values
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            (Self::MD5_FIELD, self.md5.as_str()),
            (Self::SHA1_FIELD, self.sha1.as_str()),
            (Self::SHA256_FIELD, self.sha256.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_known_digests() {
        let sums = Checksums::compute(b"");
        assert_eq!(sums.md5, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(sums.sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(
            sums.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        let sums = Checksums::compute(b"abc");
        assert_eq!(sums.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(sums.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            sums.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fields() {
        let sums = Checksums::compute(b"abc");
        let fields = sums.fields();
        assert_eq!(fields[0], ("MD5sum", "900150983cd24fb0d6963f7d28e17f72"));
        assert_eq!(fields[1].0, "SHA1");
        assert_eq!(fields[2].0, "SHA256");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.deb");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(Checksums::from_path(&path).unwrap(), Checksums::compute(b"abc"));
        assert!(Checksums::from_path(&dir.path().join("missing.deb")).is_err());
    }
}
