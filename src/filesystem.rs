//! Helpers for filesystem queries

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

const OWNER_READ: u32 = 0o400;
const OWNER_EXECUTE: u32 = 0o100;

/// What a transaction needs to know about a file, fetched fresh each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub is_regular: bool,
    pub size: u64,
    /// Permission bits, as in `st_mode`
    pub mode: u32
}

impl FileMetadata {
    /// Stats `path`, following symlinks.
    pub fn query<P: AsRef<Path>>(path: P) -> io::Result<FileMetadata> {
        let meta = fs::metadata(path)?;

        Ok(FileMetadata {
            is_regular: meta.is_file(),
            size: meta.len(),
            mode: meta.permissions().mode()
        })
    }

    #[inline]
    pub fn owner_readable(&self) -> bool {
        self.mode & OWNER_READ != 0
    }

    #[inline]
    pub fn owner_executable(&self) -> bool {
        self.mode & OWNER_EXECUTE != 0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::server::test_util::Scratch;

    #[test]
    fn regular_file() {
        let scratch = Scratch::new();
        let path = scratch.file("a.html", b"12345", 0o644);

        let meta = FileMetadata::query(&path).unwrap();
        assert!(meta.is_regular);
        assert_eq!(meta.size, 5);
        assert!(meta.owner_readable());
        assert!(!meta.owner_executable());
    }

    #[test]
    fn permission_bits() {
        let scratch = Scratch::new();
        let path = scratch.file("prog", b"", 0o300);

        let meta = FileMetadata::query(&path).unwrap();
        assert!(!meta.owner_readable());
        assert!(meta.owner_executable());
    }

    #[test]
    fn directory_is_not_regular() {
        let scratch = Scratch::new();
        let meta = FileMetadata::query(scratch.root()).unwrap();
        assert!(!meta.is_regular);
    }

    #[test]
    fn missing_is_not_found() {
        let scratch = Scratch::new();
        let err = FileMetadata::query(scratch.path("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
