//! The filesystem boundary.  The core never touches the disk itself; the
//! caller observes files through this interface and reports what it saw via
//! `State::touch`.

use crate::graph::MTime;
use std::os::unix::fs::MetadataExt;

pub trait FileSystem {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>>;
    /// stat() an on-disk path, producing its MTime.
    /// Absent files report Unknown, same as a never-observed path.
    fn stat(&self, path: &str) -> std::io::Result<MTime>;
}

pub struct RealFileSystem {}

impl RealFileSystem {
    pub fn new() -> Self {
        RealFileSystem {}
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        RealFileSystem::new()
    }
}

impl FileSystem for RealFileSystem {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn stat(&self, path: &str) -> std::io::Result<MTime> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(MTime::Stamp(meta.mtime() as u32)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(MTime::Unknown),
            Err(err) => Err(err),
        }
    }
}
