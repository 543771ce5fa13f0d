//! Filesystem capability used by artifact validation.
//!
//! Keeping the handful of queries the validator needs behind a trait lets
//! tests substitute an in-memory file table for the real release directory.

use std::io;
use std::path::Path;

pub trait FileSystem {
  fn exists(&self, path: &Path) -> bool;

  /// Size of the file at `path` in bytes.
  fn size_of(&self, path: &Path) -> io::Result<u64>;

  /// Copies `from` over `to`, returning the number of bytes copied.
  fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
  fn exists(&self, path: &Path) -> bool {
    (**self).exists(path)
  }

  fn size_of(&self, path: &Path) -> io::Result<u64> {
    (**self).size_of(path)
  }

  fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
    (**self).copy(from, to)
  }
}

/// The local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
  fn exists(&self, path: &Path) -> bool {
    path.is_file()
  }

  fn size_of(&self, path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
  }

  fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
    std::fs::copy(from, to)
  }
}
