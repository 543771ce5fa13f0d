//! Zip archives of staged environments.
//!
//! `<package>/<env>/` becomes `<package>/<env>.zip`. Entries are stored
//! relative to the staged directory, so extracting the archive yields
//! `canister_ids.json`, `dfx.json` and `assets/` at the top level.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use crate::util::hash::{ContentHash, hash_file};

/// Deflate level used for every entry (maximum compression).
pub const COMPRESSION_LEVEL: i64 = 9;

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("staged directory not found: {}", path.display())]
  MissingSource { path: PathBuf },

  #[error("failed to create archive {}: {source}", path.display())]
  Create { path: PathBuf, source: io::Error },

  #[error("failed to walk {}: {source}", path.display())]
  Walk { path: PathBuf, source: walkdir::Error },

  #[error("path is not valid UTF-8: {}", path.display())]
  InvalidName { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to write archive {}: {source}", path.display())]
  Zip { path: PathBuf, source: ZipError },
}

/// A written archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
  pub env: String,
  pub path: PathBuf,
  /// Files and directories stored in the archive.
  pub entries: usize,
  pub bytes: u64,
  pub sha256: ContentHash,
}

/// Archives `root/<env>/` into `root/<env>.zip`.
pub fn archive_environment(root: &Path, env: &str) -> Result<Archive, ArchiveError> {
  let src = root.join(env);
  let dest = root.join(format!("{env}.zip"));

  let entries = zip_dir(&src, &dest)?;

  let bytes = std::fs::metadata(&dest)
    .map_err(|e| ArchiveError::Read {
      path: dest.clone(),
      source: e,
    })?
    .len();
  let sha256 = hash_file(&dest).map_err(|e| ArchiveError::Read {
    path: dest.clone(),
    source: e,
  })?;

  info!(env, path = %dest.display(), entries, bytes, "created archive");

  Ok(Archive {
    env: env.to_string(),
    path: dest,
    entries,
    bytes,
    sha256,
  })
}

/// Writes every file and directory below `src` into a new zip at `dest`.
///
/// Returns the number of entries written. Entries are added in file-name
/// order so repeated runs produce the same layout.
pub fn zip_dir(src: &Path, dest: &Path) -> Result<usize, ArchiveError> {
  if !src.is_dir() {
    return Err(ArchiveError::MissingSource { path: src.to_path_buf() });
  }

  let file = File::create(dest).map_err(|e| ArchiveError::Create {
    path: dest.to_path_buf(),
    source: e,
  })?;
  let mut zip = ZipWriter::new(file);
  let options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .compression_level(Some(COMPRESSION_LEVEL));
  let zip_err = |e: ZipError| ArchiveError::Zip {
    path: dest.to_path_buf(),
    source: e,
  };

  let mut entries = 0;
  for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|e| ArchiveError::Walk {
      path: src.to_path_buf(),
      source: e,
    })?;
    let name = entry_name(src, entry.path())?;

    if entry.file_type().is_dir() {
      debug!(entry = %name, "adding directory");
      zip.add_directory(name, options).map_err(zip_err)?;
    } else {
      debug!(entry = %name, "adding file");
      zip.start_file(name, options).map_err(zip_err)?;
      let mut input = File::open(entry.path()).map_err(|e| ArchiveError::Read {
        path: entry.path().to_path_buf(),
        source: e,
      })?;
      io::copy(&mut input, &mut zip).map_err(|e| zip_err(ZipError::Io(e)))?;
    }
    entries += 1;
  }

  zip.finish().map_err(zip_err)?;
  Ok(entries)
}

/// Archive entry name for `path`: relative to `base`, `/`-separated.
fn entry_name(base: &Path, path: &Path) -> Result<String, ArchiveError> {
  let invalid = || ArchiveError::InvalidName { path: path.to_path_buf() };
  let rel = path.strip_prefix(base).map_err(|_| invalid())?;

  let parts = rel
    .components()
    .map(|c| c.as_os_str().to_str().ok_or_else(invalid))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Read;
  use tempfile::TempDir;
  use zip::ZipArchive;

  fn staged_env(root: &Path, env: &str) -> PathBuf {
    let dir = root.join(env);
    std::fs::create_dir_all(dir.join("assets")).unwrap();
    std::fs::write(dir.join("canister_ids.json"), r#"{"ledger":{}}"#).unwrap();
    std::fs::write(dir.join("dfx.json"), "{}").unwrap();
    std::fs::write(dir.join("assets").join("ledger.wasm"), vec![7u8; 4096]).unwrap();
    std::fs::write(dir.join("assets").join("ledger.did"), "service : {}").unwrap();
    dir
  }

  fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut out = Vec::new();
    for i in 0..archive.len() {
      let mut file = archive.by_index(i).unwrap();
      let mut data = Vec::new();
      file.read_to_end(&mut data).unwrap();
      out.push((file.name().to_string(), data));
    }
    out
  }

  #[test]
  fn archives_staged_tree_without_top_level_folder() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    staged_env(root, "local");

    let archive = archive_environment(root, "local").unwrap();

    assert_eq!(archive.path, root.join("local.zip"));
    assert_eq!(archive.entries, 5);
    assert!(archive.bytes > 0);
    assert_eq!(archive.sha256, hash_file(&archive.path).unwrap());

    let names: Vec<String> = read_entries(&archive.path).into_iter().map(|(n, _)| n).collect();
    assert_eq!(
      names,
      vec![
        "assets/",
        "assets/ledger.did",
        "assets/ledger.wasm",
        "canister_ids.json",
        "dfx.json"
      ]
    );
  }

  #[test]
  fn extracted_bytes_match_staged_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let dir = staged_env(root, "ic");

    let archive = archive_environment(root, "ic").unwrap();

    for (name, data) in read_entries(&archive.path) {
      if name.ends_with('/') {
        continue;
      }
      assert_eq!(data, std::fs::read(dir.join(&name)).unwrap(), "{name} differs");
    }
  }

  #[test]
  fn entries_use_maximum_deflate() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let dir = staged_env(root, "local");
    let text: String = (0..4000).map(|i| format!("canister-{} ", i % 97)).collect();
    std::fs::write(dir.join("assets").join("ledger.did"), &text).unwrap();

    let archive = archive_environment(root, "local").unwrap();

    let fast = root.join("fast.zip");
    let mut writer = ZipWriter::new(File::create(&fast).unwrap());
    let options = SimpleFileOptions::default()
      .compression_method(CompressionMethod::Deflated)
      .compression_level(Some(1));
    writer.start_file("assets/ledger.did", options).unwrap();
    std::io::Write::write_all(&mut writer, text.as_bytes()).unwrap();
    writer.finish().unwrap();

    let mut zip = ZipArchive::new(File::open(&archive.path).unwrap()).unwrap();
    let best = zip.by_name("assets/ledger.did").unwrap();
    assert_eq!(best.compression(), CompressionMethod::Deflated);
    assert!(best.compressed_size() < best.size());

    let mut fast_zip = ZipArchive::new(File::open(&fast).unwrap()).unwrap();
    let fast_entry = fast_zip.by_name("assets/ledger.did").unwrap();
    assert!(best.compressed_size() <= fast_entry.compressed_size());
  }

  #[test]
  fn missing_staged_directory_fails() {
    let temp = TempDir::new().unwrap();

    let err = archive_environment(temp.path(), "local").unwrap_err();

    assert!(matches!(err, ArchiveError::MissingSource { .. }));
    assert!(!temp.path().join("local.zip").exists());
  }

  #[test]
  fn entry_names_use_forward_slashes() {
    let base = Path::new("pkg").join("local");
    let path = base.join("assets").join("ledger.wasm");
    assert_eq!(entry_name(&base, &path).unwrap(), "assets/ledger.wasm");
  }
}
