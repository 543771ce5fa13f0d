//! Canister binary validation.
//!
//! `dfx build` may leave two binaries per canister: `<name>.wasm` and, when an
//! optimizer ran, `<name>_opt.wasm`. The optimized variant always wins and is
//! copied over the plain one, which then becomes the canonical binary. The
//! canonical binary must not exceed the size the network accepts.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::OPT_WASM_SUFFIX;
use crate::fs::FileSystem;

#[derive(Debug, Error)]
pub enum ValidateError {
  #[error("failed to substitute optimized binary {} -> {}: {source}", from.display(), to.display())]
  Substitute {
    from: PathBuf,
    to: PathBuf,
    source: io::Error,
  },

  #[error("failed to read size of {}: {source}", path.display())]
  Size { path: PathBuf, source: io::Error },

  #[error("{} is too large: {size} bytes exceeds the {limit} byte limit", path.display())]
  TooLarge { path: PathBuf, size: u64, limit: u64 },
}

/// A validated canister binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  pub name: String,
  /// Canonical binary (`<release>/<name>.wasm`).
  pub wasm: PathBuf,
  pub size: u64,
  /// Whether `<name>_opt.wasm` was copied over the canonical binary.
  pub optimized: bool,
}

impl Artifact {
  pub fn size_mib(&self) -> f64 {
    bytes_to_mib(self.size)
  }
}

pub fn bytes_to_mib(bytes: u64) -> f64 {
  bytes as f64 / (1024.0 * 1024.0)
}

/// Canonical and optimized binary paths for `name`.
pub fn wasm_paths(release_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
  (
    release_dir.join(format!("{name}.wasm")),
    release_dir.join(format!("{name}{OPT_WASM_SUFFIX}.wasm")),
  )
}

/// Validates one canister binary.
///
/// The size limit applies to the binary that will be packaged, so it is
/// checked after the optimized variant (if any) has been substituted.
pub fn validate_artifact<F: FileSystem>(
  fs: &F,
  release_dir: &Path,
  name: &str,
  limit: u64,
) -> Result<Artifact, ValidateError> {
  let (wasm, opt_wasm) = wasm_paths(release_dir, name);

  let optimized = fs.exists(&opt_wasm);
  if optimized {
    debug!(from = %opt_wasm.display(), to = %wasm.display(), "using optimized binary");
    fs.copy(&opt_wasm, &wasm).map_err(|e| ValidateError::Substitute {
      from: opt_wasm.clone(),
      to: wasm.clone(),
      source: e,
    })?;
  }

  let size = fs.size_of(&wasm).map_err(|e| ValidateError::Size {
    path: wasm.clone(),
    source: e,
  })?;

  info!(canister = %name, size_mib = %format!("{:.2}", bytes_to_mib(size)), optimized, "canister size");

  if size > limit {
    return Err(ValidateError::TooLarge { path: wasm, size, limit });
  }

  Ok(Artifact {
    name: name.to_string(),
    wasm,
    size,
    optimized,
  })
}

/// Validates every canister binary, stopping at the first failure.
pub fn validate_artifacts<F: FileSystem>(
  fs: &F,
  release_dir: &Path,
  names: &[String],
  limit: u64,
) -> Result<Vec<Artifact>, ValidateError> {
  let artifacts = names
    .iter()
    .map(|name| validate_artifact(fs, release_dir, name, limit))
    .collect::<Result<Vec<_>, _>>()?;

  info!(count = artifacts.len(), limit, "all canister binaries within size limit");
  Ok(artifacts)
}
