//! Per-environment staging.
//!
//! Layout of a staged environment:
//! ```text
//! <package>/<env>/
//! ├── canister_ids.json     # copy of canister_ids/<env>.*
//! ├── dfx.json              # deployment manifest
//! └── assets/
//!     ├── <name>.wasm
//!     └── <name>.did
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{ASSETS_DIR, DFX_JSON, STAGED_CANISTER_IDS};
use crate::environment::Environment;
use crate::validate::Artifact;

#[derive(Debug, Error)]
pub enum StageError {
  #[error("failed to remove directory {}: {source}", path.display())]
  RemoveDir { path: PathBuf, source: std::io::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: std::io::Error,
  },

  #[error("no candid file declared for canister {name}")]
  MissingCandid { name: String },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

/// A fully staged environment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedEnvironment {
  pub name: String,
  pub dir: PathBuf,
  /// Number of files written into the directory.
  pub files: usize,
}

/// Deletes `root` if present and recreates it empty.
///
/// Runs once per packaging run, before any environment is staged.
pub fn reset_output_root(root: &Path) -> Result<(), StageError> {
  if root.exists() {
    debug!(path = %root.display(), "removing previous package output");
    fs::remove_dir_all(root).map_err(|e| StageError::RemoveDir {
      path: root.to_path_buf(),
      source: e,
    })?;
  }

  fs::create_dir_all(root).map_err(|e| StageError::CreateDir {
    path: root.to_path_buf(),
    source: e,
  })
}

/// Stages one environment under `root/<env>/`.
///
/// `candids` maps canister names to resolved Candid paths; `manifest_json` is
/// the serialized deployment manifest shared by every environment.
pub fn stage_environment(
  root: &Path,
  env: &Environment,
  artifacts: &[Artifact],
  candids: &BTreeMap<String, PathBuf>,
  manifest_json: &str,
) -> Result<StagedEnvironment, StageError> {
  let env_dir = root.join(&env.name);
  let assets_dir = env_dir.join(ASSETS_DIR);

  fs::create_dir_all(&assets_dir).map_err(|e| StageError::CreateDir {
    path: assets_dir.clone(),
    source: e,
  })?;

  let mut files = 0;

  copy_file(&env.ids_file, &env_dir.join(STAGED_CANISTER_IDS))?;
  files += 1;

  for artifact in artifacts {
    copy_file(&artifact.wasm, &assets_dir.join(format!("{}.wasm", artifact.name)))?;

    let candid = candids.get(&artifact.name).ok_or_else(|| StageError::MissingCandid {
      name: artifact.name.clone(),
    })?;
    copy_file(candid, &assets_dir.join(format!("{}.did", artifact.name)))?;
    files += 2;
  }

  let manifest_path = env_dir.join(DFX_JSON);
  fs::write(&manifest_path, manifest_json).map_err(|e| StageError::WriteFile {
    path: manifest_path.clone(),
    source: e,
  })?;
  files += 1;

  info!(env = %env.name, dir = %env_dir.display(), files, "staged environment");

  Ok(StagedEnvironment {
    name: env.name.clone(),
    dir: env_dir,
    files,
  })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), StageError> {
  debug!(from = %from.display(), to = %to.display(), "copying");
  fs::copy(from, to).map_err(|e| StageError::Copy {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source: e,
  })?;
  Ok(())
}
