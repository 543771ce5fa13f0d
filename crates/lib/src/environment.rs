//! Deployment environment discovery.
//!
//! Each file in the `canister_ids/` directory describes one environment: the
//! file stem is the environment name and the file itself is the canister id
//! map copied verbatim into that environment's package.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EnvironmentError {
  #[error("failed to read environment directory {}: {source}", path.display())]
  ReadDir { path: PathBuf, source: std::io::Error },

  #[error("environment file name is not valid UTF-8: {}", path.display())]
  InvalidName { path: PathBuf },

  #[error("environment {name} is declared twice: {} and {}", first.display(), second.display())]
  Duplicate {
    name: String,
    first: PathBuf,
    second: PathBuf,
  },
}

/// A named deployment target and its canister id file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
  pub name: String,
  pub ids_file: PathBuf,
}

impl Environment {
  /// Builds an environment from an identity file path, naming it after the
  /// file stem (`local.json` -> `local`).
  pub fn from_ids_file(path: &Path) -> Result<Self, EnvironmentError> {
    let name = path
      .file_stem()
      .and_then(|stem| stem.to_str())
      .ok_or_else(|| EnvironmentError::InvalidName {
        path: path.to_path_buf(),
      })?;

    Ok(Self {
      name: name.to_string(),
      ids_file: path.to_path_buf(),
    })
  }
}

/// Lists the environments declared in `dir`.
///
/// Every regular file is an environment regardless of its extension.
/// Sub-directories are skipped. The result is sorted by name so that staging
/// and archiving walk the same sequence. Two files with the same stem
/// (`local.json` and `local.ids`) are rejected.
pub fn discover_environments(dir: &Path) -> Result<Vec<Environment>, EnvironmentError> {
  let entries = fs::read_dir(dir).map_err(|e| EnvironmentError::ReadDir {
    path: dir.to_path_buf(),
    source: e,
  })?;

  let mut envs = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| EnvironmentError::ReadDir {
      path: dir.to_path_buf(),
      source: e,
    })?;
    let path = entry.path();

    if !path.is_file() {
      debug!(path = %path.display(), "skipping non-file entry");
      continue;
    }

    envs.push(Environment::from_ids_file(&path)?);
  }

  envs.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.ids_file.cmp(&b.ids_file)));

  if let Some(pair) = envs.windows(2).find(|pair| pair[0].name == pair[1].name) {
    return Err(EnvironmentError::Duplicate {
      name: pair[0].name.clone(),
      first: pair[0].ids_file.clone(),
      second: pair[1].ids_file.clone(),
    });
  }

  if envs.is_empty() {
    warn!(dir = %dir.display(), "no environments found");
  } else {
    let names: Vec<&str> = envs.iter().map(|e| e.name.as_str()).collect();
    info!(environments = ?names, "discovered environments");
  }

  Ok(envs)
}
