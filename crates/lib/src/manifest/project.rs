//! Project manifest reader.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading the project `dfx.json`.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse manifest {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("failed to serialize deployment manifest: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// A canister as declared in the project manifest.
///
/// Only the Candid path is needed for packaging; `type`, `package` and any
/// other keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CanisterDecl {
  /// Candid interface file, relative to the project root.
  pub candid: PathBuf,
}

/// The project `dfx.json`.
///
/// # Example
///
/// ```json
/// {
///   "canisters": {
///     "ledger": { "candid": "src/ledger/ledger.did", "type": "rust", "package": "ledger" }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectManifest {
  /// Canister declarations keyed by canister name.
  pub canisters: BTreeMap<String, CanisterDecl>,
}

impl ProjectManifest {
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let manifest: Self = serde_json::from_str(&content).map_err(|e| ManifestError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;

    debug!(path = %path.display(), canisters = manifest.canisters.len(), "loaded project manifest");
    Ok(manifest)
  }

  /// Canister names, sorted.
  pub fn canister_names(&self) -> Vec<String> {
    self.canisters.keys().cloned().collect()
  }

  /// Canister name -> Candid path, as written in the manifest.
  pub fn candid_paths(&self) -> BTreeMap<String, PathBuf> {
    self
      .canisters
      .iter()
      .map(|(name, decl)| (name.clone(), decl.candid.clone()))
      .collect()
  }
}
