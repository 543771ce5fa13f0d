//! Project layout and packaging configuration.
//!
//! Every path the pipeline touches is derived from a single project root, so
//! a run can be pointed at any dfx project (and tests can use a temp dir).

use std::path::{Path, PathBuf};

use crate::consts::{
  BUILD_COMMAND_ENV, CANISTER_IDS_DIR, DEFAULT_BUILD_COMMAND, DFX_JSON, MAX_WASM_SIZE, PACKAGE_DIR, RELEASE_DIR,
};

/// Paths of a dfx project, all resolved against its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
  pub root: PathBuf,
  /// The project `dfx.json`.
  pub manifest: PathBuf,
  /// One identity file per deployment environment.
  pub canister_ids_dir: PathBuf,
  /// Output root, wiped at the start of each packaging run.
  pub package_dir: PathBuf,
  /// Compiled `.wasm` binaries.
  pub release_dir: PathBuf,
}

impl ProjectLayout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    Self {
      manifest: root.join(DFX_JSON),
      canister_ids_dir: root.join(CANISTER_IDS_DIR),
      package_dir: root.join(PACKAGE_DIR),
      release_dir: root.join(RELEASE_DIR),
      root,
    }
  }

  /// Resolves a project-relative path (such as a `candid` entry) against the root.
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }
}

/// Everything a packaging run needs to know.
#[derive(Debug, Clone)]
pub struct PackageConfig {
  pub layout: ProjectLayout,
  /// Shell command that produces the release binaries.
  pub build_command: String,
  /// Upper bound, in bytes, for every canister binary.
  pub max_wasm_size: u64,
}

impl PackageConfig {
  /// Configuration for the project at `root` with default settings.
  ///
  /// The build command honours `CANPACK_BUILD_COMMAND` when set.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      layout: ProjectLayout::new(root),
      build_command: build_command(),
      max_wasm_size: MAX_WASM_SIZE,
    }
  }

  /// Like [`PackageConfig::new`], but canonicalizes `root` first.
  ///
  /// Fails if the project directory does not exist.
  pub fn discover(root: &Path) -> std::io::Result<Self> {
    Ok(Self::new(dunce::canonicalize(root)?))
  }

  pub fn with_build_command(mut self, command: impl Into<String>) -> Self {
    self.build_command = command.into();
    self
  }
}

/// Returns the configured build command, falling back to `dfx build`.
pub fn build_command() -> String {
  std::env::var(BUILD_COMMAND_ENV)
    .ok()
    .filter(|cmd| !cmd.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string())
}
