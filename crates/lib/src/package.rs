//! The packaging pipeline.
//!
//! One linear pass with no resumption:
//! 1. build the project
//! 2. read the project `dfx.json`
//! 3. discover environments
//! 4. validate canister binaries
//! 5. synthesize the deployment manifest
//! 6. reset the package directory and stage every environment
//!
//! Archiving is a second phase that only runs once every environment has been
//! staged. The first error aborts the run; already written output is left as is.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::archive::{Archive, ArchiveError, archive_environment};
use crate::build::{BuildError, Builder};
use crate::config::PackageConfig;
use crate::environment::{Environment, EnvironmentError, discover_environments};
use crate::fs::FileSystem;
use crate::manifest::{DeployManifest, ManifestError, ProjectManifest};
use crate::stage::{StageError, StagedEnvironment, reset_output_root, stage_environment};
use crate::validate::{Artifact, ValidateError, validate_artifacts};

#[derive(Debug, Error)]
pub enum PackageError {
  #[error(transparent)]
  Environment(#[from] EnvironmentError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Validate(#[from] ValidateError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error(transparent)]
  Archive(#[from] ArchiveError),
}

/// Broad class of a packaging failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
  /// Missing or unreadable configuration directory or manifest.
  Configuration,
  /// The external build command failed.
  Build,
  /// A canister binary exceeds the size limit.
  Validation,
  /// Copying, writing or archiving failed.
  Io,
}

impl PackageError {
  pub fn category(&self) -> ErrorCategory {
    match self {
      PackageError::Environment(_) => ErrorCategory::Configuration,
      PackageError::Manifest(ManifestError::Serialize(_)) => ErrorCategory::Io,
      PackageError::Manifest(_) => ErrorCategory::Configuration,
      PackageError::Build(_) => ErrorCategory::Build,
      PackageError::Validate(ValidateError::TooLarge { .. }) => ErrorCategory::Validation,
      PackageError::Validate(_) => ErrorCategory::Io,
      PackageError::Stage(_) | PackageError::Archive(_) => ErrorCategory::Io,
    }
  }
}

/// Outcome of the packaging phase.
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
  pub package_dir: PathBuf,
  pub environments: Vec<Environment>,
  pub artifacts: Vec<Artifact>,
  pub staged: Vec<StagedEnvironment>,
}

/// Outcome of packaging followed by archiving.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
  #[serde(flatten)]
  pub package: PackageReport,
  pub archives: Vec<Archive>,
}

/// Builds, validates and stages every environment.
pub fn package<B: Builder, F: FileSystem>(
  config: &PackageConfig,
  builder: &B,
  fs: &F,
) -> Result<PackageReport, PackageError> {
  let layout = &config.layout;

  builder.build()?;

  let project = ProjectManifest::load(&layout.manifest)?;
  let names = project.canister_names();
  info!(canisters = ?names, "loaded canister declarations");

  let candids: BTreeMap<String, PathBuf> = project
    .candid_paths()
    .into_iter()
    .map(|(name, path)| (name, layout.resolve(&path)))
    .collect();

  let environments = discover_environments(&layout.canister_ids_dir)?;

  let artifacts = validate_artifacts(fs, &layout.release_dir, &names, config.max_wasm_size)?;

  let manifest_json = DeployManifest::for_canisters(&names).to_json_pretty()?;

  reset_output_root(&layout.package_dir)?;

  let staged = environments
    .iter()
    .map(|env| stage_environment(&layout.package_dir, env, &artifacts, &candids, &manifest_json))
    .collect::<Result<Vec<_>, _>>()?;

  info!(
    environments = staged.len(),
    dir = %layout.package_dir.display(),
    "packaging complete"
  );

  Ok(PackageReport {
    package_dir: layout.package_dir.clone(),
    environments,
    artifacts,
    staged,
  })
}

/// Archives every staged environment of a finished packaging run.
pub fn archive(report: &PackageReport) -> Result<Vec<Archive>, PackageError> {
  let archives = report
    .staged
    .iter()
    .map(|staged| archive_environment(&report.package_dir, &staged.name))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(archives)
}

/// Runs [`package`], then [`archive`] on its result.
pub fn package_and_archive<B: Builder, F: FileSystem>(
  config: &PackageConfig,
  builder: &B,
  fs: &F,
) -> Result<ArchiveReport, PackageError> {
  let package = package(config, builder, fs)?;
  let archives = archive(&package)?;

  Ok(ArchiveReport { package, archives })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::Cell;
  use std::fs;
  use std::path::Path;
  use tempfile::TempDir;

  use crate::consts::MAX_WASM_SIZE;
  use crate::fs::LocalFs;

  const MIB: usize = 1024 * 1024;

  /// Builder that writes release binaries the way `dfx build` would.
  struct FakeBuilder {
    release_dir: PathBuf,
    binaries: Vec<(&'static str, usize)>,
    fail: bool,
    calls: Cell<usize>,
  }

  impl FakeBuilder {
    fn new(config: &PackageConfig, binaries: &[(&'static str, usize)]) -> Self {
      Self {
        release_dir: config.layout.release_dir.clone(),
        binaries: binaries.to_vec(),
        fail: false,
        calls: Cell::new(0),
      }
    }

    fn failing(config: &PackageConfig) -> Self {
      Self {
        fail: true,
        ..Self::new(config, &[])
      }
    }
  }

  impl Builder for FakeBuilder {
    fn build(&self) -> Result<(), BuildError> {
      self.calls.set(self.calls.get() + 1);
      if self.fail {
        return Err(BuildError::Failed {
          cmd: "dfx build".to_string(),
          code: Some(1),
        });
      }
      fs::create_dir_all(&self.release_dir).unwrap();
      for (file, size) in &self.binaries {
        fs::write(self.release_dir.join(file), vec![1u8; *size]).unwrap();
      }
      Ok(())
    }
  }

  fn project(root: &Path, canisters: &[&str], envs: &[&str]) -> PackageConfig {
    let decls: serde_json::Map<String, serde_json::Value> = canisters
      .iter()
      .map(|name| {
        (
          name.to_string(),
          serde_json::json!({ "candid": format!("src/{name}/{name}.did"), "type": "rust" }),
        )
      })
      .collect();
    fs::write(
      root.join("dfx.json"),
      serde_json::to_string(&serde_json::json!({ "canisters": decls })).unwrap(),
    )
    .unwrap();

    for name in canisters {
      let dir = root.join("src").join(name);
      fs::create_dir_all(&dir).unwrap();
      fs::write(dir.join(format!("{name}.did")), format!("service {name} : {{}}")).unwrap();
    }

    fs::create_dir_all(root.join("canister_ids")).unwrap();
    for env in envs {
      fs::write(
        root.join("canister_ids").join(format!("{env}.json")),
        format!(r#"{{"ledger":{{"{env}":"aaaaa-aa"}}}}"#),
      )
      .unwrap();
    }

    PackageConfig::new(root).with_build_command("dfx build")
  }

  #[test]
  fn packages_every_environment() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger", "index"], &["local", "ic"]);
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", MIB), ("index.wasm", 2048)]);

    let report = package(&config, &builder, &LocalFs).unwrap();

    assert_eq!(builder.calls.get(), 1);
    assert_eq!(report.staged.len(), 2);
    assert_eq!(report.artifacts.len(), 2);
    for env in ["ic", "local"] {
      let dir = temp.path().join("package").join(env);
      for file in ["assets/ledger.wasm", "assets/ledger.did", "assets/index.wasm", "assets/index.did"] {
        assert!(dir.join(file).is_file(), "{env}/{file} missing");
      }
      let manifest: DeployManifest = serde_json::from_str(&fs::read_to_string(dir.join("dfx.json")).unwrap()).unwrap();
      assert_eq!(manifest.canisters.keys().collect::<Vec<_>>(), vec!["index", "ledger"]);
    }
  }

  #[test]
  fn build_failure_stops_before_packaging() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local"]);
    let builder = FakeBuilder::failing(&config);

    let err = package(&config, &builder, &LocalFs).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Build);
    assert!(!temp.path().join("package").exists());
  }

  #[test]
  fn oversized_binary_aborts_before_staging() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local"]);
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", MAX_WASM_SIZE as usize + 1)]);

    let err = package(&config, &builder, &LocalFs).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.to_string().contains("ledger.wasm is too large"));
    assert!(!temp.path().join("package").exists());
  }

  #[test]
  fn oversized_binary_keeps_previous_package_output() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local"]);
    fs::create_dir_all(temp.path().join("package").join("local")).unwrap();
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", 3 * MIB)]);

    package(&config, &builder, &LocalFs).unwrap_err();

    assert!(temp.path().join("package").join("local").is_dir());
  }

  #[test]
  fn optimized_binary_is_packaged() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local"]);
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", 3 * MIB), ("ledger_opt.wasm", 512)]);

    let report = package(&config, &builder, &LocalFs).unwrap();

    assert!(report.artifacts[0].optimized);
    let packaged = fs::read(temp.path().join("package/local/assets/ledger.wasm")).unwrap();
    assert_eq!(packaged.len(), 512);
  }

  #[test]
  fn missing_manifest_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local"]);
    fs::remove_file(&config.layout.manifest).unwrap();
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", 10)]);

    let err = package(&config, &builder, &LocalFs).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
  }

  #[test]
  fn missing_environment_directory_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &[]);
    fs::remove_dir(&config.layout.canister_ids_dir).unwrap();
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", 10)]);

    let err = package(&config, &builder, &LocalFs).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("canister_ids"));
  }

  #[test]
  fn shared_environment_stem_aborts_before_staging() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local"]);
    fs::write(config.layout.canister_ids_dir.join("local.ids"), "OTHER-IDS").unwrap();
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", 4096)]);

    let err = package_and_archive(&config, &builder, &LocalFs).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(err.to_string().contains("environment local is declared twice"));
    assert!(!temp.path().join("package").exists());
  }

  #[test]
  fn package_and_archive_zips_each_environment() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local", "ic"]);
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", 4096)]);

    let report = package_and_archive(&config, &builder, &LocalFs).unwrap();

    let zips: Vec<PathBuf> = report.archives.iter().map(|a| a.path.clone()).collect();
    let package_dir = temp.path().join("package");
    assert_eq!(zips, vec![package_dir.join("ic.zip"), package_dir.join("local.zip")]);
    assert!(zips.iter().all(|p| p.is_file()));
    assert_eq!(report.package.staged.len(), 2);
  }

  #[test]
  fn archive_failure_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let config = project(temp.path(), &["ledger"], &["local"]);
    let builder = FakeBuilder::new(&config, &[("ledger.wasm", 4096)]);
    let report = package(&config, &builder, &LocalFs).unwrap();
    fs::remove_dir_all(temp.path().join("package").join("local")).unwrap();

    let err = archive(&report).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Io);
  }
}
