mod package;
mod package_zip;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use canpack_lib::config::PackageConfig;
use canpack_lib::package::{ErrorCategory, PackageError};

use crate::output::OutputFormat;

pub use package::cmd_package;
pub use package_zip::cmd_package_zip;

/// Options shared by every subcommand.
pub struct CommandOptions {
  pub project_dir: PathBuf,
  pub build_command: Option<String>,
  pub output: OutputFormat,
}

impl CommandOptions {
  /// Resolves the packaging configuration for the selected project.
  pub fn config(&self) -> Result<PackageConfig> {
    let config = PackageConfig::discover(&self.project_dir)
      .with_context(|| format!("Project directory not found: {}", self.project_dir.display()))?;

    let config = match &self.build_command {
      Some(cmd) => config.with_build_command(cmd),
      None => config,
    };

    debug!(
      root = %config.layout.root.display(),
      build_command = %config.build_command,
      "resolved configuration"
    );
    Ok(config)
  }
}

/// Wraps a pipeline error with a headline naming its category.
pub(crate) fn packaging_failed(err: PackageError) -> anyhow::Error {
  let headline = match err.category() {
    ErrorCategory::Configuration => "Invalid project configuration",
    ErrorCategory::Build => "Build failed",
    ErrorCategory::Validation => "Canister validation failed",
    ErrorCategory::Io => "Failed to write package output",
  };
  anyhow::Error::new(err).context(headline)
}
