//! Build invocation.
//!
//! Packaging never compiles anything itself: a [`Builder`] produces the
//! release binaries, and any failure aborts the run before packaging starts.
//!
//! # Submodules
//!
//! - [`shell`] - runs the configured build command through the platform shell

mod shell;

use thiserror::Error;

pub use shell::ShellBuilder;

/// Errors that can occur while building the project.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The build process could not be started.
  #[error("failed to spawn build command `{cmd}`: {source}")]
  Spawn { cmd: String, source: std::io::Error },

  /// The build process exited unsuccessfully.
  #[error("build command `{cmd}` failed with exit code {code:?}")]
  Failed { cmd: String, code: Option<i32> },
}

/// Something that can produce the release binaries of a project.
pub trait Builder {
  fn build(&self) -> Result<(), BuildError>;
}

impl<B: Builder + ?Sized> Builder for &B {
  fn build(&self) -> Result<(), BuildError> {
    (**self).build()
  }
}
