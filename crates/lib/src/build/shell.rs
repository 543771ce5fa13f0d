//! Shell-backed [`Builder`].

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use super::{BuildError, Builder};

/// Runs a build command line (e.g. `dfx build`) from the project root.
///
/// The command inherits the parent's environment and stdio so that the
/// build tool's own progress output reaches the user unchanged.
#[derive(Debug, Clone)]
pub struct ShellBuilder {
  command: String,
  cwd: PathBuf,
}

impl ShellBuilder {
  pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      command: command.into(),
      cwd: cwd.into(),
    }
  }
}

impl Builder for ShellBuilder {
  fn build(&self) -> Result<(), BuildError> {
    info!(cmd = %self.command, "running build");

    let (shell_cmd, shell_args) = platform_shell();
    debug!(shell = %shell_cmd, cwd = ?self.cwd, "spawning process");

    let status = Command::new(shell_cmd)
      .args(shell_args)
      .arg(&self.command)
      .current_dir(&self.cwd)
      .status()
      .map_err(|e| BuildError::Spawn {
        cmd: self.command.clone(),
        source: e,
      })?;

    if !status.success() {
      return Err(BuildError::Failed {
        cmd: self.command.clone(),
        code: status.code(),
      });
    }

    debug!(cmd = %self.command, "build finished");
    Ok(())
  }
}

/// Shell and arguments used to run a command line: `/bin/sh -c` on Unix,
/// PowerShell on Windows.
fn platform_shell() -> (&'static str, &'static [&'static str]) {
  #[cfg(unix)]
  {
    ("/bin/sh", &["-c"])
  }

  #[cfg(windows)]
  {
    ("powershell.exe", &["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"])
  }
}
