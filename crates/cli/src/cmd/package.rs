//! Implementation of the `canpack package` command.
//!
//! Builds the project, validates canister binaries and stages one directory
//! per environment under `package/`.

use std::time::Instant;

use anyhow::Result;

use canpack_lib::build::ShellBuilder;
use canpack_lib::fs::LocalFs;
use canpack_lib::package::{PackageReport, package};

use super::{CommandOptions, packaging_failed};
use crate::output::{format_duration, print_artifact, print_info, print_json, print_stat, print_staged, print_success};

/// Execute the package command.
pub fn cmd_package(opts: &CommandOptions) -> Result<()> {
  let start = Instant::now();
  let config = opts.config()?;
  let builder = ShellBuilder::new(&config.build_command, &config.layout.root);

  let report = package(&config, &builder, &LocalFs).map_err(packaging_failed)?;

  if opts.output.is_json() {
    print_json(&report)?;
  } else {
    println!();
    print_package_summary(&report, config.max_wasm_size);
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}

/// Prints canister sizes and staged environments.
pub(crate) fn print_package_summary(report: &PackageReport, limit: u64) {
  print_success("Packaging complete!");

  println!();
  println!("Canisters:");
  for artifact in &report.artifacts {
    print_artifact(artifact, limit);
  }

  println!();
  if report.staged.is_empty() {
    print_info("No environments found; nothing was staged.");
  } else {
    println!("Environments:");
    for staged in &report.staged {
      print_staged(staged, &report.package_dir);
    }
  }

  println!();
  print_stat("Package directory", &report.package_dir.display().to_string());
}
