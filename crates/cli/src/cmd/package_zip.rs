//! Implementation of the `canpack package-zip` command.
//!
//! Runs the full `package` pipeline and then zips each staged environment.

use std::time::Instant;

use anyhow::Result;

use canpack_lib::build::ShellBuilder;
use canpack_lib::fs::LocalFs;
use canpack_lib::package::package_and_archive;

use super::package::print_package_summary;
use super::{CommandOptions, packaging_failed};
use crate::output::{format_duration, print_archive, print_json, print_stat};

/// Execute the package-zip command.
pub fn cmd_package_zip(opts: &CommandOptions) -> Result<()> {
  let start = Instant::now();
  let config = opts.config()?;
  let builder = ShellBuilder::new(&config.build_command, &config.layout.root);

  let report = package_and_archive(&config, &builder, &LocalFs).map_err(packaging_failed)?;

  if opts.output.is_json() {
    print_json(&report)?;
    return Ok(());
  }

  println!();
  print_package_summary(&report.package, config.max_wasm_size);

  println!();
  for archive in &report.archives {
    print_archive(archive);
  }
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
