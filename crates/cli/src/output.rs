//! Terminal output for packaging results.
//!
//! Text mode prints colored summaries of canisters, environments and archives;
//! JSON mode prints the library's serializable reports unchanged.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use canpack_lib::archive::Archive;
use canpack_lib::stage::StagedEnvironment;
use canpack_lib::validate::{Artifact, bytes_to_mib};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Short form of a hex digest for display.
pub fn short_digest(digest: &str) -> &str {
  &digest[..digest.len().min(12)]
}

/// Sizes in binary units; canister binaries always show as MiB.
pub fn format_size(bytes: u64) -> String {
  const KIB: u64 = 1024;

  if bytes >= KIB * KIB {
    format!("{:.2} MiB", bytes_to_mib(bytes))
  } else if bytes >= KIB {
    format!("{:.1} KiB", bytes as f64 / KIB as f64)
  } else {
    format!("{} B", bytes)
  }
}

/// Share of the size limit a binary uses, e.g. `50%`.
pub fn format_limit_usage(size: u64, limit: u64) -> String {
  if limit == 0 {
    return "-".to_string();
  }
  format!("{:.0}%", size as f64 * 100.0 / limit as f64)
}

pub fn format_duration(duration: Duration) -> String {
  let millis = duration.as_millis();
  if millis >= 1000 {
    format!("{:.2}s", duration.as_secs_f64())
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One line per canister: name, packaged size and share of the limit.
pub fn print_artifact(artifact: &Artifact, limit: u64) {
  let note = if artifact.optimized { ", optimized" } else { "" };
  println!(
    "  {} {}: {} ({} of limit{})",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    artifact.name.if_supports_color(Stream::Stdout, |s| s.bold()),
    format_size(artifact.size),
    format_limit_usage(artifact.size, limit),
    note
  );
}

pub fn print_staged(staged: &StagedEnvironment, package_dir: &Path) {
  let dir = staged.dir.strip_prefix(package_dir).unwrap_or(&staged.dir);
  println!(
    "  {} {} {} {} ({} files)",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    staged.name.if_supports_color(Stream::Stdout, |s| s.bold()),
    symbols::ARROW,
    dir.display(),
    staged.files
  );
}

pub fn print_archive(archive: &Archive) {
  print_success(&format!("{} created", archive.path.display()));
  print_stat("Entries", &archive.entries.to_string());
  print_stat("Size", &format_size(archive.bytes));
  print_stat("SHA-256", short_digest(&archive.sha256.0));
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")?;
  println!("{}", json);
  Ok(())
}
