mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// canpack - package dfx canisters into per-environment archives
#[derive(Parser)]
#[command(name = "canpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Project directory containing dfx.json (default: current directory)
  #[arg(short = 'C', long, global = true, default_value = ".")]
  project_dir: PathBuf,

  /// Build command to run before packaging (default: $CANPACK_BUILD_COMMAND or `dfx build`)
  #[arg(long, global = true)]
  build_command: Option<String>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build, validate and stage every environment under package/
  Package,

  /// Package, then zip each staged environment into package/<env>.zip
  PackageZip,
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if let Err(e) = run(cli) {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let opts = cmd::CommandOptions {
    project_dir: cli.project_dir,
    build_command: cli.build_command,
    output: cli.output,
  };

  match cli.command {
    Commands::Package => cmd::cmd_package(&opts),
    Commands::PackageZip => cmd::cmd_package_zip(&opts),
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
