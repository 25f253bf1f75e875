use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use output::OutputFormat;

/// quarry - expose files through a build graph
#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project root directory
  #[arg(long, default_value = ".", global = true)]
  root: PathBuf,

  /// Manifest path, relative to the project root
  #[arg(long, default_value = "quarry.json", global = true)]
  manifest: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the steps a build would run, without touching the filesystem
  Plan,

  /// Plan and execute every rule
  Build,

  /// List declared targets and their outputs
  Targets {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Plan => cmd::cmd_plan(&cli.root, &cli.manifest),
    Commands::Build => cmd::cmd_build(&cli.root, &cli.manifest),
    Commands::Targets { format } => cmd::cmd_targets(&cli.root, &cli.manifest, format),
  }
}
