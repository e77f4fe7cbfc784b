use std::path::PathBuf;

use clap::{Parser, Subcommand};
use malsync::{Error, Result, cmd};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the malsync application
#[derive(Parser)]
#[command(name = "malsync")]
#[command(about = "Sync MyAnimeList records into a markdown vault")]
#[command(version)]
struct Cli {
   #[command(subcommand)]
   command: Cmd,
}

/// Available subcommands for malsync
#[derive(Subcommand)]
enum Cmd {
   #[command(about = "Sync a JSON file of records into a vault")]
   Sync {
      #[arg(help = "Path to a JSON array of media records")]
      records: PathBuf,

      #[arg(help = "Vault root directory")]
      vault: PathBuf,

      #[arg(long, help = "Folder for newly created documents (default: from config)")]
      folder: Option<String>,

      #[arg(short = 'f', long, help = "Re-process records even when timestamps match")]
      force: bool,

      #[arg(long, help = "JSON output")]
      json: bool,
   },

   #[command(about = "Check a string against the identifier grammar")]
   Validate {
      #[arg(help = "Identifier to validate, e.g. mal:anime:1245")]
      identifier: String,

      #[arg(long, help = "JSON output")]
      json: bool,
   },
}

#[tokio::main]
async fn main() {
   tracing_subscriber::fmt()
      .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
      .init();

   let cli = Cli::parse();
   if let Err(err) = run(cli).await {
      if !matches!(err, Error::Reported { .. }) {
         eprintln!("{err}");
      }
      std::process::exit(err.exit_code());
   }
}

async fn run(cli: Cli) -> Result<()> {
   match cli.command {
      Cmd::Sync { records, vault, folder, force, json } => {
         cmd::sync::execute(records, vault, folder, force, json).await
      },
      Cmd::Validate { identifier, json } => cmd::validate::execute(identifier, json),
   }
}
