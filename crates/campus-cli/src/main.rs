//! `campus`: command-line front end for the Campus Connect session store.
//!
//! # Usage
//!
//! ```text
//! campus signup-student --email jo@uni.edu --password secret1 \
//!   --full-name "Jo Park" --university State --department Physics \
//!   --graduation-year 2026
//! campus login --email jo@uni.edu --password secret1
//! campus whoami
//! campus logout
//! ```

mod commands;
mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use campus_session::SessionStore;
use clap::Parser;
use commands::Command;
use config::CliConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus", version, about = "Campus Connect account and session tool")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "campus.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  let (provider, documents) = campus_store_sqlite::open_pair(&cfg.store_path)
    .await
    .with_context(|| format!("opening store at {}", cfg.store_path.display()))?;
  tracing::debug!(path = %cfg.store_path.display(), "store opened");

  let store = SessionStore::new(Arc::new(provider), Arc::new(documents));
  store
    .wait_until_settled()
    .await
    .context("session store shut down during startup")?;

  let outcome = commands::run(&store, cli.command).await;
  store.shutdown();

  print!("{}", ensure_newline(outcome?));
  Ok(())
}

fn ensure_newline(mut text: String) -> String {
  if !text.ends_with('\n') {
    text.push('\n');
  }
  text
}
