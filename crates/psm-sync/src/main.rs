//! psm-sync binary.
//!
//! Reads `psm-sync.toml` (or the path given with `--config`), builds the
//! SQLite database from the BVL API, and writes the artifacts plus
//! `manifest.json` into the output directory.
//!
//! ```text
//! psm-sync --config psm-sync.toml --output-dir dist
//! psm-sync --from-dir dumps/ --no-compress
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use psm_sync::{
  SyncConfig,
  fetch::{DirFetcher, HttpFetcher},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Build the BVL plant-protection SQLite artifact")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "psm-sync.toml")]
  config: PathBuf,

  /// Directory the database, compressed copies and manifest are written to.
  #[arg(short, long)]
  output_dir: Option<PathBuf>,

  /// Read `<entity>.json` dumps from this directory instead of the API.
  #[arg(long, value_name = "DIR")]
  from_dir: Option<PathBuf>,

  /// Skip the compressed copies.
  #[arg(long)]
  no_compress: bool,
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut config = SyncConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
  if let Some(dir) = cli.output_dir {
    config.output_dir = dir;
  }
  if cli.no_compress {
    config.compress = false;
  }

  let summary = match &cli.from_dir {
    Some(dir) => psm_sync::run(&config, &DirFetcher::new(dir)),
    None => {
      let fetcher = HttpFetcher::new(&config).context("failed to build HTTP client")?;
      psm_sync::run(&config, &fetcher)
    }
  }
  .context("build failed")?;

  for (entity, rejected) in &summary.rejected {
    tracing::warn!(%entity, rejected, "rows rejected on insert");
  }
  for report in &summary.enrichment {
    if report.unresolved > 0 {
      tracing::warn!(
        pass = ?report.pass,
        unresolved = report.unresolved,
        "enrichment left rows unresolved"
      );
    }
  }
  tracing::info!(manifest = %summary.manifest_path.display(), "done");

  Ok(())
}
