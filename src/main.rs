mod config;
mod forge;
mod git;
mod migrate;
mod naming;
mod walker;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::forge::github::GitHubDest;
use crate::forge::gitlab::GitLabSource;
use crate::migrate::GitMirrorTransfer;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "forgemigrate",
    about = "Migrates nested source-forge group hierarchies into a flat destination organization"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "forgemigrate.yaml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // ---- CLI ----
    let cli = Cli::parse();

    // ---- Tracing ----
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ---- Config ----
    let config = config::load_config(&cli.config)?;
    tracing::info!(config_path = %cli.config, "starting forgemigrate");

    // ---- Work directory for mirror clones ----
    let work_dir = PathBuf::from(&config.migrate.work_dir);
    tokio::fs::create_dir_all(&work_dir)
        .await
        .with_context(|| format!("failed to create work dir: {}", work_dir.display()))?;

    // ---- Clients ----
    let http_client = reqwest::Client::builder()
        .user_agent("forgemigrate/0.1")
        .build()
        .context("failed to build reqwest client")?;

    let source = GitLabSource::new(&config);
    let dest = GitHubDest::new(&config);
    let transfer = GitMirrorTransfer::new(work_dir);

    // ---- Run ----
    let report = migrate::run(
        &source,
        &dest,
        &transfer,
        &http_client,
        config.migrate.name_max_len,
    )
    .await?;

    // ---- Summary ----
    // Partial failure does not change the exit status; the report is the
    // machine-checkable record of what happened.
    println!(
        "migration complete: {} migrated, {} skipped",
        report.migrated_count(),
        report.skipped().count()
    );
    for entry in report.skipped() {
        println!(
            "  skipped {} (as {}): {}",
            entry.project,
            entry.repo_name,
            entry.outcome.reason().unwrap_or("unknown"),
        );
    }

    Ok(())
}
