//! Command-line entry point: export the card data repository found through
//! `cardset-export.toml` / `CARDSET_EXPORT_*` into `cards.json` and `sets.json`.
//!
//! The published paths are printed to stdout, one per line, for the next
//! pipeline step. Logs go to stderr and follow `RUST_LOG` (default `info`).

use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cardset_export::{run_export, ExportConfig};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // `log` records are bridged in by the tracing-log feature
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let project_dir = env::current_dir().context("cannot determine the project directory")?;
    let config = ExportConfig::load(&project_dir).context("failed to load export configuration")?;

    let summary = run_export(config).await.context("card data export failed")?;
    log::info!(
        "Exported {} sets and {} cards",
        summary.set_count,
        summary.card_count
    );

    println!("{}", summary.artifacts.cards_path.display());
    println!("{}", summary.artifacts.sets_path.display());
    Ok(())
}
