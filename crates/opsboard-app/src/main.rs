//! `opsboard` 바이너리 진입점.

use anyhow::Result;
use clap::Parser;
use opsboard_app::cli::Cli;
use opsboard_app::commands;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화 (RUST_LOG가 있으면 우선)
    let log_filter = format!(
        "opsboard={lvl},opsboard_app={lvl},opsboard_core={lvl},opsboard_analysis={lvl},opsboard_network={lvl},opsboard_sync={lvl}",
        lvl = cli.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::run(cli).await
}
