use std::io;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::debug;

use retire_cli::cli::{Cli, Command};
use retire_cli::{AppConfig, app, commands, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::resolve(&cli.global).context("failed to load configuration")?;
    logging::init(&config.logging).context("failed to initialise logging")?;

    let db_config = config.db_config();
    debug!(
        backend = %db_config.backend,
        connection = %db_config.connection_string,
        "connecting"
    );
    let repo = app::open_repository(&db_config)
        .await
        .with_context(|| format!("failed to open {} database", db_config.backend))?;

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            commands::shell(stdin, repo.as_ref(), &mut stdout).await?;
        }
        command => commands::run(command, repo.as_ref(), &mut stdout).await?,
    }

    Ok(())
}
