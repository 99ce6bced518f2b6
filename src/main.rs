use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use subgrab::config::{Cli, Config};
use subgrab::pipeline::{Pipeline, PipelineOptions};
use subgrab::prompt::Terminal;
use subgrab::subdl::SubdlClient;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = dotenv();
    init_tracing();
    match env_file {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env file loaded ({}) - relying on environment", e),
    }

    let config = Config::from_cli(Cli::parse())?;
    info!(
        "Looking up {} subtitles for {}",
        config.kind, config.file_name
    );

    let client = SubdlClient::new(config.api_key.clone())?;
    let mut terminal = Terminal;
    let options = PipelineOptions {
        download_dir: config.download_dir.clone(),
        season_filter: config.season_filter,
    };
    let saved = Pipeline::new(&client, &mut terminal, options)
        .run(&config.file_name, config.kind)
        .await?;
    info!("Saved {}", saved.display());
    Ok(())
}
