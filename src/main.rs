use clap::Parser;
use smarttv_emulator::{Cli, Config, Emulator};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::try_from(Cli::parse())?;
    tracing::info!("Starting emulator on {}", config.listen_addr);

    let emulator = Emulator::bind(config).await?;
    emulator.run().await?;
    Ok(())
}
