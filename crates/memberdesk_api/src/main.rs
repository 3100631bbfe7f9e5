use clap::Parser;
use memberdesk_api::{run_server, CliArgs, ServerConfig};
use memberdesk_core::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing `.env` is normal outside development.
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_args(CliArgs::parse())?;
    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    run_server(config).await
}
