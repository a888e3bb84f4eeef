use streamer_api::{setup, telemetry};
use streamer_core::Config;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;
    telemetry::init_telemetry()?;
    tracing::info!("Configuration loaded and validated successfully");

    let shutdown = CancellationToken::new();
    let (_state, router) = setup::initialize_app(&config, shutdown.clone()).await?;

    setup::server::start_server(&config, router, shutdown).await?;

    Ok(())
}
