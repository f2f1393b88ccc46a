use anyhow::{Context, Result};
use camstream_lib::commands::{discovery, recording, AppState};
use camstream_lib::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    camstream_lib::init_tracing();
    tracing::info!("Starting CamStream v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load config")?;
    config.validate().context("Invalid config")?;

    let state = AppState::new(config).context("Failed to initialise application state")?;

    let ip = discovery::pair_camera(&state)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.code, e.message))?;
    println!("Camera found at {}", ip);

    let path = recording::start_recording(&state)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.code, e.message))?;
    println!("Recording to {} (Ctrl+C to stop)", path);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    let saved = recording::stop_recording(&state)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.code, e.message))?;
    println!("Saved {}", saved);

    Ok(())
}
