//! Publish the archived reels as one compilation.

use anyhow::Context;
use tracing::info;

use reelpost_worker::{init_tracing, Combinator, Services, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::from_env().context("invalid configuration")?;
    info!(
        mode = config.combo_mode.as_str(),
        reels_dir = %config.reels_dir.display(),
        "Starting reelpost-combine"
    );

    let services = Services::from_env(&config).await.context("failed to create clients")?;

    let identity = services
        .graph
        .identity()
        .await
        .context("identity check failed")?;
    info!(
        id = %identity.id,
        username = identity.username.as_deref().unwrap_or("-"),
        "Graph identity verified"
    );

    let combinator = Combinator::new(
        config.combo_mode,
        config.reels_dir.clone(),
        config.caption_suffix.clone(),
        services.store.clone(),
        services.assembler.clone(),
        services.publisher(),
        services.presign_ttl(),
    );

    match combinator.run().await.context("compilation failed")? {
        Some(published) => info!(media_id = %published.media_id, "Compilation published"),
        None => info!("Nothing to publish"),
    }
    Ok(())
}
