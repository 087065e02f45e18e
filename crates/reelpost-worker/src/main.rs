//! Scheduled posting worker binary.

use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use reelpost_ai::OpenAiClient;
use reelpost_media::check_ffmpeg;
use reelpost_models::PostKind;
use reelpost_worker::{init_tracing, metrics, FailureTracker, Pipeline, Services, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting reelpost-worker");

    let config = match WorkerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Worker config: {:?}", config);

    if let Some(addr) = config.metrics_addr {
        if let Err(e) = metrics::init_metrics(addr) {
            error!("Failed to start metrics exporter: {}", e);
            std::process::exit(1);
        }
    }

    if config.creates(PostKind::Reel) {
        if let Err(e) = check_ffmpeg() {
            error!("Reels requested but {}", e);
            std::process::exit(1);
        }
    }

    let services = match Services::from_env(&config).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create clients: {}", e);
            std::process::exit(1);
        }
    };

    let generator = match OpenAiClient::from_env() {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create OpenAI client: {}", e);
            std::process::exit(1);
        }
    };

    let run_interval = config.run_interval;
    let pipeline = Pipeline::new(
        config,
        Arc::new(generator),
        services.store.clone(),
        services.assembler.clone(),
        services.publisher(),
        services.presign_ttl(),
    );

    // First tick fires immediately
    let mut ticker = interval(run_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures = FailureTracker::new(3);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match pipeline.run_once().await {
                    Ok(report) => {
                        failures.record_success();
                        info!(
                            run_id = %report.run_id,
                            niche = %report.fact.niche,
                            "Run published {} item(s); next in {:?}",
                            report.published.len(),
                            run_interval
                        );
                        if let Ok(json) = serde_json::to_string(&report) {
                            debug!("Run report: {}", json);
                        }
                    }
                    Err(e) => {
                        if failures.record_failure() {
                            error!("Run failed ({}): {}", e.kind(), e);
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!("Worker shutdown complete");
}
