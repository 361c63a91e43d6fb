use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use advice_runner::advice::{AdviceService, AdviceSource, CannedAdvice};
use advice_runner::config::RunnerConfig;
use advice_runner::game::game_loop::{self, LoopSummary};
use advice_runner::game::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Advice Runner v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = RunnerConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: mode={:?}, base_speed={}, platforms={}, stars={}, hazards={}, advice={}",
        config.player.mode,
        config.difficulty.base_speed,
        config.platforms.capacity,
        config.stars.enabled,
        config.hazards.enabled,
        config.advice.enabled
    );

    let advice_enabled = config.advice.enabled;
    let advice_config = config.advice.clone();
    let session = Arc::new(Mutex::new(Session::new(config)?));

    let summary = if !advice_enabled {
        drive::<CannedAdvice>(session.clone(), None).await
    } else {
        drive_with_advice(session.clone(), &advice_config).await
    };

    info!(
        "Runner stopped: {} ticks, {} runs, best score {}, {} advice lines",
        summary.ticks, summary.runs, summary.best_score, summary.advice_shown
    );
    if std::env::var("RUNNER_SUMMARY_JSON").is_ok() {
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}

#[cfg(feature = "advice")]
async fn drive_with_advice(
    session: Arc<Mutex<Session>>,
    config: &advice_runner::config::AdviceConfig,
) -> LoopSummary {
    match advice_runner::advice::AdviceClient::new(config) {
        Ok(client) => {
            info!("Advice endpoint: {}", client.endpoint());
            drive(session, Some(&AdviceService::new(client))).await
        }
        Err(e) => {
            tracing::warn!("Advice client unavailable ({}), using canned lines", e);
            drive(session, Some(&AdviceService::new(CannedAdvice::new()))).await
        }
    }
}

#[cfg(not(feature = "advice"))]
async fn drive_with_advice(
    session: Arc<Mutex<Session>>,
    _config: &advice_runner::config::AdviceConfig,
) -> LoopSummary {
    info!("Built without the advice client, using canned lines");
    drive(session, Some(&AdviceService::new(CannedAdvice::new()))).await
}

/// Run the loop until Ctrl+C or the tick limit
async fn drive<S: AdviceSource>(session: Arc<Mutex<Session>>, advice: Option<&AdviceService<S>>) -> LoopSummary {
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    game_loop::run(session, advice, shutdown).await
}
