use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};
use jemallocator::Jemalloc;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use dexscope::{CronScheduler, DexClients, DexFetcher, Settings, Store};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Arc::new(
        Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    );

    let level = LevelFilter::from_str(&settings.logging.level).unwrap_or(LevelFilter::Info);
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("Failed to initialize logger")?;

    let fetchers = connect_dexes(&settings).await?;

    run_service(settings, fetchers).await
}

/// Build and health check the subgraph clients of every enabled DEX.
///
/// A DEX whose subgraphs cannot be reached is skipped; the others still run.
async fn connect_dexes(settings: &Settings) -> anyhow::Result<Vec<DexFetcher>> {
    let refresh = Arc::new(settings.refresh.clone());
    let mut fetchers = Vec::new();

    for dex in settings.enabled_dexes() {
        let clients = match DexClients::new(dex, &settings.http) {
            Ok(clients) => clients,
            Err(e) => {
                error!("Disabling {}: {:#}", dex.name, e);
                continue;
            },
        };

        if let Err(e) = clients.connect().await {
            error!("Disabling {}: {:#}", dex.name, e);
            continue;
        }

        info!("{} ({} on {}) ready", dex.name, dex.dex.display_name(), dex.chain);
        fetchers.push(DexFetcher::new(Arc::new(dex.clone()), refresh.clone(), clients));
    }

    if fetchers.is_empty() {
        bail!("No DEX deployment could be reached, check the subgraph URLs in config.yaml");
    }

    let skipped = settings.dexes.len() - fetchers.len();
    if skipped > 0 {
        warn!(
            "{} of {} configured DEX deployments are not running",
            skipped,
            settings.dexes.len()
        );
    }

    Ok(fetchers)
}

async fn run_service(settings: Arc<Settings>, fetchers: Vec<DexFetcher>) -> anyhow::Result<()> {
    let cancellation_token = CancellationToken::new();
    let store = Arc::new(Store::new());

    let cron_scheduler = CronScheduler::new(
        store.clone(),
        fetchers,
        Arc::new(settings.refresh.clone()),
        settings.export.clone(),
    );

    let cron_token = cancellation_token.child_token();
    let cron_handle = tokio::spawn(async move {
        if let Err(e) = cron_scheduler.run(cron_token).await {
            error!("Cron scheduler failed: {:#}", e);
        }
    });

    info!("Cron scheduler started - store will refresh periodically");

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    // Set up graceful shutdown signal handler
    info!("dexscope running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    info!("Finishing all tasks...");
    cancellation_token.cancel();

    // Wait for cron scheduler to stop
    info!("Waiting for cron scheduler to stop...");
    if let Err(e) = cron_handle.await {
        error!("Cron scheduler task failed: {}", e);
    }

    // In-flight fetches started before cancellation can no longer commit
    store.retire_all().await;

    info!("All jobs stopped");
    Ok(())
}
