//! Cron scheduler for the periodic refresh jobs.
//!
//! Runs jobs like:
//! - Refreshing protocol overview, chart, transactions and native prices
//! - Refreshing top pools with their charts and transactions
//! - Refreshing top tokens with their charts, price candles and pools
//! - Exporting the store as JSON (when configured)
//!
//! Refresh jobs are registered once per network, so a failing network never
//! holds up the others.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::config::{ExportSettings, RefreshSettings};
use crate::store::Store;
use crate::worker::DexFetcher;

use super::jobs;

/// Cron scheduler that manages periodic background jobs.
pub struct CronScheduler {
    store: Arc<Store>,
    fetchers: Vec<DexFetcher>,
    refresh: Arc<RefreshSettings>,
    export: Option<ExportSettings>,
}

impl CronScheduler {
    pub fn new(
        store: Arc<Store>,
        fetchers: Vec<DexFetcher>,
        refresh: Arc<RefreshSettings>,
        export: Option<ExportSettings>,
    ) -> Self {
        Self {
            store,
            fetchers,
            refresh,
            export,
        }
    }

    /// Runs every refresh job once, then on schedule until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;
        let mut job_count = 0;

        for fetcher in &self.fetchers {
            self.register_refresh_protocol_job(&scheduler, fetcher).await?;
            self.register_refresh_pools_job(&scheduler, fetcher).await?;
            self.register_refresh_tokens_job(&scheduler, fetcher).await?;
            job_count += 3;
        }

        if let Some(export) = &self.export {
            self.register_export_job(&scheduler, export).await?;
            job_count += 1;
        }

        self.spawn_initial_refresh();

        // Start the scheduler
        scheduler.start().await?;
        info!("Cron scheduler started with {} jobs", job_count);

        // Wait for cancellation
        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        self.store.retire_all().await;
        scheduler.shutdown().await?;
        Ok(())
    }

    /// Fill the store right away instead of waiting for the first tick.
    fn spawn_initial_refresh(&self) {
        for fetcher in &self.fetchers {
            let fetcher = fetcher.clone();
            let store = self.store.clone();
            tokio::spawn(async move {
                let (protocol, pools, tokens) = tokio::join!(
                    jobs::refresh_protocol::run(&fetcher, &store),
                    jobs::refresh_pools::run(&fetcher, &store),
                    jobs::refresh_tokens::run(&fetcher, &store),
                );

                let results = [("protocol", protocol), ("pools", pools), ("tokens", tokens)];
                for (job, result) in results {
                    if let Err(e) = result {
                        error!("Initial {} refresh failed for {}: {:#}", job, fetcher.name(), e);
                    }
                }
            });
        }
    }

    async fn register_refresh_protocol_job(
        &self,
        scheduler: &JobScheduler,
        fetcher: &DexFetcher,
    ) -> Result<()> {
        self.register_fetcher_job(
            scheduler,
            fetcher,
            self.refresh.protocol_interval_secs,
            "refresh_protocol",
            |fetcher, store| async move { jobs::refresh_protocol::run(&fetcher, &store).await },
        )
        .await
    }

    async fn register_refresh_pools_job(
        &self,
        scheduler: &JobScheduler,
        fetcher: &DexFetcher,
    ) -> Result<()> {
        self.register_fetcher_job(
            scheduler,
            fetcher,
            self.refresh.pools_interval_secs,
            "refresh_pools",
            |fetcher, store| async move { jobs::refresh_pools::run(&fetcher, &store).await },
        )
        .await
    }

    async fn register_refresh_tokens_job(
        &self,
        scheduler: &JobScheduler,
        fetcher: &DexFetcher,
    ) -> Result<()> {
        self.register_fetcher_job(
            scheduler,
            fetcher,
            self.refresh.tokens_interval_secs,
            "refresh_tokens",
            |fetcher, store| async move { jobs::refresh_tokens::run(&fetcher, &store).await },
        )
        .await
    }

    async fn register_fetcher_job<F, Fut>(
        &self,
        scheduler: &JobScheduler,
        fetcher: &DexFetcher,
        interval: u64,
        name: &'static str,
        task: F,
    ) -> Result<()>
    where
        F: Fn(DexFetcher, Arc<Store>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let store = self.store.clone();
        let job_fetcher = fetcher.clone();
        let task = Arc::new(task);

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let store = store.clone();
            let fetcher = job_fetcher.clone();
            let task = task.clone();
            Box::pin(async move {
                let label = fetcher.name().to_string();
                if let Err(e) = (*task)(fetcher, store).await {
                    error!("Failed to run {} for {}: {:#}", name, label, e);
                }
            })
        })?;

        scheduler.add(job).await?;
        info!(
            "Registered {} job for {} (every {}s)",
            name,
            fetcher.name(),
            interval
        );
        Ok(())
    }

    async fn register_export_job(
        &self,
        scheduler: &JobScheduler,
        export: &ExportSettings,
    ) -> Result<()> {
        let store = self.store.clone();
        let settings = export.clone();
        let interval = export.interval_secs;

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let store = store.clone();
            let settings = settings.clone();
            Box::pin(async move {
                if let Err(e) = jobs::export_snapshot::run(&store, &settings).await {
                    error!("Failed to export store snapshot: {:#}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        info!("Registered export_snapshot job (every {}s)", interval);
        Ok(())
    }
}
