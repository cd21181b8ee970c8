//! Job to refresh the protocol-wide data of one network.
//!
//! Overview totals, the daily volume/liquidity chart, the latest
//! transactions and native prices are fetched concurrently and committed in
//! one write.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};

use super::{ok_or_warn, refresh};
use crate::store::{FetchKey, Store};
use crate::subgraph::TransactionFilter;
use crate::worker::DexFetcher;

pub async fn run(fetcher: &DexFetcher, store: &Store) -> Result<()> {
    info!("Starting refresh_protocol job for {}...", fetcher.name());

    let start = std::time::Instant::now();
    let now = Utc::now();
    let ticket = store.begin_fetch(FetchKey::Protocol(fetcher.dex())).await;

    let filter = TransactionFilter::All;
    let (data, chart, transactions, native_prices) = tokio::join!(
        fetcher.protocol_data(now),
        fetcher.protocol_chart(now),
        fetcher.transactions(&filter),
        fetcher.native_prices(now),
    );

    let transactions = ok_or_warn(transactions, "protocol transactions");
    let native_prices = ok_or_warn(native_prices, "native prices");

    if data.is_none() {
        warn!("Protocol overview unavailable for {}", fetcher.name());
    }
    if chart.is_none() {
        warn!("Protocol chart unavailable for {}", fetcher.name());
    }

    let chart_days = chart.as_ref().map(|c| c.len()).unwrap_or_default();
    let transaction_count = transactions.as_ref().map(|t| t.len()).unwrap_or_default();

    let committed = store
        .update_protocol_if_current(&ticket, |entry| {
            refresh(&mut entry.data, data);
            refresh(&mut entry.chart, chart);
            refresh(&mut entry.transactions, transactions);
            refresh(&mut entry.native_prices, native_prices);
            entry.last_updated = Some(now);
        })
        .await;

    if !committed {
        info!("Discarded stale protocol refresh for {}", fetcher.name());
        return Ok(());
    }

    info!(
        "Completed refresh_protocol job for {} in {:?} ({} chart days, {} transactions)",
        fetcher.name(),
        start.elapsed(),
        chart_days,
        transaction_count
    );
    Ok(())
}
