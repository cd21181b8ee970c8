//! Job to refresh pool data of one network.
//!
//! - Reloads the top pool list, retiring pools that dropped out of it
//! - Rebuilds pool statistics for every registered pool in one bulk pass
//! - Refreshes chart and transactions of each top pool

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{info, warn};
use rustc_hash::FxHashSet;

use super::{ok_or_warn, refresh};
use crate::store::{FetchKey, Store};
use crate::subgraph::TransactionFilter;
use crate::worker::DexFetcher;

pub async fn run(fetcher: &DexFetcher, store: &Store) -> Result<()> {
    info!("Starting refresh_pools job for {}...", fetcher.name());

    let start = std::time::Instant::now();
    let now = Utc::now();
    let dex = fetcher.dex();
    let list_ticket = store.begin_fetch(FetchKey::TopPools(dex)).await;

    let top = fetcher
        .top_pools()
        .await
        .with_context(|| format!("Failed to load top pools for {}", fetcher.name()))?;

    let Some(dropped) = store.set_top_pools_if_current(&list_ticket, &top).await else {
        info!("Discarded stale top pool list for {}", fetcher.name());
        return Ok(());
    };
    if !dropped.is_empty() {
        info!("{} pools left the top list on {}", dropped.len(), fetcher.name());
    }

    store.register_pools(dex, &top).await;
    let tracked = store.pool_addresses(dex).await;

    let data = fetcher.pool_data(&tracked, now).await;
    if data.is_none() {
        warn!("Pool statistics unavailable for {}", fetcher.name());
    }

    let mut updated = 0;
    let mut unlisted: FxHashSet<&str> = tracked.iter().map(String::as_str).collect();
    for pool in data.unwrap_or_default() {
        let address = pool.address.clone();
        unlisted.remove(address.as_str());
        if store
            .update_pool_if_current(&list_ticket, &address, |entry| {
                refresh(&mut entry.data, Some(pool));
                entry.last_updated = Some(now);
            })
            .await
        {
            updated += 1;
        }
    }

    // Tracked pools without a current snapshot
    for address in &unlisted {
        store
            .update_pool_if_current(&list_ticket, address, |entry| refresh(&mut entry.data, None))
            .await;
    }

    let details: Vec<_> = top
        .iter()
        .map(|address| refresh_details(fetcher, store, address, now))
        .collect();
    join_all(details).await;

    info!(
        "Completed refresh_pools job for {} in {:?} ({} top, {} tracked, {} updated, {} failed)",
        fetcher.name(),
        start.elapsed(),
        top.len(),
        tracked.len(),
        updated,
        unlisted.len()
    );
    Ok(())
}

/// Chart and transactions of a single pool.
async fn refresh_details(fetcher: &DexFetcher, store: &Store, address: &str, now: DateTime<Utc>) {
    let ticket = store.begin_fetch(FetchKey::pool(fetcher.dex(), address)).await;

    let filter = TransactionFilter::Pair(address.to_string());
    let (chart, transactions) = tokio::join!(
        fetcher.pool_chart(address, now),
        fetcher.transactions(&filter),
    );

    if chart.is_none() {
        warn!("Chart unavailable for pool {} on {}", address, fetcher.name());
    }
    let transactions = ok_or_warn(transactions, format!("transactions of pool {}", address));

    store
        .update_pool_if_current(&ticket, address, |entry| {
            refresh(&mut entry.chart, chart);
            refresh(&mut entry.transactions, transactions);
        })
        .await;
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use serde_json::json;

    use super::*;
    use crate::subgraph::mock::{blocks_client, data, mock_client};
    use crate::worker::fetcher::testing::{healthy_subgraph, mock_fetcher, pool_row, DEX};

    #[tokio::test]
    async fn test_refresh_fills_top_pools() {
        let store = Store::new();
        let fetcher = mock_fetcher(mock_client(healthy_subgraph), blocks_client(Vec::new()));

        run(&fetcher, &store).await.unwrap();

        let top = store.protocol(DEX).await.unwrap().top_pools;
        assert_eq!(top.data().unwrap(), &vec!["0xaaa".to_string(), "0xbbb".to_string()]);
        for address in ["0xaaa", "0xbbb"] {
            let entry = store.pool(DEX, address).await.unwrap();
            assert_eq!(entry.data.data().map(|p| p.liquidity_usd), Some(400.0));
            assert!(entry.chart.data().is_some());
            assert!(entry.transactions.data().is_some());
        }
    }

    #[tokio::test]
    async fn test_pool_missing_from_snapshot_is_marked_failed() {
        let store = Store::new();
        let subgraph = mock_client(|query, variables| {
            if query.contains("query pairs {") {
                return data(json!({ "pairs": [pool_row("0xaaa")] }));
            }
            healthy_subgraph(query, variables)
        });
        let fetcher = mock_fetcher(subgraph, blocks_client(Vec::new()));

        run(&fetcher, &store).await.unwrap();

        assert!(store.pool(DEX, "0xaaa").await.unwrap().data.data().is_some());
        let missing = store.pool(DEX, "0xbbb").await.unwrap();
        assert!(missing.data.is_error());
        assert!(missing.chart.data().is_some());
    }

    #[tokio::test]
    async fn test_failed_statistics_mark_every_tracked_pool() {
        let store = Store::new();
        store.register_pools(DEX, &["0xold"]).await;
        let subgraph = mock_client(|query, variables| {
            if query.contains("query pairs {") {
                bail!("timeout");
            }
            healthy_subgraph(query, variables)
        });
        let fetcher = mock_fetcher(subgraph, blocks_client(Vec::new()));

        run(&fetcher, &store).await.unwrap();

        for address in ["0xaaa", "0xbbb", "0xold"] {
            assert!(store.pool(DEX, address).await.unwrap().data.is_error(), "{}", address);
        }
    }

    #[tokio::test]
    async fn test_top_list_failure_is_an_error() {
        let store = Store::new();
        let subgraph = mock_client(|query, variables| {
            if query.contains("query topPools") {
                bail!("subgraph down");
            }
            healthy_subgraph(query, variables)
        });
        let fetcher = mock_fetcher(subgraph, blocks_client(Vec::new()));

        assert!(run(&fetcher, &store).await.is_err());
        assert!(store.pool_addresses(DEX).await.is_empty());
    }
}
