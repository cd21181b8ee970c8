//! Job to refresh token data of one network.
//!
//! Mirrors the pool job: top list, bulk statistics for every registered
//! token, then per-token details (chart, price candles, pools, transactions).
//! Pools found on token pages are registered so the pool job tracks them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{info, warn};

use super::{ok_or_warn, refresh};
use crate::store::{FetchKey, Store};
use crate::subgraph::TransactionFilter;
use crate::worker::DexFetcher;

pub async fn run(fetcher: &DexFetcher, store: &Store) -> Result<()> {
    info!("Starting refresh_tokens job for {}...", fetcher.name());

    let start = std::time::Instant::now();
    let now = Utc::now();
    let dex = fetcher.dex();
    let list_ticket = store.begin_fetch(FetchKey::TopTokens(dex)).await;

    let top = fetcher
        .top_tokens(now)
        .await
        .with_context(|| format!("Failed to load top tokens for {}", fetcher.name()))?;

    let Some(dropped) = store.set_top_tokens_if_current(&list_ticket, &top).await else {
        info!("Discarded stale top token list for {}", fetcher.name());
        return Ok(());
    };
    if !dropped.is_empty() {
        info!("{} tokens left the top list on {}", dropped.len(), fetcher.name());
    }

    store.register_tokens(dex, &top).await;
    let tracked = store.token_addresses(dex).await;

    let data = fetcher.token_data(&tracked, now).await;
    if data.is_none() {
        warn!("Token statistics unavailable for {}", fetcher.name());
    }

    let mut updated = 0;
    match data {
        Some(tokens) => {
            for token in tokens {
                let address = token.address.clone();
                if store
                    .update_token_if_current(&list_ticket, &address, |entry| {
                        refresh(&mut entry.data, Some(token));
                        entry.last_updated = Some(now);
                    })
                    .await
                {
                    updated += 1;
                }
            }
        },
        None => {
            for address in &tracked {
                store
                    .update_token_if_current(&list_ticket, address, |entry| {
                        refresh(&mut entry.data, None)
                    })
                    .await;
            }
        },
    }

    let details: Vec<_> = top
        .iter()
        .map(|address| refresh_details(fetcher, store, address, now))
        .collect();
    let linked_pools: usize = join_all(details).await.into_iter().sum();

    info!(
        "Completed refresh_tokens job for {} in {:?} ({} top, {} tracked, {} updated, {} pools linked)",
        fetcher.name(),
        start.elapsed(),
        top.len(),
        tracked.len(),
        updated,
        linked_pools
    );
    Ok(())
}

/// Details of a single token. Returns how many new pools were registered.
async fn refresh_details(
    fetcher: &DexFetcher,
    store: &Store,
    address: &str,
    now: DateTime<Utc>,
) -> usize {
    let dex = fetcher.dex();
    let ticket = store.begin_fetch(FetchKey::token(dex, address)).await;

    let filter = TransactionFilter::Token(address.to_string());
    let (chart, price_data, pools, transactions) = tokio::join!(
        fetcher.token_chart(address, now),
        fetcher.token_price_data(address, now),
        fetcher.pools_for_token(address),
        fetcher.transactions(&filter),
    );

    if chart.is_none() {
        warn!("Chart unavailable for token {} on {}", address, fetcher.name());
    }
    let price_data = ok_or_warn(price_data, format!("price chart of token {}", address));
    let pools = ok_or_warn(pools, format!("pools of token {}", address));
    let transactions = ok_or_warn(transactions, format!("transactions of token {}", address));

    let registered = match &pools {
        Some(pools) => store.register_pools(dex, pools).await,
        None => 0,
    };

    store
        .update_token_if_current(&ticket, address, |entry| {
            refresh(&mut entry.chart, chart);
            refresh(&mut entry.price_data, price_data);
            refresh(&mut entry.pool_addresses, pools);
            refresh(&mut entry.transactions, transactions);
        })
        .await;

    registered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subgraph::mock::{blocks_client, mock_client};
    use crate::worker::fetcher::testing::{healthy_subgraph, mock_fetcher, DEX};

    #[tokio::test]
    async fn test_refresh_fills_top_token_and_links_pools() {
        let store = Store::new();
        let fetcher = mock_fetcher(mock_client(healthy_subgraph), blocks_client(Vec::new()));

        run(&fetcher, &store).await.unwrap();

        let entry = store.token(DEX, "0xccc").await.unwrap();
        let token = entry.data.data().unwrap();
        assert!(token.exists);
        assert_eq!(token.price_usd, 1.5);
        assert!(entry.chart.data().is_some());
        assert!(entry.price_data.data().is_some_and(|candles| !candles.is_empty()));
        assert_eq!(entry.pool_addresses.data().unwrap(), &vec!["0xaaa".to_string()]);
        assert_eq!(store.pool_addresses(DEX).await, vec!["0xaaa".to_string()]);
    }

    #[tokio::test]
    async fn test_every_tracked_token_keeps_existing() {
        let store = Store::new();
        let tracked: Vec<String> = (1..=150).map(|i| format!("0x{:040x}", i)).collect();
        store.register_tokens(DEX, &tracked).await;
        let fetcher = mock_fetcher(mock_client(healthy_subgraph), blocks_client(Vec::new()));

        run(&fetcher, &store).await.unwrap();

        assert_eq!(store.token_addresses(DEX).await.len(), 151);
        for address in &tracked {
            let entry = store.token(DEX, address).await.unwrap();
            assert!(entry.data.data().is_some_and(|t| t.exists), "{}", address);
        }
    }
}
