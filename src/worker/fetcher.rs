use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, warn};
use rustc_hash::FxHashSet;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use super::assembler::{
    assemble_pools, assemble_protocol, assemble_tokens, candles_from_prices, SnapshotSet,
};
use super::normalizer::normalize_day_buckets;
use super::paginator::fetch_all_pages;
use crate::config::{DexSettings, RefreshSettings};
use crate::models::{
    merge_transactions, BurnRow, DayBucket, DayDataRow, MintRow, NativePrices, PoolData,
    PoolSnapshot, PriceCandle, ProtocolData, ProtocolSnapshot, SupportedDex, SwapRow, TokenData,
    TokenSnapshot, Transaction,
};
use crate::subgraph::{queries, DexClients, TransactionFilter, BULK_CHUNK_SIZE, PAGE_SIZE};
use crate::utils::{
    de_decimal, delta_timestamps, entity_id_prefix, normalize_address, sample_timestamps,
    ONE_DAY_SECS,
};

// ============================================
// Response shapes
// ============================================

#[derive(Debug, Deserialize)]
struct EntityId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FactoriesResponse {
    factories: Vec<ProtocolSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayDatasResponse {
    day_datas: Vec<DayDataRow>,
}

#[derive(Debug, Deserialize)]
struct PairIdsResponse {
    pairs: Vec<EntityId>,
}

#[derive(Debug, Deserialize)]
struct PairsResponse {
    pairs: Vec<PoolSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenDayDataIdsResponse {
    token_day_datas: Vec<EntityId>,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    tokens: Vec<TokenSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolsForTokenResponse {
    as_token0: Vec<EntityId>,
    as_token1: Vec<EntityId>,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(rename = "bnbPrice", deserialize_with = "de_decimal", default)]
    bnb_price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NativePricesResponse {
    current: Vec<Bundle>,
    one_day: Vec<Bundle>,
    two_day: Vec<Bundle>,
    one_week: Vec<Bundle>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "derivedUSD", deserialize_with = "de_decimal", default)]
    derived_usd: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TransactionsResponse {
    mints: Vec<MintRow>,
    swaps: Vec<SwapRow>,
    burns: Vec<BurnRow>,
    mints_as0: Vec<MintRow>,
    mints_as1: Vec<MintRow>,
    swaps_as0: Vec<SwapRow>,
    swaps_as1: Vec<SwapRow>,
    burns_as0: Vec<BurnRow>,
    burns_as1: Vec<BurnRow>,
}

impl TransactionsResponse {
    fn into_transactions(self) -> Vec<Transaction> {
        let mints = [self.mints, self.mints_as0, self.mints_as1].concat();
        let burns = [self.burns, self.burns_as0, self.burns_as1].concat();
        let swaps = [self.swaps, self.swaps_as0, self.swaps_as1].concat();
        merge_transactions(mints, burns, swaps)
    }
}

fn first_price(bundles: &[Bundle]) -> f64 {
    bundles.first().map(|b| b.bnb_price).unwrap_or_default()
}

/// Store key of an entity id: the normalized address when it parses as one.
fn address_key(id: &str) -> String {
    normalize_address(id).unwrap_or_else(|| id.to_lowercase())
}

/// Address keys in first-seen order, without duplicates or hidden ones.
fn distinct_ids<I>(ids: I, hidden: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let hidden: FxHashSet<String> = hidden.iter().map(|a| address_key(a)).collect();
    let mut seen = FxHashSet::default();

    ids.into_iter()
        .map(|id| address_key(&id))
        .filter(|id| !hidden.contains(id) && seen.insert(id.clone()))
        .collect()
}

/// `(timestamp, price)` pairs from `t<timestamp>` aliases, oldest first.
fn parse_price_aliases(response: HashMap<String, Option<PriceRow>>) -> Vec<(i64, f64)> {
    let mut prices: Vec<(i64, f64)> = response
        .into_iter()
        .filter_map(|(alias, row)| {
            let ts = alias.strip_prefix('t')?.parse::<i64>().ok()?;
            Some((ts, row.map(|r| r.derived_usd).unwrap_or_default()))
        })
        .collect();
    prices.sort_by_key(|(ts, _)| *ts);
    prices
}

/// Everything read from the subgraphs of one DEX deployment.
///
/// Methods returning `Option` have already folded query failures into
/// `None` (and logged them); methods returning `Result` leave that to the
/// caller.
#[derive(Clone)]
pub struct DexFetcher {
    settings: Arc<DexSettings>,
    refresh: Arc<RefreshSettings>,
    clients: DexClients,
}

impl DexFetcher {
    pub fn new(
        settings: Arc<DexSettings>,
        refresh: Arc<RefreshSettings>,
        clients: DexClients,
    ) -> Self {
        Self {
            settings,
            refresh,
            clients,
        }
    }

    pub fn dex(&self) -> SupportedDex {
        self.settings.dex
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn clients(&self) -> &DexClients {
        &self.clients
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        self.clients.data.query(query, variables).await
    }

    /// Blocks at `timestamps`, or `None` if any of them is unknown.
    async fn blocks_at<const N: usize>(&self, timestamps: [i64; N]) -> Result<Option<[u64; N]>> {
        let blocks = self.clients.blocks.blocks_for(&timestamps).await?;

        let found: Option<Vec<u64>> = blocks.iter().copied().collect();
        match found.and_then(|found| found.try_into().ok()) {
            Some(found) => Ok(Some(found)),
            None => {
                warn!(
                    "Missing historical blocks on {} for {:?}: {:?}",
                    self.name(),
                    timestamps,
                    blocks
                );
                Ok(None)
            },
        }
    }

    /// Blocks 24h, 48h, 7d and 14d before `now`, failures logged.
    async fn snapshot_blocks(&self, now: DateTime<Utc>) -> Option<[u64; 4]> {
        match self.blocks_at(delta_timestamps(now).as_array()).await {
            Ok(blocks) => blocks,
            Err(e) => {
                warn!("Failed to resolve blocks on {}: {:#}", self.name(), e);
                None
            },
        }
    }

    /// Run the bulk query of every period concurrently.
    async fn snapshot_set<R, T, Q>(
        &self,
        what: &str,
        addresses: &[String],
        build_query: Q,
        blocks: [u64; 4],
        extract: fn(R) -> Vec<T>,
    ) -> SnapshotSet<Vec<T>>
    where
        R: DeserializeOwned,
        Q: Fn(Option<u64>, &[String]) -> String + Sync,
    {
        let periods: Vec<Option<u64>> = std::iter::once(None)
            .chain(blocks.iter().copied().map(Some))
            .collect();

        let requests: Vec<_> = periods
            .iter()
            .map(|block| self.bulk_snapshot(what, addresses, &build_query, *block, extract))
            .collect();
        let mut periods = join_all(requests).await.into_iter();

        SnapshotSet {
            current: periods.next().flatten(),
            one_day: periods.next().flatten(),
            two_days: periods.next().flatten(),
            one_week: periods.next().flatten(),
            two_weeks: periods.next().flatten(),
        }
    }

    /// Snapshots of `addresses` at one block, queried in chunks.
    ///
    /// A single failed chunk fails the whole period.
    async fn bulk_snapshot<R, T, Q>(
        &self,
        what: &str,
        addresses: &[String],
        build_query: &Q,
        block: Option<u64>,
        extract: fn(R) -> Vec<T>,
    ) -> Option<Vec<T>>
    where
        R: DeserializeOwned,
        Q: Fn(Option<u64>, &[String]) -> String + Sync,
    {
        let mut rows = Vec::with_capacity(addresses.len());

        for chunk in addresses.chunks(BULK_CHUNK_SIZE) {
            match self.query::<R>(&build_query(block, chunk), Value::Null).await {
                Ok(response) => rows.extend(extract(response)),
                Err(e) => {
                    warn!(
                        "Failed to fetch {} snapshot at block {:?} on {}: {:#}",
                        what,
                        block,
                        self.name(),
                        e
                    );
                    return None;
                },
            }
        }

        Some(rows)
    }

    /// Paged day datas, gap-filled up to yesterday.
    async fn day_buckets(
        &self,
        query: &str,
        address: Option<&str>,
        start_timestamp: i64,
        now: DateTime<Utc>,
    ) -> Option<Vec<DayBucket>> {
        let result = fetch_all_pages(PAGE_SIZE, |skip| {
            let mut variables = json!({ "startTime": start_timestamp, "skip": skip });
            if let Some(address) = address {
                variables["address"] = json!(address);
            }

            async move {
                let response: DayDatasResponse = self.query(query, variables).await?;
                Ok(response.day_datas)
            }
        })
        .await;

        let rows = result.into_data()?;
        debug!("Fetched {} day datas on {}", rows.len(), self.name());

        Some(normalize_day_buckets(
            rows.into_iter().map(DayBucket::from),
            start_timestamp,
            now.timestamp(),
        ))
    }

    // ============================================
    // Protocol
    // ============================================

    async fn protocol_snapshot(&self, block: Option<u64>) -> Result<Option<ProtocolSnapshot>> {
        let response: FactoriesResponse = self
            .query(&queries::protocol_overview(self.dex(), block), Value::Null)
            .await
            .with_context(|| format!("Failed to fetch protocol totals at block {:?}", block))?;

        Ok(response.factories.into_iter().next())
    }

    /// Protocol overview from the current, 24h and 48h totals.
    pub async fn protocol_data(&self, now: DateTime<Utc>) -> Option<ProtocolData> {
        let deltas = delta_timestamps(now);
        let [one_day, two_days] = match self.blocks_at([deltas.one_day, deltas.two_days]).await {
            Ok(Some(blocks)) => blocks,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to resolve blocks on {}: {:#}", self.name(), e);
                return None;
            },
        };

        let blocks = [None, Some(one_day), Some(two_days)];
        let results = join_all(blocks.map(|b| self.protocol_snapshot(b))).await;

        let mut snapshots = Vec::with_capacity(3);
        for result in results {
            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    warn!("Failed to fetch protocol data on {}: {:#}", self.name(), e);
                    return None;
                },
            }
        }

        assemble_protocol(
            snapshots[0].as_ref(),
            snapshots[1].as_ref(),
            snapshots[2].as_ref(),
        )
    }

    pub async fn protocol_chart(&self, now: DateTime<Utc>) -> Option<Vec<DayBucket>> {
        self.day_buckets(
            &queries::protocol_chart(self.dex()),
            None,
            self.settings.protocol_start_timestamp,
            now,
        )
        .await
    }

    /// BNB price now and 24h, 48h and 7d ago.
    pub async fn native_prices(&self, now: DateTime<Utc>) -> Result<NativePrices> {
        let deltas = delta_timestamps(now);
        let [one_day, two_days, one_week] = self
            .blocks_at([deltas.one_day, deltas.two_days, deltas.one_week])
            .await?
            .context("Historical blocks unavailable")?;

        let response: NativePricesResponse = self
            .query(
                queries::NATIVE_PRICES,
                json!({ "block24": one_day, "block48": two_days, "blockWeek": one_week }),
            )
            .await
            .context("Failed to fetch native prices")?;

        Ok(NativePrices {
            current: first_price(&response.current),
            one_day: first_price(&response.one_day),
            two_day: first_price(&response.two_day),
            week: first_price(&response.one_week),
        })
    }

    pub async fn transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let response: TransactionsResponse = self
            .query(&queries::transactions(filter), Value::Null)
            .await
            .with_context(|| format!("Failed to fetch transactions for {:?}", filter))?;

        Ok(response.into_transactions())
    }

    // ============================================
    // Pools
    // ============================================

    /// Top pool addresses, hidden pools removed.
    pub async fn top_pools(&self) -> Result<Vec<String>> {
        let response: PairIdsResponse = self
            .query(&queries::top_pools(), Value::Null)
            .await
            .context("Failed to fetch top pools")?;

        Ok(distinct_ids(
            response.pairs.into_iter().map(|p| p.id),
            &self.settings.hidden_pools,
        ))
    }

    pub async fn pool_data(
        &self,
        addresses: &[String],
        now: DateTime<Utc>,
    ) -> Option<Vec<PoolData>> {
        let blocks = self.snapshot_blocks(now).await?;

        let snapshots = self
            .snapshot_set(
                "pool",
                addresses,
                queries::pools_bulk,
                blocks,
                |r: PairsResponse| r.pairs,
            )
            .await;

        assemble_pools(self.dex(), addresses, &snapshots)
    }

    pub async fn pool_chart(&self, address: &str, now: DateTime<Utc>) -> Option<Vec<DayBucket>> {
        self.day_buckets(
            &queries::pool_chart(),
            Some(address),
            self.settings.chart_start_timestamp,
            now,
        )
        .await
    }

    // ============================================
    // Tokens
    // ============================================

    /// Addresses of the tokens with the most volume over the last day.
    pub async fn top_tokens(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let since = delta_timestamps(now).one_day;
        let response: TokenDayDataIdsResponse = self
            .query(&queries::top_tokens(self.dex(), since), Value::Null)
            .await
            .context("Failed to fetch top tokens")?;

        Ok(distinct_ids(
            response
                .token_day_datas
                .into_iter()
                .map(|t| entity_id_prefix(&t.id).to_string()),
            &[],
        ))
    }

    pub async fn token_data(
        &self,
        addresses: &[String],
        now: DateTime<Utc>,
    ) -> Option<Vec<TokenData>> {
        let blocks = self.snapshot_blocks(now).await?;

        let snapshots = self
            .snapshot_set(
                "token",
                addresses,
                queries::tokens_bulk,
                blocks,
                |r: TokensResponse| r.tokens,
            )
            .await;

        assemble_tokens(self.dex(), addresses, &snapshots)
    }

    pub async fn token_chart(&self, address: &str, now: DateTime<Utc>) -> Option<Vec<DayBucket>> {
        self.day_buckets(
            &queries::token_chart(),
            Some(address),
            self.settings.chart_start_timestamp,
            now,
        )
        .await
    }

    /// Most liquid pools containing `address` on either side.
    pub async fn pools_for_token(&self, address: &str) -> Result<Vec<String>> {
        let response: PoolsForTokenResponse = self
            .query(queries::POOLS_FOR_TOKEN, json!({ "address": address }))
            .await
            .with_context(|| format!("Failed to fetch pools for token {}", address))?;

        Ok(response
            .as_token0
            .into_iter()
            .chain(response.as_token1)
            .map(|p| address_key(&p.id))
            .collect())
    }

    /// Price candles over the configured look-back window.
    pub async fn token_price_data(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriceCandle>> {
        let end = now.timestamp();
        let start = end - self.refresh.price_chart_lookback_days * ONE_DAY_SECS;
        let timestamps = sample_timestamps(start, end, self.refresh.price_chart_interval_secs);
        if timestamps.is_empty() {
            return Ok(Vec::new());
        }

        let blocks = self.clients.blocks.blocks_for(&timestamps).await?;
        let pinned: Vec<(i64, u64)> = timestamps
            .iter()
            .zip(blocks)
            .filter_map(|(ts, block)| block.map(|b| (*ts, b)))
            .collect();

        if pinned.is_empty() {
            warn!("No blocks found for price chart of {} on {}", address, self.name());
            return Ok(Vec::new());
        }

        let response: HashMap<String, Option<PriceRow>> = self
            .query(&queries::prices_by_block(address, &pinned), Value::Null)
            .await
            .with_context(|| format!("Failed to fetch prices for token {}", address))?;

        Ok(candles_from_prices(&parse_price_aliases(response)))
    }
}


#[cfg(test)]
mod tests {
    use anyhow::bail;
    use chrono::TimeZone;

    use super::testing::{healthy_subgraph, mock_fetcher};
    use super::*;
    use crate::subgraph::mock::{blocks_client, data, mock_client, quoted_addresses};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_distinct_ids_filters_hidden_and_duplicates() {
        let ids: Vec<String> = ["0xA", "0xb", "0xa", "0xC"].iter().map(|s| s.to_string()).collect();
        let hidden = vec!["0xc".to_string()];
        assert_eq!(distinct_ids(ids, &hidden), vec!["0xa", "0xb"]);
    }

    #[test]
    fn test_address_keys_are_lowercase() {
        let checksummed = "0xBB4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c".to_string();
        let hidden = vec!["0xe9e7cea3dedca5984780bafc599bd69add087d56".to_string()];
        let ids = vec![
            checksummed,
            "0xE9E7CEA3DEDCA5984780BAFC599BD69ADD087D56".to_string(),
        ];
        assert_eq!(
            distinct_ids(ids, &hidden),
            vec!["0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"]
        );
    }

    #[test]
    fn test_parse_price_aliases_sorted_with_missing_as_zero() {
        let response: HashMap<String, Option<PriceRow>> = serde_json::from_str(
            r#"{
                "t7200": {"derivedUSD": "1.5"},
                "t0": {"derivedUSD": "1"},
                "t3600": null
            }"#,
        )
        .unwrap();

        assert_eq!(parse_price_aliases(response), vec![(0, 1.0), (3600, 0.0), (7200, 1.5)]);
    }

    #[test]
    fn test_token_transactions_merge_both_sides() {
        let pair = serde_json::json!({
            "token0": { "id": "0xaaa", "symbol": "AAA" },
            "token1": { "id": "0xbbb", "symbol": "BBB" }
        });
        let response: TransactionsResponse = serde_json::from_value(serde_json::json!({
            "mintsAs0": [{ "id": "0x1-0", "timestamp": "10", "pair": pair, "to": "0xa",
                "amount0": "1", "amount1": "1", "amountUSD": "2" }],
            "swapsAs1": [{ "id": "0x2-0", "timestamp": "30", "pair": pair, "from": "0xb",
                "amount0In": "1", "amount1In": "0", "amount0Out": "0", "amount1Out": "2",
                "amountUSD": "2" }],
            "burnsAs0": [],
            "burnsAs1": [{ "id": "0x3-0", "timestamp": "20", "pair": pair, "sender": "0xc",
                "amount0": "1", "amount1": "1", "amountUSD": "2" }]
        }))
        .unwrap();

        let hashes: Vec<String> = response
            .into_transactions()
            .into_iter()
            .map(|t| t.hash)
            .collect();
        assert_eq!(hashes, vec!["0x2", "0x3", "0x1"]);
    }

    #[test]
    fn test_native_prices_response_shape() {
        let response: NativePricesResponse = serde_json::from_str(
            r#"{
                "current": [{"bnbPrice": "310.5"}],
                "oneDay": [{"bnbPrice": "300"}],
                "twoDay": [],
                "oneWeek": [{"bnbPrice": "290"}]
            }"#,
        )
        .unwrap();

        assert_eq!(first_price(&response.current), 310.5);
        assert_eq!(first_price(&response.two_day), 0.0);
        assert_eq!(first_price(&response.one_week), 290.0);
    }

    #[tokio::test]
    async fn test_protocol_data_from_recent_blocks() {
        let fetcher = mock_fetcher(mock_client(healthy_subgraph), blocks_client(Vec::new()));
        let protocol = fetcher.protocol_data(now()).await.unwrap();
        assert_eq!(protocol.liquidity_usd, 2500.0);
        assert_eq!(protocol.volume_usd, 0.0);
    }

    #[tokio::test]
    async fn test_protocol_data_ignores_older_blocks() {
        let deltas = delta_timestamps(now());
        let missing = vec![deltas.two_weeks];
        let fetcher = mock_fetcher(mock_client(healthy_subgraph), blocks_client(missing));

        assert!(fetcher.protocol_data(now()).await.is_some());
        assert!(fetcher.native_prices(now()).await.is_ok());
        // Pools compare against the 14d snapshot
        let pools = vec!["0xaaa".to_string()];
        assert!(fetcher.pool_data(&pools, now()).await.is_none());
    }

    #[tokio::test]
    async fn test_protocol_data_none_without_blocks() {
        let blocks = mock_client(|_, _| bail!("blocks subgraph down"));
        let fetcher = mock_fetcher(mock_client(healthy_subgraph), blocks);
        assert!(fetcher.protocol_data(now()).await.is_none());
        assert!(fetcher.native_prices(now()).await.is_err());

        let deltas = delta_timestamps(now());
        let fetcher = mock_fetcher(
            mock_client(healthy_subgraph),
            blocks_client(vec![deltas.two_days]),
        );
        assert!(fetcher.protocol_data(now()).await.is_none());
    }

    #[tokio::test]
    async fn test_protocol_data_none_when_a_period_fails() {
        let pinned = format!("number: {}", delta_timestamps(now()).two_days);
        let subgraph = mock_client(move |query, variables| {
            if query.contains(&pinned) {
                bail!("indexing error");
            }
            healthy_subgraph(query, variables)
        });

        let fetcher = mock_fetcher(subgraph, blocks_client(Vec::new()));
        assert!(fetcher.protocol_data(now()).await.is_none());
    }

    #[tokio::test]
    async fn test_pool_data_none_when_a_period_fails() {
        let pinned = format!("number: {}", delta_timestamps(now()).one_week);
        let subgraph = mock_client(move |query, variables| {
            if query.contains("query pairs {") && query.contains(&pinned) {
                bail!("timeout");
            }
            healthy_subgraph(query, variables)
        });

        let fetcher = mock_fetcher(subgraph, blocks_client(Vec::new()));
        let pools = vec!["0xaaa".to_string(), "0xbbb".to_string()];
        assert!(fetcher.pool_data(&pools, now()).await.is_none());
    }

    #[tokio::test]
    async fn test_token_data_covers_more_than_one_page() {
        let subgraph = mock_client(|query, variables| {
            if query.contains("query tokens {") {
                let ids = quoted_addresses(query);
                assert!(ids.len() <= BULK_CHUNK_SIZE);
                assert!(query.contains(&format!("first: {}", ids.len())));
            }
            healthy_subgraph(query, variables)
        });
        let fetcher = mock_fetcher(subgraph, blocks_client(Vec::new()));

        let addresses: Vec<String> = (1..=150).map(|i| format!("0x{:040x}", i)).collect();
        let tokens = fetcher.token_data(&addresses, now()).await.unwrap();

        assert_eq!(tokens.len(), 150);
        assert!(tokens.iter().all(|t| t.exists));
        assert!(tokens.iter().all(|t| t.price_usd == 1.5));
    }

    #[tokio::test]
    async fn test_chart_page_error_means_no_chart() {
        let subgraph = mock_client(|query, variables| {
            if query.contains("dayDatas") && variables["skip"].as_u64() == Some(1000) {
                bail!("page 2 failed");
            }
            if query.contains("dayDatas") {
                let rows: Vec<Value> = (0..1000)
                    .map(|i| json!({ "date": 1_619_136_000 + i * ONE_DAY_SECS, "dailyVolumeUSD": "1" }))
                    .collect();
                return data(json!({ "dayDatas": rows }));
            }
            healthy_subgraph(query, variables)
        });

        let fetcher = mock_fetcher(subgraph, blocks_client(Vec::new()));
        assert!(fetcher.protocol_chart(now()).await.is_none());
        assert!(fetcher.pool_chart("0xaaa", now()).await.is_none());
    }

    #[tokio::test]
    async fn test_chart_is_gap_filled_up_to_yesterday() {
        let fetcher = mock_fetcher(mock_client(healthy_subgraph), blocks_client(Vec::new()));
        let chart = fetcher.token_chart("0xccc", now()).await.unwrap();

        assert_eq!(chart[0], DayBucket::new(1_700_006_400, 5.0, 100.0));
        assert_eq!(chart[1], DayBucket::new(1_700_092_800, 7.0, 120.0));
        assert!(chart[2..].iter().all(|b| b.volume_usd == 0.0 && b.liquidity_usd == 120.0));
        let last = chart.last().unwrap().date;
        assert!(last < now().timestamp() && last >= now().timestamp() - 2 * ONE_DAY_SECS);
    }
}
