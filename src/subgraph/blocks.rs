use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use log::debug;
use moka::future::Cache;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

use crate::subgraph::{queries, SubgraphClient};
use crate::utils::de_integer;

/// Aliased sub-queries per blocks request
const BLOCKS_CHUNK_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
struct BlockRow {
    #[serde(deserialize_with = "de_integer")]
    number: i64,
}

/// Resolves unix timestamps to block numbers through a blocks subgraph.
///
/// Historical blocks never change, so resolved numbers are cached. A
/// timestamp without a block in the lookup window resolves to `None`.
#[derive(Clone)]
pub struct BlockResolver {
    client: SubgraphClient,
    cache: Cache<i64, u64>,
}

impl BlockResolver {
    pub fn new(client: SubgraphClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(3600))
            .build();

        Self { client, cache }
    }

    pub async fn health_check(&self) -> anyhow::Result<u64> {
        self.client.health_check().await
    }

    /// Block numbers aligned with `timestamps`.
    pub async fn blocks_for(&self, timestamps: &[i64]) -> anyhow::Result<Vec<Option<u64>>> {
        let mut resolved: FxHashMap<i64, u64> = FxHashMap::default();
        let mut missing = Vec::new();

        for ts in timestamps {
            match self.cache.get(ts).await {
                Some(number) => {
                    resolved.insert(*ts, number);
                },
                None => missing.push(*ts),
            }
        }

        for chunk in missing.chunks(BLOCKS_CHUNK_SIZE) {
            let response: HashMap<String, Vec<BlockRow>> = self
                .client
                .query(&queries::blocks_by_timestamps(chunk), Value::Null)
                .await
                .with_context(|| format!("Failed to resolve {} block timestamps", chunk.len()))?;

            for (ts, number) in parse_block_aliases(response) {
                self.cache.insert(ts, number).await;
                resolved.insert(ts, number);
            }
        }

        debug!(
            "Resolved {}/{} timestamps to blocks on {}",
            resolved.len(),
            timestamps.len(),
            self.client.label()
        );

        Ok(timestamps.iter().map(|ts| resolved.get(ts).copied()).collect())
    }
}

/// Map `t<timestamp>` aliases to the first returned block number.
fn parse_block_aliases(response: HashMap<String, Vec<BlockRow>>) -> FxHashMap<i64, u64> {
    response
        .into_iter()
        .filter_map(|(alias, rows)| {
            let ts = alias.strip_prefix('t')?.parse::<i64>().ok()?;
            let number = rows.first()?.number;
            u64::try_from(number).ok().map(|n| (ts, n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::subgraph::mock::{data, mock_client, timestamp_aliases, MockTransport};

    #[test]
    fn test_parse_block_aliases() {
        let response: HashMap<String, Vec<BlockRow>> = serde_json::from_str(
            r#"{
                "t1700000000": [{"number": "33000000"}],
                "t1700086400": [],
                "bogus": [{"number": "1"}]
            }"#,
        )
        .unwrap();

        let parsed = parse_block_aliases(response);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get(&1_700_000_000), Some(&33_000_000));
        assert!(!parsed.contains_key(&1_700_086_400));
    }

    #[tokio::test]
    async fn test_health_check_reaches_blocks_subgraph() {
        let resolver = BlockResolver::new(mock_client(|query, _| {
            assert!(query.contains("_meta"));
            data(json!({ "_meta": { "block": { "number": 41_000_000 } } }))
        }));
        assert_eq!(resolver.health_check().await.unwrap(), 41_000_000);
    }

    #[tokio::test]
    async fn test_blocks_for_aligns_and_caches() {
        let transport = Arc::new(MockTransport::new(|query: &str, _: &Value| {
            let mut response = serde_json::Map::new();
            for ts in timestamp_aliases(query) {
                let rows = if ts == 200 { json!([]) } else { json!([{ "number": ts * 10 }]) };
                response.insert(format!("t{}", ts), rows);
            }
            data(Value::Object(response))
        }));
        let resolver =
            BlockResolver::new(SubgraphClient::with_transport("blocks", transport.clone()));

        let blocks = resolver.blocks_for(&[300, 100, 200]).await.unwrap();
        assert_eq!(blocks, vec![Some(3000), Some(1000), None]);
        assert_eq!(transport.calls(), 1);

        // Cached timestamps are not asked again, unresolved ones are
        resolver.blocks_for(&[100, 300, 200]).await.unwrap();
        assert_eq!(transport.calls(), 2);
        resolver.blocks_for(&[100, 300]).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }
}
