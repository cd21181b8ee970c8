//! Canned subgraph responses for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::{GraphQlTransport, SubgraphClient};

/// Answers every request through `respond`, counting calls.
pub(crate) struct MockTransport<F> {
    respond: F,
    calls: AtomicUsize,
}

impl<F> MockTransport<F>
where
    F: Fn(&str, &Value) -> anyhow::Result<Value> + Send + Sync,
{
    pub(crate) fn new(respond: F) -> Self {
        Self {
            respond,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F> GraphQlTransport for MockTransport<F>
where
    F: Fn(&str, &Value) -> anyhow::Result<Value> + Send + Sync,
{
    async fn post(&self, query: &str, variables: &Value) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(query, variables)
    }
}

pub(crate) fn mock_client<F>(respond: F) -> SubgraphClient
where
    F: Fn(&str, &Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    SubgraphClient::with_transport("mock subgraph", Arc::new(MockTransport::new(respond)))
}

/// Wrap a payload the way a subgraph does.
pub(crate) fn data(payload: Value) -> anyhow::Result<Value> {
    Ok(json!({ "data": payload }))
}

/// Aliases of the form `t<timestamp>:` in a query, as timestamps.
pub(crate) fn timestamp_aliases(query: &str) -> Vec<i64> {
    query
        .split_whitespace()
        .filter_map(|word| word.strip_suffix(':')?.strip_prefix('t')?.parse().ok())
        .collect()
}

/// Quoted addresses in a query, in order.
pub(crate) fn quoted_addresses(query: &str) -> Vec<String> {
    query
        .split('"')
        .skip(1)
        .step_by(2)
        .filter(|part| part.starts_with("0x"))
        .map(str::to_string)
        .collect()
}

/// Blocks subgraph resolving every timestamp to a block of the same number,
/// except the ones in `missing`.
pub(crate) fn blocks_client(missing: Vec<i64>) -> SubgraphClient {
    mock_client(move |query, _| {
        let mut response = serde_json::Map::new();
        for ts in timestamp_aliases(query) {
            let rows = if missing.contains(&ts) {
                json!([])
            } else {
                json!([{ "number": ts.to_string() }])
            };
            response.insert(format!("t{}", ts), rows);
        }
        data(Value::Object(response))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_helpers() {
        let query = r#"query blocks { t100: blocks(first: 1) { number } t200: token(id: "0xabc") { id } }"#;
        assert_eq!(timestamp_aliases(query), vec![100, 200]);
        assert_eq!(quoted_addresses(query), vec!["0xabc"]);
    }
}
