use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use log::{info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Sends one GraphQL request and returns the raw response body.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn post(&self, query: &str, variables: &Value) -> anyhow::Result<Value>;
}

/// POSTs `{ query, variables }` as JSON to a subgraph endpoint.
pub struct HttpTransport {
    url: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { url, http })
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    async fn post(&self, query: &str, variables: &Value) -> anyhow::Result<Value> {
        let request = GraphQlRequest { query, variables };

        let response = self
            .http
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

/// GraphQL client for one subgraph endpoint.
///
/// Responses carrying an `errors` array or no `data` are turned into
/// errors, so callers only ever see fully typed payloads.
#[derive(Clone)]
pub struct SubgraphClient {
    label: String,
    transport: Arc<dyn GraphQlTransport>,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MetaResponse {
    #[serde(rename = "_meta")]
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Meta {
    block: MetaBlock,
}

#[derive(Debug, Deserialize)]
struct MetaBlock {
    number: u64,
}

/// Unwrap a GraphQL response into its data payload.
pub(crate) fn decode_response<T>(label: &str, response: GraphQlResponse<T>) -> anyhow::Result<T> {
    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        bail!("{} returned errors: {}", label, messages.join("; "));
    }

    response
        .data
        .with_context(|| format!("{} returned no data", label))
}

impl SubgraphClient {
    pub fn new(label: impl Into<String>, url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(url, timeout)?;
        Ok(Self::with_transport(label, Arc::new(transport)))
    }

    pub fn with_transport(label: impl Into<String>, transport: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            label: label.into(),
            transport,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run a query and deserialize its `data` payload.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> anyhow::Result<T> {
        let body = self
            .transport
            .post(query, &variables)
            .await
            .with_context(|| format!("Request to {} failed", self.label))?;

        let body: GraphQlResponse<T> = serde_json::from_value(body)
            .with_context(|| format!("Failed to decode response from {}", self.label))?;

        decode_response(&self.label, body)
    }

    /// Verify the subgraph answers, returning its latest indexed block.
    ///
    /// Retries with exponential backoff before giving up.
    pub async fn health_check(&self) -> anyhow::Result<u64> {
        let max_retries = 3;
        let mut retries = 0;

        loop {
            match self
                .query::<MetaResponse>("{ _meta { block { number } } }", Value::Null)
                .await
            {
                Ok(meta) => {
                    info!(
                        "Connected to {} (indexed up to block {})",
                        self.label, meta.meta.block.number
                    );
                    return Ok(meta.meta.block.number);
                },
                Err(e) => {
                    retries += 1;
                    if retries >= max_retries {
                        return Err(e.context(format!(
                            "Failed to reach {} after {} attempts",
                            self.label, max_retries
                        )));
                    }

                    let delay = Duration::from_millis(100 * 2_u64.pow(retries));
                    warn!(
                        "Failed to reach {} (attempt {}/{}), retrying in {:?}...",
                        self.label, retries, max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                },
            }
        }
    }
}
