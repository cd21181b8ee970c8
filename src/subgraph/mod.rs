//! GraphQL subgraph access.
//!
//! - [`SubgraphClient`] - typed POST client for one endpoint
//! - [`BlockResolver`] - timestamp to block number lookups (cached)
//! - [`queries`] - GraphQL documents per entity
//! - [`DexClients`] - data and blocks clients of one DEX deployment

mod blocks;
mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod queries;

use std::time::Duration;

use anyhow::Context;

pub use blocks::BlockResolver;
pub use client::{GraphQlTransport, HttpTransport, SubgraphClient};
pub use queries::{TransactionFilter, BULK_CHUNK_SIZE, PAGE_SIZE};

use crate::config::{DexSettings, HttpSettings};
use crate::models::SupportedDex;

/// Subgraph clients for one DEX deployment.
#[derive(Clone)]
pub struct DexClients {
    pub dex: SupportedDex,
    pub data: SubgraphClient,
    pub blocks: BlockResolver,
}

impl DexClients {
    pub fn new(settings: &DexSettings, http: &HttpSettings) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(http.request_timeout_secs);

        let data = SubgraphClient::new(
            format!("{} data subgraph", settings.name),
            settings.data_url.clone(),
            timeout,
        )
        .with_context(|| format!("Failed to create data client for {}", settings.name))?;

        let blocks = SubgraphClient::new(
            format!("{} blocks subgraph", settings.name),
            settings.blocks_url.clone(),
            timeout,
        )
        .with_context(|| format!("Failed to create blocks client for {}", settings.name))?;

        Ok(Self {
            dex: settings.dex,
            data,
            blocks: BlockResolver::new(blocks),
        })
    }

    /// Health check both subgraphs.
    pub async fn connect(&self) -> anyhow::Result<()> {
        self.data.health_check().await?;
        self.blocks.health_check().await?;
        Ok(())
    }
}
