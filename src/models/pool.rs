use serde::{Deserialize, Serialize};

use crate::utils::de_decimal;

/// Token reference embedded in a pair row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PairToken {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

/// Pair state read from the subgraph at one block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub id: String,
    #[serde(deserialize_with = "de_decimal", default)]
    pub reserve0: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub reserve1: f64,
    #[serde(rename = "reserveUSD", deserialize_with = "de_decimal", default)]
    pub reserve_usd: f64,
    #[serde(rename = "volumeUSD", deserialize_with = "de_decimal", default)]
    pub volume_usd: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub token0_price: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub token1_price: f64,
    pub token0: PairToken,
    pub token1: PairToken,
}

/// Display token of a pool, with overrides applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// Pool statistics shown on the pools table and pool page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolData {
    pub address: String,

    pub token0: PoolToken,
    pub token1: PoolToken,

    // volume
    pub volume_usd: f64,
    pub volume_usd_change: f64,
    pub volume_usd_week: f64,
    pub volume_usd_change_week: f64,

    // liquidity
    pub liquidity_usd: f64,
    pub liquidity_usd_change: f64,

    // prices
    pub token0_price: f64,
    pub token1_price: f64,

    // token amounts
    pub liquidity_token0: f64,
    pub liquidity_token1: f64,
}
