use serde::{Deserialize, Serialize};

use crate::utils::de_decimal;

/// Token state read from the subgraph at one block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSnapshot {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    /// Price in USD per token
    #[serde(rename = "derivedUSD", deserialize_with = "de_decimal", default)]
    pub derived_usd: f64,
    #[serde(rename = "tradeVolumeUSD", deserialize_with = "de_decimal", default)]
    pub trade_volume_usd: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub total_transactions: f64,
    /// Amount of the token locked across all pairs
    #[serde(deserialize_with = "de_decimal", default)]
    pub total_liquidity: f64,
}

/// Token statistics shown on the tokens table and token page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenData {
    /// false when the token is not in the current snapshot
    pub exists: bool,

    pub address: String,
    pub name: String,
    pub symbol: String,

    // volume
    pub volume_usd: f64,
    pub volume_usd_change: f64,
    pub volume_usd_week: f64,
    pub total_transactions: f64,

    // liquidity
    pub liquidity_usd: f64,
    pub liquidity_usd_change: f64,
    pub liquidity_token: f64,

    // prices
    pub price_usd: f64,
    pub price_usd_change: f64,
    pub price_usd_change_week: f64,
}
