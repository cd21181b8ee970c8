use serde::{Deserialize, Serialize};

use crate::utils::de_decimal;

/// Protocol-wide cumulative totals read from the factory entity at one block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSnapshot {
    #[serde(deserialize_with = "de_decimal", default)]
    pub total_transactions: f64,
    #[serde(rename = "totalVolumeUSD", deserialize_with = "de_decimal", default)]
    pub total_volume_usd: f64,
    #[serde(rename = "totalLiquidityUSD", deserialize_with = "de_decimal", default)]
    pub total_liquidity_usd: f64,
}

/// Protocol overview shown on the dashboard home page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolData {
    // volume over the last 24h and its change vs the 24h before
    pub volume_usd: f64,
    pub volume_usd_change: f64,

    // total value locked
    pub liquidity_usd: f64,
    pub liquidity_usd_change: f64,

    // transactions over the last 24h
    pub total_transactions: f64,
    pub total_transactions_change: f64,
}

/// Native asset (BNB) USD price at the current block and historical offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NativePrices {
    pub current: f64,
    pub one_day: f64,
    pub two_day: f64,
    pub week: f64,
}
