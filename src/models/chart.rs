use serde::{Deserialize, Serialize};

use crate::utils::{de_decimal, de_integer};

/// Raw day data row as returned by the subgraph.
///
/// Protocol and token day datas report liquidity as `totalLiquidityUSD`,
/// pair day datas as `reserveUSD`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DayDataRow {
    #[serde(deserialize_with = "de_integer")]
    pub date: i64,
    #[serde(rename = "dailyVolumeUSD", deserialize_with = "de_decimal", default)]
    pub volume_usd: f64,
    #[serde(
        rename = "totalLiquidityUSD",
        alias = "reserveUSD",
        deserialize_with = "de_decimal",
        default
    )]
    pub liquidity_usd: f64,
}

/// One UTC day of a chart series.
///
/// Volume is a flow (zero on days without activity), liquidity is a stock
/// (carried over from the previous day).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBucket {
    /// Unix seconds
    pub date: i64,
    pub volume_usd: f64,
    pub liquidity_usd: f64,
}

impl DayBucket {
    pub fn new(date: i64, volume_usd: f64, liquidity_usd: f64) -> Self {
        Self {
            date,
            volume_usd,
            liquidity_usd,
        }
    }
}

impl From<DayDataRow> for DayBucket {
    fn from(row: DayDataRow) -> Self {
        Self::new(row.date, row.volume_usd, row.liquidity_usd)
    }
}

/// Token price candle built from two consecutive price samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceCandle {
    pub time: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}
