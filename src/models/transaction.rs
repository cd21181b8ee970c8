use serde::{Deserialize, Serialize};

use crate::utils::{de_decimal, de_integer, entity_id_prefix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Swap,
    Mint,
    Burn,
}

/// A swap, mint or burn as listed in transaction tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub kind: TransactionType,
    pub hash: String,
    pub timestamp: i64,
    pub sender: String,
    pub token0_symbol: String,
    pub token1_symbol: String,
    pub token0_address: String,
    pub token1_address: String,
    pub amount_usd: f64,
    pub amount_token0: f64,
    pub amount_token1: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxToken {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxPair {
    pub token0: TxToken,
    pub token1: TxToken,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRow {
    pub id: String,
    #[serde(deserialize_with = "de_integer")]
    pub timestamp: i64,
    pub pair: TxPair,
    #[serde(default)]
    pub to: String,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount0: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount1: f64,
    #[serde(rename = "amountUSD", deserialize_with = "de_decimal", default)]
    pub amount_usd: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRow {
    pub id: String,
    #[serde(deserialize_with = "de_integer")]
    pub timestamp: i64,
    pub pair: TxPair,
    #[serde(default)]
    pub from: String,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount0_in: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount1_in: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount0_out: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount1_out: f64,
    #[serde(rename = "amountUSD", deserialize_with = "de_decimal", default)]
    pub amount_usd: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRow {
    pub id: String,
    #[serde(deserialize_with = "de_integer")]
    pub timestamp: i64,
    pub pair: TxPair,
    #[serde(default)]
    pub sender: String,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount0: f64,
    #[serde(deserialize_with = "de_decimal", default)]
    pub amount1: f64,
    #[serde(rename = "amountUSD", deserialize_with = "de_decimal", default)]
    pub amount_usd: f64,
}

impl Transaction {
    fn from_parts(
        kind: TransactionType,
        id: &str,
        timestamp: i64,
        pair: TxPair,
        sender: String,
        amounts: (f64, f64, f64),
    ) -> Self {
        let (amount_usd, amount_token0, amount_token1) = amounts;
        Self {
            kind,
            hash: entity_id_prefix(id).to_string(),
            timestamp,
            sender,
            token0_symbol: pair.token0.symbol,
            token1_symbol: pair.token1.symbol,
            token0_address: pair.token0.id,
            token1_address: pair.token1.id,
            amount_usd,
            amount_token0,
            amount_token1,
        }
    }
}

impl From<MintRow> for Transaction {
    fn from(row: MintRow) -> Self {
        Self::from_parts(
            TransactionType::Mint,
            &row.id,
            row.timestamp,
            row.pair,
            row.to,
            (row.amount_usd, row.amount0, row.amount1),
        )
    }
}

impl From<SwapRow> for Transaction {
    fn from(row: SwapRow) -> Self {
        // net flow into the pair per side
        let amount0 = row.amount0_in - row.amount0_out;
        let amount1 = row.amount1_in - row.amount1_out;
        Self::from_parts(
            TransactionType::Swap,
            &row.id,
            row.timestamp,
            row.pair,
            row.from,
            (row.amount_usd, amount0, amount1),
        )
    }
}

impl From<BurnRow> for Transaction {
    fn from(row: BurnRow) -> Self {
        Self::from_parts(
            TransactionType::Burn,
            &row.id,
            row.timestamp,
            row.pair,
            row.sender,
            (row.amount_usd, row.amount0, row.amount1),
        )
    }
}

/// Merge mints, burns and swaps into one list, newest first.
pub fn merge_transactions(
    mints: Vec<MintRow>,
    burns: Vec<BurnRow>,
    swaps: Vec<SwapRow>,
) -> Vec<Transaction> {
    let mut transactions: Vec<Transaction> = mints
        .into_iter()
        .map(Transaction::from)
        .chain(burns.into_iter().map(Transaction::from))
        .chain(swaps.into_iter().map(Transaction::from))
        .collect();

    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    transactions
}
