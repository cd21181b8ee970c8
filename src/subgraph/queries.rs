//! GraphQL documents for the Uniswap V2 style subgraphs.
//!
//! Bulk and block-pinned queries interpolate their arguments because The Graph
//! does not accept block filters as variables on every deployment. Address
//! lists are rendered through serde_json, which yields valid GraphQL string
//! lists. Entities whose names differ per DEX are aliased to a fixed name so
//! responses deserialize into one shape.

use crate::models::SupportedDex;

/// Rows per page for paginated day data queries (The Graph maximum)
pub const PAGE_SIZE: usize = 1000;

/// Top pairs listed on the overview page
pub const TOP_POOLS_LIMIT: usize = 20;

/// Top tokens listed on the overview page
pub const TOP_TOKENS_LIMIT: usize = 30;

/// Addresses per bulk snapshot query (The Graph default page size)
pub const BULK_CHUNK_SIZE: usize = 100;

/// Window for block lookups: first block within 10 minutes after the timestamp
pub const BLOCK_WINDOW_SECS: i64 = 600;

const PAIR_TOKENS_FIELDS: &str = "pair { token0 { id symbol } token1 { id symbol } }";
const MINT_FIELDS: &str = "id timestamp to amount0 amount1 amountUSD";
const SWAP_FIELDS: &str = "id timestamp from amount0In amount1In amount0Out amount1Out amountUSD";
const BURN_FIELDS: &str = "id timestamp sender amount0 amount1 amountUSD";

fn block_filter(block: Option<u64>) -> String {
    match block {
        Some(number) => format!("block: {{ number: {} }}, ", number),
        None => String::new(),
    }
}

fn address_list(addresses: &[String]) -> String {
    serde_json::to_string(addresses).unwrap_or_else(|_| "[]".to_string())
}

// ============================================
// Protocol
// ============================================

/// Cumulative protocol totals, aliased to `factories`.
pub fn protocol_overview(dex: SupportedDex, block: Option<u64>) -> String {
    format!(
        "query overview {{ factories: {entity}({block}first: 1) {{ totalTransactions totalVolumeUSD totalLiquidityUSD }} }}",
        entity = dex.factory_entity(),
        block = block_filter(block),
    )
}

/// Paged protocol day datas, aliased to `dayDatas`.
///
/// Variables: `startTime`, `skip`.
pub fn protocol_chart(dex: SupportedDex) -> String {
    format!(
        "query dayDatas($startTime: Int!, $skip: Int!) {{ dayDatas: {entity}(first: {page}, skip: $skip, where: {{ date_gt: $startTime }}, orderBy: date, orderDirection: asc) {{ date dailyVolumeUSD totalLiquidityUSD }} }}",
        entity = dex.day_data_entity(),
        page = PAGE_SIZE,
    )
}

/// Native asset prices now and at three historical blocks.
///
/// Variables: `block24`, `block48`, `blockWeek`.
pub const NATIVE_PRICES: &str = r#"
    query prices($block24: Int!, $block48: Int!, $blockWeek: Int!) {
        current: bundles(first: 1, subgraphError: allow) { bnbPrice }
        oneDay: bundles(first: 1, block: { number: $block24 }, subgraphError: allow) { bnbPrice }
        twoDay: bundles(first: 1, block: { number: $block48 }, subgraphError: allow) { bnbPrice }
        oneWeek: bundles(first: 1, block: { number: $blockWeek }, subgraphError: allow) { bnbPrice }
    }
"#;

// ============================================
// Pools
// ============================================

/// Most liquid pairs with some activity.
pub fn top_pools() -> String {
    format!(
        "query topPools {{ pairs(first: {limit}, orderBy: reserveUSD, orderDirection: desc, where: {{ totalTransactions_gt: 5 }}) {{ id }} }}",
        limit = TOP_POOLS_LIMIT,
    )
}

/// Pair snapshots for a list of addresses, optionally pinned to a block.
///
/// At most [`BULK_CHUNK_SIZE`] addresses per query.
pub fn pools_bulk(block: Option<u64>, pools: &[String]) -> String {
    format!(
        "query pairs {{ pairs(first: {first}, where: {{ id_in: {ids} }}, {block}orderBy: volumeUSD, orderDirection: desc) {{ id reserve0 reserve1 reserveUSD volumeUSD token0Price token1Price token0 {{ id symbol name }} token1 {{ id symbol name }} }} }}",
        first = pools.len().max(1),
        ids = address_list(pools),
        block = block_filter(block),
    )
}

/// Paged pair day datas, aliased to `dayDatas`.
///
/// Variables: `address`, `startTime`, `skip`.
pub fn pool_chart() -> String {
    format!(
        "query pairDayDatas($startTime: Int!, $skip: Int!, $address: Bytes!) {{ dayDatas: pairDayDatas(first: {page}, skip: $skip, where: {{ pairAddress: $address, date_gt: $startTime }}, orderBy: date, orderDirection: asc, subgraphError: allow) {{ date dailyVolumeUSD reserveUSD }} }}",
        page = PAGE_SIZE,
    )
}

// ============================================
// Tokens
// ============================================

/// Tokens with the highest daily volume.
///
/// Token day data ids are `<address>-<dayIndex>`.
pub fn top_tokens(dex: SupportedDex, timestamp_24h_ago: i64) -> String {
    let where_clause = if dex.filters_top_tokens_by_date() {
        format!("where: {{ date_gt: {} }}", timestamp_24h_ago)
    } else {
        String::new()
    };

    format!(
        "query topTokens {{ tokenDayDatas(first: {limit}, orderDirection: desc, orderBy: dailyVolumeUSD, {where_clause}) {{ id }} }}",
        limit = TOP_TOKENS_LIMIT,
    )
}

/// Token snapshots for a list of addresses, optionally pinned to a block.
///
/// At most [`BULK_CHUNK_SIZE`] addresses per query.
pub fn tokens_bulk(block: Option<u64>, tokens: &[String]) -> String {
    format!(
        "query tokens {{ tokens(first: {first}, where: {{ id_in: {ids} }}, {block}orderBy: tradeVolumeUSD, orderDirection: desc) {{ id symbol name derivedUSD tradeVolumeUSD totalTransactions totalLiquidity }} }}",
        first = tokens.len().max(1),
        ids = address_list(tokens),
        block = block_filter(block),
    )
}

/// Paged token day datas, aliased to `dayDatas`.
///
/// Variables: `address`, `startTime`, `skip`.
pub fn token_chart() -> String {
    format!(
        "query tokenDayDatas($startTime: Int!, $skip: Int!, $address: Bytes!) {{ dayDatas: tokenDayDatas(first: {page}, skip: $skip, where: {{ token: $address, date_gt: $startTime }}, orderBy: date, orderDirection: asc, subgraphError: allow) {{ date dailyVolumeUSD totalLiquidityUSD }} }}",
        page = PAGE_SIZE,
    )
}

/// Most liquid pairs containing a token on either side.
///
/// Variables: `address`.
pub const POOLS_FOR_TOKEN: &str = r#"
    query poolsForToken($address: String!) {
        asToken0: pairs(first: 15, orderBy: trackedReserveBNB, orderDirection: desc, where: { token0: $address, totalTransactions_gt: 2 }) { id }
        asToken1: pairs(first: 15, orderBy: trackedReserveBNB, orderDirection: desc, where: { token1: $address, totalTransactions_gt: 2 }) { id }
    }
"#;

/// Token USD price at each `(timestamp, block)`, aliased `t<timestamp>`.
pub fn prices_by_block(token: &str, blocks: &[(i64, u64)]) -> String {
    let fields: Vec<String> = blocks
        .iter()
        .map(|(timestamp, number)| {
            format!(
                "t{ts}: token(id: \"{token}\", block: {{ number: {number} }}, subgraphError: allow) {{ derivedUSD }}",
                ts = timestamp,
                token = token,
                number = number,
            )
        })
        .collect();

    format!("query blocks {{ {} }}", fields.join(" "))
}

// ============================================
// Blocks
// ============================================

/// First block after each timestamp, aliased `t<timestamp>` (blocks subgraph).
pub fn blocks_by_timestamps(timestamps: &[i64]) -> String {
    let fields: Vec<String> = timestamps
        .iter()
        .map(|ts| {
            format!(
                "t{ts}: blocks(first: 1, orderBy: timestamp, orderDirection: desc, where: {{ timestamp_gt: {ts}, timestamp_lt: {end} }}) {{ number }}",
                ts = ts,
                end = ts + BLOCK_WINDOW_SECS,
            )
        })
        .collect();

    format!("query blocks {{ {} }}", fields.join(" "))
}

// ============================================
// Transactions
// ============================================

/// Which transactions a transaction table shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionFilter {
    /// Latest transactions across the protocol
    All,
    /// Transactions of one pair
    Pair(String),
    /// Transactions of every pair containing a token
    Token(String),
}

impl TransactionFilter {
    /// Rows fetched per entity type (and per side for tokens)
    pub fn limit(&self) -> usize {
        match self {
            TransactionFilter::All => 33,
            TransactionFilter::Pair(_) => 35,
            TransactionFilter::Token(_) => 10,
        }
    }
}

/// Latest mints, swaps and burns for a filter.
///
/// Token filters alias both sides (`mintsAs0`, `mintsAs1`, ...).
pub fn transactions(filter: &TransactionFilter) -> String {
    let limit = filter.limit();
    let entities = [
        ("mints", MINT_FIELDS),
        ("swaps", SWAP_FIELDS),
        ("burns", BURN_FIELDS),
    ];

    let field = |alias: &str, entity: &str, where_clause: &str, fields: &str| {
        format!(
            "{alias}: {entity}(first: {limit}, orderBy: timestamp, orderDirection: desc{where_clause}) {{ {fields} {PAIR_TOKENS_FIELDS} }}",
        )
    };

    let mut parts = Vec::with_capacity(6);
    for (entity, fields) in entities {
        match filter {
            TransactionFilter::All => parts.push(field(entity, entity, "", fields)),
            TransactionFilter::Pair(address) => {
                let where_clause = format!(", where: {{ pair: \"{}\" }}", address);
                parts.push(field(entity, entity, &where_clause, fields));
            },
            TransactionFilter::Token(address) => {
                for side in ["0", "1"] {
                    let alias = format!("{}As{}", entity, side);
                    let where_clause =
                        format!(", where: {{ pair_: {{ token{}: \"{}\" }} }}", side, address);
                    parts.push(field(&alias, entity, &where_clause, fields));
                }
            },
        }
    }

    format!("query transactions {{ {} }}", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_overview_entities_per_dex() {
        let pancake = protocol_overview(SupportedDex::Pancakeswap, None);
        assert!(pancake.contains("factories: pancakeFactories(first: 1)"));

        let litedex = protocol_overview(SupportedDex::Litedex, Some(123));
        assert!(litedex.contains("factories: prodFactories(block: { number: 123 }, first: 1)"));
    }

    #[test]
    fn test_bulk_queries_render_address_lists() {
        let ids = vec!["0xaaa".to_string(), "0xbbb".to_string()];
        let query = pools_bulk(Some(42), &ids);
        assert!(query.contains(r#"id_in: ["0xaaa","0xbbb"]"#));
        assert!(query.contains("block: { number: 42 }"));
        assert!(query.contains("pairs(first: 2, "));

        let query = tokens_bulk(None, &ids);
        assert!(!query.contains("block:"));
    }

    #[test]
    fn test_top_tokens_date_filter() {
        assert!(top_tokens(SupportedDex::Biswap, 1000).contains("date_gt: 1000"));
        assert!(!top_tokens(SupportedDex::Litedex, 1000).contains("date_gt"));
    }

    #[test]
    fn test_blocks_query_aliases() {
        let query = blocks_by_timestamps(&[100, 200]);
        assert!(query.contains("t100: blocks("));
        assert!(query.contains("timestamp_gt: 200, timestamp_lt: 800"));
    }

    #[test]
    fn test_token_transactions_query_both_sides() {
        let query = transactions(&TransactionFilter::Token("0xabc".to_string()));
        for alias in ["mintsAs0", "mintsAs1", "swapsAs0", "swapsAs1", "burnsAs0", "burnsAs1"] {
            assert!(query.contains(alias), "missing {}", alias);
        }
        assert!(query.contains(r#"pair_: { token1: "0xabc" }"#));
        assert!(query.contains("first: 10"));
    }

    #[test]
    fn test_pair_transactions_query() {
        let query = transactions(&TransactionFilter::Pair("0xpair".to_string()));
        assert!(query.contains(r#"where: { pair: "0xpair" }"#));
        assert!(query.contains("mints: mints(first: 35"));
    }
}
