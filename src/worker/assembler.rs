//! Combine point-in-time snapshots into display records.
//!
//! Each refresh reads the same entities at the current block and at the
//! blocks 24h, 48h, 7d and 14d ago. A period whose query failed (or whose
//! block could not be resolved) is `None`, and any `None` that a record
//! depends on drops the whole aggregate. An entity that is only missing from
//! a successful historical set is new; the change helpers treat its missing
//! samples as such.

use rustc_hash::FxHashMap;

use crate::models::{
    PairToken, PoolData, PoolSnapshot, PoolToken, PriceCandle, ProtocolData, ProtocolSnapshot,
    SupportedDex, TokenData, TokenSnapshot,
};
use crate::utils::{
    amount_change, change_for_period, format_token_name, format_token_symbol, percent_change,
};

/// Snapshots of one query at each historical offset.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSet<T> {
    pub current: Option<T>,
    pub one_day: Option<T>,
    pub two_days: Option<T>,
    pub one_week: Option<T>,
    pub two_weeks: Option<T>,
}

impl<T> Default for SnapshotSet<T> {
    fn default() -> Self {
        Self {
            current: None,
            one_day: None,
            two_days: None,
            one_week: None,
            two_weeks: None,
        }
    }
}

impl<T> SnapshotSet<T> {
    /// All five periods, or `None` if any is missing.
    pub fn complete(&self) -> Option<[&T; 5]> {
        Some([
            self.current.as_ref()?,
            self.one_day.as_ref()?,
            self.two_days.as_ref()?,
            self.one_week.as_ref()?,
            self.two_weeks.as_ref()?,
        ])
    }
}

fn index_by_id<T, F>(rows: &[T], id: F) -> FxHashMap<String, &T>
where
    F: Fn(&T) -> &str,
{
    rows.iter().map(|row| (id(row).to_lowercase(), row)).collect()
}

fn pool_id(pool: &PoolSnapshot) -> &str {
    &pool.id
}

fn token_id(token: &TokenSnapshot) -> &str {
    &token.id
}

pub fn assemble_protocol(
    current: Option<&ProtocolSnapshot>,
    one_day: Option<&ProtocolSnapshot>,
    two_days: Option<&ProtocolSnapshot>,
) -> Option<ProtocolData> {
    let (current, one_day, two_days) = (current?, one_day?, two_days?);

    let (volume_usd, volume_usd_change) = change_for_period(
        Some(current.total_volume_usd),
        Some(one_day.total_volume_usd),
        Some(two_days.total_volume_usd),
    );

    let liquidity_usd_change = percent_change(
        Some(current.total_liquidity_usd),
        Some(one_day.total_liquidity_usd),
    );

    let (total_transactions, total_transactions_change) = change_for_period(
        Some(current.total_transactions),
        Some(one_day.total_transactions),
        Some(two_days.total_transactions),
    );

    Some(ProtocolData {
        volume_usd,
        volume_usd_change,
        liquidity_usd: current.total_liquidity_usd,
        liquidity_usd_change,
        total_transactions,
        total_transactions_change,
    })
}

fn pool_token(dex: SupportedDex, token: &PairToken) -> PoolToken {
    PoolToken {
        address: token.id.clone(),
        name: format_token_name(dex, &token.id, &token.name),
        symbol: format_token_symbol(dex, &token.id, &token.symbol),
    }
}

/// Pool records for `addresses`, in request order.
///
/// Pools missing from the current snapshot are skipped.
pub fn assemble_pools(
    dex: SupportedDex,
    addresses: &[String],
    snapshots: &SnapshotSet<Vec<PoolSnapshot>>,
) -> Option<Vec<PoolData>> {
    let [current, one_day, two_days, one_week, two_weeks] = snapshots.complete()?;

    let current = index_by_id(current, pool_id);
    let one_day = index_by_id(one_day, pool_id);
    let two_days = index_by_id(two_days, pool_id);
    let one_week = index_by_id(one_week, pool_id);
    let two_weeks = index_by_id(two_weeks, pool_id);

    let pools = addresses
        .iter()
        .filter_map(|address| {
            let address = address.to_lowercase();
            let pool = *current.get(&address)?;
            let day = one_day.get(&address).copied();
            let two_day = two_days.get(&address).copied();
            let week = one_week.get(&address).copied();
            let two_week = two_weeks.get(&address).copied();

            let (volume_usd, volume_usd_change) = change_for_period(
                Some(pool.volume_usd),
                day.map(|p| p.volume_usd),
                two_day.map(|p| p.volume_usd),
            );
            let (volume_usd_week, volume_usd_change_week) = change_for_period(
                Some(pool.volume_usd),
                week.map(|p| p.volume_usd),
                two_week.map(|p| p.volume_usd),
            );

            Some(PoolData {
                address: address.clone(),
                token0: pool_token(dex, &pool.token0),
                token1: pool_token(dex, &pool.token1),
                volume_usd,
                volume_usd_change,
                volume_usd_week,
                volume_usd_change_week,
                liquidity_usd: pool.reserve_usd,
                liquidity_usd_change: percent_change(
                    Some(pool.reserve_usd),
                    day.map(|p| p.reserve_usd),
                ),
                token0_price: pool.token0_price,
                token1_price: pool.token1_price,
                liquidity_token0: pool.reserve0,
                liquidity_token1: pool.reserve1,
            })
        })
        .collect();

    Some(pools)
}

fn token_tvl(token: &TokenSnapshot) -> f64 {
    token.total_liquidity * token.derived_usd
}

fn missing_token(address: String) -> TokenData {
    TokenData {
        exists: false,
        address,
        name: String::new(),
        symbol: String::new(),
        volume_usd: 0.0,
        volume_usd_change: 0.0,
        volume_usd_week: 0.0,
        total_transactions: 0.0,
        liquidity_usd: 0.0,
        liquidity_usd_change: 0.0,
        liquidity_token: 0.0,
        price_usd: 0.0,
        price_usd_change: 0.0,
        price_usd_change_week: 0.0,
    }
}

/// Token records for every address in `addresses`, in request order.
///
/// Tokens missing from the current snapshot get `exists == false`.
pub fn assemble_tokens(
    dex: SupportedDex,
    addresses: &[String],
    snapshots: &SnapshotSet<Vec<TokenSnapshot>>,
) -> Option<Vec<TokenData>> {
    let [current, one_day, two_days, one_week, two_weeks] = snapshots.complete()?;

    let current = index_by_id(current, token_id);
    let one_day = index_by_id(one_day, token_id);
    let two_days = index_by_id(two_days, token_id);
    let one_week = index_by_id(one_week, token_id);
    let two_weeks = index_by_id(two_weeks, token_id);

    let tokens = addresses
        .iter()
        .map(|address| {
            let address = address.to_lowercase();
            let Some(token) = current.get(&address).copied() else {
                return missing_token(address);
            };
            let day = one_day.get(&address).copied();
            let two_day = two_days.get(&address).copied();
            let week = one_week.get(&address).copied();
            let two_week = two_weeks.get(&address).copied();

            let (volume_usd, volume_usd_change) = change_for_period(
                Some(token.trade_volume_usd),
                day.map(|t| t.trade_volume_usd),
                two_day.map(|t| t.trade_volume_usd),
            );
            let (volume_usd_week, _) = change_for_period(
                Some(token.trade_volume_usd),
                week.map(|t| t.trade_volume_usd),
                two_week.map(|t| t.trade_volume_usd),
            );

            let liquidity_usd = token_tvl(token);

            TokenData {
                exists: true,
                name: format_token_name(dex, &address, &token.name),
                symbol: format_token_symbol(dex, &address, &token.symbol),
                volume_usd,
                volume_usd_change,
                volume_usd_week,
                total_transactions: amount_change(
                    Some(token.total_transactions),
                    day.map(|t| t.total_transactions),
                ),
                liquidity_usd,
                liquidity_usd_change: percent_change(Some(liquidity_usd), day.map(token_tvl)),
                liquidity_token: token.total_liquidity,
                price_usd: token.derived_usd,
                price_usd_change: percent_change(
                    Some(token.derived_usd),
                    day.map(|t| t.derived_usd),
                ),
                price_usd_change_week: percent_change(
                    Some(token.derived_usd),
                    week.map(|t| t.derived_usd),
                ),
                address,
            }
        })
        .collect();

    Some(tokens)
}

/// Candles from consecutive `(timestamp, price)` samples.
///
/// Each candle spans two samples: it opens and lows at the first, closes
/// and highs at the second.
pub fn candles_from_prices(prices: &[(i64, f64)]) -> Vec<PriceCandle> {
    prices
        .windows(2)
        .map(|pair| {
            let (time, open) = pair[0];
            let (_, close) = pair[1];
            PriceCandle {
                time,
                open,
                close,
                high: close,
                low: open,
            }
        })
        .collect()
}
