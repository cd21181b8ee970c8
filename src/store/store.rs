use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tokio::sync::RwLock;

use super::generation::{FetchKey, FetchTicket, Generations};
use crate::models::{
    DayBucket, FetchState, NativePrices, PoolData, PriceCandle, ProtocolData, SupportedDex,
    TokenData, Transaction,
};

/// Everything shown for a network as a whole.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProtocolEntry {
    pub data: FetchState<ProtocolData>,
    pub chart: FetchState<Vec<DayBucket>>,
    pub transactions: FetchState<Vec<Transaction>>,
    pub native_prices: FetchState<NativePrices>,
    pub top_pools: FetchState<Vec<String>>,
    pub top_tokens: FetchState<Vec<String>>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolEntry {
    pub data: FetchState<PoolData>,
    pub chart: FetchState<Vec<DayBucket>>,
    pub transactions: FetchState<Vec<Transaction>>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenEntry {
    pub data: FetchState<TokenData>,
    pub pool_addresses: FetchState<Vec<String>>,
    pub chart: FetchState<Vec<DayBucket>>,
    pub price_data: FetchState<Vec<PriceCandle>>,
    pub transactions: FetchState<Vec<Transaction>>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Records keyed by `(network, lowercase address)`.
#[derive(Debug, Clone)]
pub struct EntityTable<R> {
    rows: FxHashMap<(SupportedDex, String), R>,
}

impl<R> Default for EntityTable<R> {
    fn default() -> Self {
        Self {
            rows: FxHashMap::default(),
        }
    }
}

impl<R: Clone + Default> EntityTable<R> {
    pub fn get(&self, dex: SupportedDex, address: &str) -> Option<&R> {
        self.rows.get(&(dex, address.to_lowercase()))
    }

    pub fn put(&mut self, dex: SupportedDex, address: &str, record: R) {
        self.rows.insert((dex, address.to_lowercase()), record);
    }

    /// Insert empty placeholders for addresses not seen yet.
    ///
    /// Returns how many entries were created.
    pub fn register_keys<S: AsRef<str>>(&mut self, dex: SupportedDex, addresses: &[S]) -> usize {
        let mut created = 0;
        for address in addresses {
            let key = (dex, address.as_ref().to_lowercase());
            if !self.rows.contains_key(&key) {
                self.rows.insert(key, R::default());
                created += 1;
            }
        }
        created
    }

    /// Replace a record with a modified copy of itself.
    pub fn update<F: FnOnce(&mut R)>(&mut self, dex: SupportedDex, address: &str, apply: F) {
        let key = (dex, address.to_lowercase());
        let mut record = self.rows.get(&key).cloned().unwrap_or_default();
        apply(&mut record);
        self.rows.insert(key, record);
    }

    pub fn addresses(&self, dex: SupportedDex) -> Vec<String> {
        let mut addresses: Vec<String> = self
            .rows
            .keys()
            .filter(|(d, _)| *d == dex)
            .map(|(_, address)| address.clone())
            .collect();
        addresses.sort();
        addresses
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn by_network(&self) -> BTreeMap<SupportedDex, BTreeMap<String, R>> {
        let mut grouped: BTreeMap<SupportedDex, BTreeMap<String, R>> = BTreeMap::new();
        for ((dex, address), record) in &self.rows {
            grouped
                .entry(*dex)
                .or_default()
                .insert(address.clone(), record.clone());
        }
        grouped
    }
}

#[derive(Debug, Default)]
struct StoreState {
    protocol: FxHashMap<SupportedDex, ProtocolEntry>,
    pools: EntityTable<PoolEntry>,
    tokens: EntityTable<TokenEntry>,
    generations: Generations,
}

/// Serializable copy of the whole store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub generated_at: DateTime<Utc>,
    pub protocol: BTreeMap<SupportedDex, ProtocolEntry>,
    pub pools: BTreeMap<SupportedDex, BTreeMap<String, PoolEntry>>,
    pub tokens: BTreeMap<SupportedDex, BTreeMap<String, TokenEntry>>,
}

/// In-memory store shared by all refresh jobs.
///
/// Entries only ever change by whole-record replacement. Writes coming from
/// a fetch go through its [`FetchTicket`] and are dropped when a newer fetch
/// for the same key started in the meantime, or the key was retired.
#[derive(Debug, Default)]
pub struct Store {
    state: RwLock<StoreState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================
    // Generations
    // ============================================

    pub async fn begin_fetch(&self, key: FetchKey) -> FetchTicket {
        self.state.write().await.generations.begin(key)
    }

    pub async fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.state.read().await.generations.is_current(ticket)
    }

    pub async fn retire(&self, key: &FetchKey) {
        self.state.write().await.generations.retire(key);
    }

    /// Invalidate all in-flight fetches (shutdown).
    pub async fn retire_all(&self) {
        self.state.write().await.generations.close();
    }

    pub async fn is_closed(&self) -> bool {
        self.state.read().await.generations.is_closed()
    }

    // ============================================
    // Reads
    // ============================================

    pub async fn protocol(&self, dex: SupportedDex) -> Option<ProtocolEntry> {
        self.state.read().await.protocol.get(&dex).cloned()
    }

    pub async fn pool(&self, dex: SupportedDex, address: &str) -> Option<PoolEntry> {
        self.state.read().await.pools.get(dex, address).cloned()
    }

    pub async fn token(&self, dex: SupportedDex, address: &str) -> Option<TokenEntry> {
        self.state.read().await.tokens.get(dex, address).cloned()
    }

    pub async fn pool_addresses(&self, dex: SupportedDex) -> Vec<String> {
        self.state.read().await.pools.addresses(dex)
    }

    pub async fn token_addresses(&self, dex: SupportedDex) -> Vec<String> {
        self.state.read().await.tokens.addresses(dex)
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            generated_at: Utc::now(),
            protocol: state
                .protocol
                .iter()
                .map(|(dex, entry)| (*dex, entry.clone()))
                .collect(),
            pools: state.pools.by_network(),
            tokens: state.tokens.by_network(),
        }
    }

    // ============================================
    // Writes
    // ============================================

    pub async fn put_pool(&self, dex: SupportedDex, address: &str, entry: PoolEntry) {
        self.state.write().await.pools.put(dex, address, entry);
    }

    pub async fn put_token(&self, dex: SupportedDex, address: &str, entry: TokenEntry) {
        self.state.write().await.tokens.put(dex, address, entry);
    }

    pub async fn register_pools<S: AsRef<str>>(&self, dex: SupportedDex, addresses: &[S]) -> usize {
        self.state.write().await.pools.register_keys(dex, addresses)
    }

    pub async fn register_tokens<S: AsRef<str>>(
        &self,
        dex: SupportedDex,
        addresses: &[S],
    ) -> usize {
        self.state.write().await.tokens.register_keys(dex, addresses)
    }

    /// Apply `apply` to the protocol entry if `ticket` is still current.
    ///
    /// Returns whether the write happened.
    pub async fn update_protocol_if_current<F>(&self, ticket: &FetchTicket, apply: F) -> bool
    where
        F: FnOnce(&mut ProtocolEntry),
    {
        let mut state = self.state.write().await;
        if !state.generations.is_current(ticket) {
            debug!("Dropping stale write for {:?}", ticket.key());
            return false;
        }

        let dex = ticket.key().dex();
        let mut entry = state.protocol.get(&dex).cloned().unwrap_or_default();
        apply(&mut entry);
        state.protocol.insert(dex, entry);
        true
    }

    pub async fn update_pool_if_current<F>(
        &self,
        ticket: &FetchTicket,
        address: &str,
        apply: F,
    ) -> bool
    where
        F: FnOnce(&mut PoolEntry),
    {
        let mut state = self.state.write().await;
        if !state.generations.is_current(ticket) {
            debug!("Dropping stale pool write for {} ({:?})", address, ticket.key());
            return false;
        }

        state.pools.update(ticket.key().dex(), address, apply);
        true
    }

    pub async fn update_token_if_current<F>(
        &self,
        ticket: &FetchTicket,
        address: &str,
        apply: F,
    ) -> bool
    where
        F: FnOnce(&mut TokenEntry),
    {
        let mut state = self.state.write().await;
        if !state.generations.is_current(ticket) {
            debug!("Dropping stale token write for {} ({:?})", address, ticket.key());
            return false;
        }

        state.tokens.update(ticket.key().dex(), address, apply);
        true
    }

    /// Replace the top pool list, retiring pools that dropped out of it.
    ///
    /// Returns the dropped addresses, or `None` when the ticket is stale.
    pub async fn set_top_pools_if_current(
        &self,
        ticket: &FetchTicket,
        addresses: &[String],
    ) -> Option<Vec<String>> {
        self.set_top_list_if_current(ticket, addresses, TopList::Pools)
            .await
    }

    /// Replace the top token list, retiring tokens that dropped out of it.
    pub async fn set_top_tokens_if_current(
        &self,
        ticket: &FetchTicket,
        addresses: &[String],
    ) -> Option<Vec<String>> {
        self.set_top_list_if_current(ticket, addresses, TopList::Tokens)
            .await
    }

    async fn set_top_list_if_current(
        &self,
        ticket: &FetchTicket,
        addresses: &[String],
        list: TopList,
    ) -> Option<Vec<String>> {
        let mut state = self.state.write().await;
        if !state.generations.is_current(ticket) {
            return None;
        }

        let dex = ticket.key().dex();
        let mut entry = state.protocol.get(&dex).cloned().unwrap_or_default();
        let slot = match list {
            TopList::Pools => &mut entry.top_pools,
            TopList::Tokens => &mut entry.top_tokens,
        };

        let incoming: FxHashSet<String> = addresses.iter().map(|a| a.to_lowercase()).collect();
        let dropped: Vec<String> = slot
            .data()
            .map(|previous| {
                previous
                    .iter()
                    .filter(|a| !incoming.contains(a.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        *slot = FetchState::Ready(addresses.iter().map(|a| a.to_lowercase()).collect());
        state.protocol.insert(dex, entry);

        for address in &dropped {
            let key = match list {
                TopList::Pools => FetchKey::pool(dex, address),
                TopList::Tokens => FetchKey::token(dex, address),
            };
            state.generations.retire(&key);
        }

        Some(dropped)
    }
}

#[derive(Debug, Clone, Copy)]
enum TopList {
    Pools,
    Tokens,
}
