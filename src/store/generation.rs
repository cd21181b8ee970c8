use rustc_hash::FxHashMap;

use crate::models::SupportedDex;

/// Unit of work whose results are committed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    /// Overview, chart, transactions and native prices of a network
    Protocol(SupportedDex),
    /// Top pool list and bulk pool data of a network
    TopPools(SupportedDex),
    /// Top token list and bulk token data of a network
    TopTokens(SupportedDex),
    /// Chart and transactions of one pool
    Pool(SupportedDex, String),
    /// Chart, price candles, pools and transactions of one token
    Token(SupportedDex, String),
}

impl FetchKey {
    pub fn pool(dex: SupportedDex, address: &str) -> Self {
        FetchKey::Pool(dex, address.to_lowercase())
    }

    pub fn token(dex: SupportedDex, address: &str) -> Self {
        FetchKey::Token(dex, address.to_lowercase())
    }

    pub fn dex(&self) -> SupportedDex {
        match self {
            FetchKey::Protocol(dex)
            | FetchKey::TopPools(dex)
            | FetchKey::TopTokens(dex)
            | FetchKey::Pool(dex, _)
            | FetchKey::Token(dex, _) => *dex,
        }
    }
}

/// Proof that a fetch was started at a given generation.
///
/// Results are committed only while the ticket is still the latest for its
/// key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: FetchKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Generation counters per fetch key.
///
/// Starting a fetch or retiring a key bumps its counter, which invalidates
/// every ticket handed out before. Once closed no ticket is current.
#[derive(Debug, Default)]
pub struct Generations {
    counters: FxHashMap<FetchKey, u64>,
    closed: bool,
}

impl Generations {
    pub fn begin(&mut self, key: FetchKey) -> FetchTicket {
        let generation = self.bump(&key);
        FetchTicket { key, generation }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        !self.closed && self.counters.get(&ticket.key) == Some(&ticket.generation)
    }

    pub fn retire(&mut self, key: &FetchKey) {
        self.bump(key);
    }

    /// Invalidate every outstanding ticket, now and for good.
    pub fn close(&mut self) {
        self.closed = true;
        for generation in self.counters.values_mut() {
            *generation += 1;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn bump(&mut self, key: &FetchKey) -> u64 {
        let generation = self.counters.entry(key.clone()).or_insert(0);
        *generation += 1;
        *generation
    }
}
