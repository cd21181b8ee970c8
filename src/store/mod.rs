//! In-memory entity store.
//!
//! - [`Store`] - protocol, pool and token entries per network
//! - [`FetchKey`] / [`FetchTicket`] - generation checks for async commits

mod generation;
#[allow(clippy::module_inception)]
mod store;

pub use generation::{FetchKey, FetchTicket, Generations};
pub use store::{EntityTable, PoolEntry, ProtocolEntry, Store, StoreSnapshot, TokenEntry};
