mod chart;
mod dex;
mod fetch_state;
mod pool;
mod protocol;
mod token;
mod transaction;

pub use chart::{DayBucket, DayDataRow, PriceCandle};
pub use dex::SupportedDex;
pub use fetch_state::FetchState;
pub use pool::{PairToken, PoolData, PoolSnapshot, PoolToken};
pub use protocol::{NativePrices, ProtocolData, ProtocolSnapshot};
pub use token::{TokenData, TokenSnapshot};
pub use transaction::{
    merge_transactions, BurnRow, MintRow, SwapRow, Transaction, TransactionType, TxPair, TxToken,
};
