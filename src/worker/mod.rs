pub mod assembler;
pub mod fetcher;
pub mod normalizer;
pub mod paginator;

pub use assembler::{
    assemble_pools, assemble_protocol, assemble_tokens, candles_from_prices, SnapshotSet,
};
pub use fetcher::DexFetcher;
pub use normalizer::normalize_day_buckets;
pub use paginator::{fetch_all_pages, SeriesFetch};
