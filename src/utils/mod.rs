//! Utility functions for dexscope.
//!
//! - [`changes`] - Period-over-period amount and percent changes
//! - [`conversion`] - Subgraph number/string decoding, address normalization
//! - [`time`] - Day indices and historical offsets
//! - [`tokens`] - Symbol/name overrides for special-cased addresses

mod changes;
mod conversion;
mod time;
mod tokens;

// Change calculators
pub use changes::{amount_change, change_for_period, percent_change, two_day_change};

// Conversion utilities
pub use conversion::{de_decimal, de_integer, entity_id_prefix, normalize_address, parse_decimal};

// Time utilities
pub use time::{
    day_index, delta_timestamps, sample_timestamps, DeltaTimestamps, ONE_DAY_SECS,
    ONE_HOUR_SECS, ONE_WEEK_SECS,
};

// Token display overrides
pub use tokens::{
    format_token_name, format_token_symbol, token_override, TokenOverride, WBNB_ADDRESS,
};
